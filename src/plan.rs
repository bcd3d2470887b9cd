use crate::case::model::TestCase;
use crate::environment::model::Environment;
use crate::error::{EngineError, Result};
use crate::schedule::model::Schedule;
use crate::schedule::service::ScheduleService;
use crate::store::repo::Repository;
use crate::suite::model::Suite;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Declarative seed file: everything the daemon should know at startup.
/// Entities carry explicit ids so suites and schedules can reference them.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Plan {
    #[serde(default)]
    pub environments: Vec<Environment>,
    #[serde(default)]
    pub cases: Vec<TestCase>,
    #[serde(default)]
    pub suites: Vec<Suite>,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
}

/// Reads, parses and seeds a plan file. Cross-references are checked as they
/// load: suites must name existing cases, schedules existing suites and
/// environments.
pub async fn load_plan(path: &Path, repository: Arc<Repository>) -> Result<Plan> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|err| {
        EngineError::Configuration(format!("cannot read plan {}: {}", path.display(), err))
    })?;
    let plan: Plan = serde_json::from_str(&raw).map_err(|err| {
        EngineError::Validation(format!("malformed plan {}: {}", path.display(), err))
    })?;

    for environment in &plan.environments {
        repository.environments().create(environment.clone()).await;
    }
    for case in &plan.cases {
        repository.cases().create(case.clone()).await;
    }
    for suite in &plan.suites {
        repository.cases().get_many(&suite.case_ids).await?;
        repository.suites().create(suite.clone()).await;
    }
    let schedules = ScheduleService::new(Arc::clone(&repository));
    for schedule in &plan.schedules {
        schedules.create(schedule.clone()).await?;
    }
    info!(
        "loaded plan {}: {} environments, {} cases, {} suites, {} schedules",
        path.display(),
        plan.environments.len(),
        plan.cases.len(),
        plan.suites.len(),
        plan.schedules.len()
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMOKE_PLAN: &str = r#"{
        "environments": [
            {
                "id": "env-local",
                "name": "local",
                "base_url": "http://localhost:8080",
                "variables": [{"key": "api_key", "value": "k-123"}]
            }
        ],
        "cases": [
            {
                "id": "case-ping",
                "name": "ping",
                "method": "GET",
                "path": "/ping",
                "assertions": [
                    {"kind": "status_code", "operator": "eq", "expected": "200"}
                ]
            }
        ],
        "suites": [
            {"id": "suite-smoke", "name": "smoke", "case_ids": ["case-ping"]}
        ],
        "schedules": [
            {
                "id": "sched-nightly",
                "name": "nightly",
                "suite_id": "suite-smoke",
                "environment_id": "env-local",
                "cron_expression": "0 0 * * *"
            }
        ]
    }"#;

    fn write_plan(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn a_full_plan_seeds_every_store() {
        let (_dir, path) = write_plan(SMOKE_PLAN);
        let repository = Arc::new(Repository::new());
        let plan = load_plan(&path, Arc::clone(&repository)).await.unwrap();
        assert_eq!(plan.cases.len(), 1);

        let suite = repository.suites().get(&"suite-smoke".to_string()).await.unwrap();
        assert_eq!(suite.case_ids, vec!["case-ping".to_string()]);
        let environment = repository
            .environments()
            .get(&"env-local".to_string())
            .await
            .unwrap();
        assert_eq!(environment.variable_map().get("api_key"), Some(&"k-123".to_string()));
        let schedule = repository
            .schedules()
            .get(&"sched-nightly".to_string())
            .await
            .unwrap();
        assert!(schedule.next_run_at.is_some());
    }

    #[tokio::test]
    async fn a_missing_file_is_a_configuration_error() {
        let repository = Arc::new(Repository::new());
        let err = load_plan(Path::new("/no/such/plan.json"), repository)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let (_dir, path) = write_plan("{\"cases\": [");
        let repository = Arc::new(Repository::new());
        let err = load_plan(&path, repository).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn a_suite_naming_an_unknown_case_is_rejected() {
        let (_dir, path) = write_plan(
            r#"{"suites": [{"id": "s-1", "name": "broken", "case_ids": ["ghost"]}]}"#,
        );
        let repository = Arc::new(Repository::new());
        let err = load_plan(&path, repository).await.unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }
}
