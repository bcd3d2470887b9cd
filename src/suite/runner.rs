use crate::case::executor::CaseExecutor;
use crate::case::model::{CaseStatus, TestCase};
use crate::environment::model::Environment;
use crate::error::{EngineError, Result};
use crate::execution::model::{Execution, ExecutionDetail, ExecutionStatus};
use crate::store::repo::Repository;
use crate::suite::model::ExecutionMode;
use crate::variable::VariableContext;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Upper bound on in-flight cases for parallel suites.
pub const PARALLEL_CASE_LIMIT: usize = 8;

#[derive(Clone)]
pub struct SuiteRunner {
    repository: Arc<Repository>,
    executor: CaseExecutor,
}

impl SuiteRunner {
    pub fn new(repository: Arc<Repository>) -> Self {
        Self {
            repository,
            executor: CaseExecutor::new(),
        }
    }

    /// Drives one queued suite execution to a terminal status. Redelivered
    /// ids for already finished executions are a no-op.
    pub async fn run_execution(&self, execution_id: &String) -> Result<Execution> {
        let execution = self.repository.executions().get(execution_id).await?;
        if execution.status.is_terminal() {
            info!("execution {} already finished, skipping", execution_id);
            return Ok(execution);
        }
        let suite_id = execution.suite_id.clone().ok_or_else(|| {
            EngineError::Worker(format!("execution {} is not a suite run", execution.id))
        })?;
        let suite = self.repository.suites().get(&suite_id).await?;
        let cases = self.repository.cases().get_many(&suite.case_ids).await?;
        let environment = self
            .repository
            .environments()
            .get(&execution.environment_id)
            .await?;

        let started = Instant::now();
        self.repository
            .executions()
            .update_with(execution_id, |execution| {
                execution.status = ExecutionStatus::Running;
                execution.started_at = Some(Utc::now());
                execution.total_count = cases.len() as u32;
            })
            .await?;
        info!(
            "running suite {} with {} cases in {:?} mode",
            suite.name,
            cases.len(),
            suite.execution_mode
        );

        let statuses = match suite.execution_mode {
            ExecutionMode::Sequential => {
                self.run_sequential(execution_id, &cases, &environment).await
            }
            ExecutionMode::Parallel => self.run_parallel(execution_id, &cases, &environment).await,
        };

        let passed = statuses
            .iter()
            .filter(|status| **status == CaseStatus::Passed)
            .count() as u32;
        let failed = statuses.len() as u32 - passed;
        let duration_ms = started.elapsed().as_millis() as u64;
        let finished = self
            .repository
            .executions()
            .update_with(execution_id, |execution| {
                execution.passed_count = passed;
                execution.failed_count = failed;
                execution.duration_ms = Some(duration_ms);
                execution.finished_at = Some(Utc::now());
                execution.status = if failed == 0 {
                    ExecutionStatus::Passed
                } else {
                    ExecutionStatus::Failed
                };
            })
            .await?;
        info!(
            "execution {} finished {:?}, {}/{} passed",
            execution_id, finished.status, passed, finished.total_count
        );
        Ok(finished)
    }

    /// One shared context; each case's extracted variables feed the next.
    async fn run_sequential(
        &self,
        execution_id: &String,
        cases: &[TestCase],
        environment: &Environment,
    ) -> Vec<CaseStatus> {
        let mut context = VariableContext::with_environment(environment.variable_map());
        let mut statuses = Vec::with_capacity(cases.len());
        for case in cases {
            let result = self.executor.execute(case, &context, &environment.base_url).await;
            statuses.push(result.status);
            context.merge_extracted(result.extracted.clone());
            self.repository
                .execution_details()
                .create(ExecutionDetail::from_result(execution_id, result))
                .await;
        }
        statuses
    }

    /// Isolated context per case, bounded fan-out, details persisted in
    /// completion order. Extracted variables are not shared.
    async fn run_parallel(
        &self,
        execution_id: &String,
        cases: &[TestCase],
        environment: &Environment,
    ) -> Vec<CaseStatus> {
        let context = VariableContext::with_environment(environment.variable_map());
        let case_futures: Vec<_> = cases
            .iter()
            .map(|case| {
                let context = context.clone();
                async move { self.executor.execute(case, &context, &environment.base_url).await }
            })
            .collect();
        stream::iter(case_futures)
            .buffer_unordered(PARALLEL_CASE_LIMIT)
            .then(|result| async move {
                let status = result.status;
                self.repository
                    .execution_details()
                    .create(ExecutionDetail::from_result(execution_id, result))
                    .await;
                status
            })
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::model::TriggerKind;

    #[tokio::test]
    async fn terminal_executions_are_skipped_untouched() {
        let repository = Arc::new(Repository::new());
        let mut execution = Execution::builder()
            .suite_id("missing-suite".to_string())
            .environment_id("e-1".to_string())
            .trigger(TriggerKind::Manual)
            .build();
        execution.status = ExecutionStatus::Passed;
        execution.passed_count = 2;
        let execution = repository.executions().create(execution).await;

        let runner = SuiteRunner::new(Arc::clone(&repository));
        let unchanged = runner.run_execution(&execution.id).await.unwrap();
        assert_eq!(unchanged.status, ExecutionStatus::Passed);
        assert_eq!(unchanged.passed_count, 2);
    }

    #[tokio::test]
    async fn an_execution_without_a_suite_is_a_worker_failure() {
        let repository = Arc::new(Repository::new());
        let execution = repository
            .executions()
            .create(
                Execution::builder()
                    .case_id("c-1".to_string())
                    .environment_id("e-1".to_string())
                    .trigger(TriggerKind::Manual)
                    .build(),
            )
            .await;
        let runner = SuiteRunner::new(Arc::clone(&repository));
        let err = runner.run_execution(&execution.id).await.unwrap_err();
        assert!(matches!(err, EngineError::Worker(_)));
    }

    #[tokio::test]
    async fn a_missing_environment_is_a_configuration_failure() {
        let repository = Arc::new(Repository::new());
        let suite = repository
            .suites()
            .create(crate::suite::model::Suite::builder().name("s".to_string()).build())
            .await;
        let execution = repository
            .executions()
            .create(
                Execution::builder()
                    .suite_id(suite.id.clone())
                    .environment_id("nowhere".to_string())
                    .trigger(TriggerKind::Manual)
                    .build(),
            )
            .await;
        let runner = SuiteRunner::new(Arc::clone(&repository));
        let err = runner.run_execution(&execution.id).await.unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }
}
