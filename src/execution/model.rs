use crate::assertion::model::AssertionOutcome;
use crate::case::model::{CaseResult, CaseStatus};
use crate::http::{HttpRequest, NormalizedResponse};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Manual,
    Schedule,
    Api,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Passed,
    Failed,
    Error,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Passed | ExecutionStatus::Failed | ExecutionStatus::Error
        )
    }
}

/// One run of a suite (or of a single case when `case_id` is set). Starts
/// pending, becomes running once a worker picks it up, and ends in exactly
/// one terminal status.
#[derive(Serialize, Deserialize, Clone, Debug, Builder)]
pub struct Execution {
    #[builder(default = uuid::Uuid::new_v4().to_string())]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
    pub environment_id: String,
    pub trigger: TriggerKind,
    #[builder(default = ExecutionStatus::Pending)]
    pub status: ExecutionStatus,
    #[serde(default)]
    #[builder(default)]
    pub total_count: u32,
    #[serde(default)]
    #[builder(default)]
    pub passed_count: u32,
    #[serde(default)]
    #[builder(default)]
    pub failed_count: u32,
    #[serde(default)]
    #[builder(default)]
    pub skipped_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Per-case row persisted as soon as the case finishes, so a poller can watch
/// an execution fill in while it runs.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExecutionDetail {
    pub id: String,
    pub execution_id: String,
    pub case_id: String,
    pub case_name: String,
    pub status: CaseStatus,
    pub request: HttpRequest,
    pub response: NormalizedResponse,
    pub assertions: Vec<AssertionOutcome>,
    pub extracted: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl ExecutionDetail {
    pub fn from_result(execution_id: &str, result: CaseResult) -> Self {
        ExecutionDetail {
            id: uuid::Uuid::new_v4().to_string(),
            execution_id: execution_id.to_string(),
            case_id: result.case_id,
            case_name: result.case_name,
            status: result.status,
            request: result.request,
            response: result.response,
            assertions: result.assertions,
            extracted: result.extracted,
            error_message: result.error_message,
            duration_ms: result.duration_ms,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_executions_start_pending_with_zero_counters() {
        let execution = Execution::builder()
            .suite_id("s-1".to_string())
            .environment_id("e-1".to_string())
            .trigger(TriggerKind::Manual)
            .build();
        assert_eq!(execution.status, ExecutionStatus::Pending);
        assert_eq!(execution.total_count, 0);
        assert!(execution.started_at.is_none());
        assert!(!execution.status.is_terminal());
    }

    #[test]
    fn terminal_statuses() {
        assert!(ExecutionStatus::Passed.is_terminal());
        assert!(ExecutionStatus::Failed.is_terminal());
        assert!(ExecutionStatus::Error.is_terminal());
        assert!(!ExecutionStatus::Running.is_terminal());
    }
}
