use crate::case::executor::CaseExecutor;
use crate::case::model::{CaseResult, CaseStatus, TestCase};
use crate::error::{EngineError, Result};
use crate::execution::model::{Execution, ExecutionDetail, ExecutionStatus, TriggerKind};
use crate::store::repo::Repository;
use crate::variable::VariableContext;
use crate::worker::ExecutionQueue;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct ExecutionService {
    repository: Arc<Repository>,
    queue: ExecutionQueue,
    executor: CaseExecutor,
}

impl ExecutionService {
    pub fn new(repository: Arc<Repository>, queue: ExecutionQueue) -> Self {
        Self {
            repository,
            queue,
            executor: CaseExecutor::new(),
        }
    }

    /// Validates the references, records a pending execution and hands its id
    /// to the worker. Returns right away; poll `execution_progress` for the
    /// outcome.
    pub async fn trigger_suite_run(
        &self,
        suite_id: &String,
        environment_id: &String,
        trigger: TriggerKind,
    ) -> Result<Execution> {
        let suite = self.repository.suites().get(suite_id).await?;
        if suite.case_ids.is_empty() {
            return Err(EngineError::Validation(format!(
                "suite {} has no cases",
                suite.name
            )));
        }
        let environment = self.repository.environments().get(environment_id).await?;
        let execution = self
            .repository
            .executions()
            .create(
                Execution::builder()
                    .suite_id(suite.id.clone())
                    .environment_id(environment.id.clone())
                    .trigger(trigger)
                    .build(),
            )
            .await;
        self.queue.submit(execution.id.clone()).await?;
        info!("queued execution {} for suite {}", execution.id, suite.name);
        Ok(execution)
    }

    /// Runs one case inline, persisting the same execution and detail rows a
    /// suite run would.
    pub async fn run_single_case(
        &self,
        case_id: &String,
        environment_id: &String,
        trigger: TriggerKind,
    ) -> Result<Execution> {
        let case = self.repository.cases().get(case_id).await?;
        let environment = self.repository.environments().get(environment_id).await?;
        let execution = self
            .repository
            .executions()
            .create(
                Execution::builder()
                    .case_id(case.id.clone())
                    .environment_id(environment.id.clone())
                    .trigger(trigger)
                    .build(),
            )
            .await;
        self.repository
            .executions()
            .update_with(&execution.id, |row| {
                row.status = ExecutionStatus::Running;
                row.started_at = Some(Utc::now());
                row.total_count = 1;
            })
            .await?;

        let context = VariableContext::with_environment(environment.variable_map());
        let result = self.executor.execute(&case, &context, &environment.base_url).await;
        let status = result.status;
        let error_message = result.error_message.clone();
        let duration_ms = result.duration_ms;
        self.repository
            .execution_details()
            .create(ExecutionDetail::from_result(&execution.id, result))
            .await;
        self.repository
            .executions()
            .update_with(&execution.id, |row| {
                row.duration_ms = Some(duration_ms);
                row.finished_at = Some(Utc::now());
                match status {
                    CaseStatus::Passed => {
                        row.status = ExecutionStatus::Passed;
                        row.passed_count = 1;
                    }
                    CaseStatus::Failed => {
                        row.status = ExecutionStatus::Failed;
                        row.failed_count = 1;
                    }
                    CaseStatus::Error => {
                        row.status = ExecutionStatus::Error;
                        row.failed_count = 1;
                        row.error_message = error_message;
                    }
                }
            })
            .await
    }

    /// Fires an ad hoc case against an environment without persisting
    /// anything.
    pub async fn debug_case(&self, case: &TestCase, environment_id: &String) -> Result<CaseResult> {
        let environment = self.repository.environments().get(environment_id).await?;
        let context = VariableContext::with_environment(environment.variable_map());
        Ok(self.executor.execute(case, &context, &environment.base_url).await)
    }

    pub async fn execution_progress(
        &self,
        execution_id: &String,
    ) -> Result<(Execution, Vec<ExecutionDetail>)> {
        let execution = self.repository.executions().get(execution_id).await?;
        let details = self.repository.execution_details().list(execution_id).await;
        Ok((execution, details))
    }

    pub async fn list_recent(&self, suite_id: &String) -> Result<Vec<Execution>> {
        self.repository.suites().get(suite_id).await?;
        Ok(self.repository.executions().list_recent(suite_id).await)
    }
}
