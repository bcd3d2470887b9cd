use crate::error::{EngineError, Result};
use crate::execution::model::{Execution, ExecutionDetail};
use crate::store::repo::Shared;
use std::sync::{Arc, RwLock};

pub struct ExecutionOperations {
    pub(crate) entities: Shared<Execution>,
}

impl ExecutionOperations {
    pub async fn create(&self, execution: Execution) -> Execution {
        self.entities
            .write()
            .unwrap()
            .insert(execution.id.clone(), execution.clone());
        execution
    }

    pub async fn get(&self, id: &String) -> Result<Execution> {
        self.entities
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("execution", id))
    }

    /// Applies the mutation under the write lock unless the row is already
    /// terminal; terminal rows come back unchanged so a finished execution is
    /// never rewritten.
    pub async fn update_with<F>(&self, id: &String, apply: F) -> Result<Execution>
    where
        F: FnOnce(&mut Execution),
    {
        let mut entities = self.entities.write().unwrap();
        let execution = entities
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("execution", id))?;
        if !execution.status.is_terminal() {
            apply(execution);
        }
        Ok(execution.clone())
    }

    pub async fn list_recent(&self, suite_id: &String) -> Vec<Execution> {
        let mut executions: Vec<Execution> = self
            .entities
            .read()
            .unwrap()
            .values()
            .filter(|execution| execution.suite_id.as_ref() == Some(suite_id))
            .cloned()
            .collect();
        executions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        executions
    }
}

pub struct ExecutionDetailOperations {
    pub(crate) rows: Arc<RwLock<Vec<ExecutionDetail>>>,
}

impl ExecutionDetailOperations {
    pub async fn create(&self, detail: ExecutionDetail) -> ExecutionDetail {
        self.rows.write().unwrap().push(detail.clone());
        detail
    }

    /// Details in insertion order: declared order for sequential suites,
    /// completion order for parallel ones.
    pub async fn list(&self, execution_id: &String) -> Vec<ExecutionDetail> {
        self.rows
            .read()
            .unwrap()
            .iter()
            .filter(|detail| &detail.execution_id == execution_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::model::{ExecutionStatus, TriggerKind};
    use crate::store::repo::Repository;

    fn pending_execution() -> Execution {
        Execution::builder()
            .suite_id("s-1".to_string())
            .environment_id("e-1".to_string())
            .trigger(TriggerKind::Manual)
            .build()
    }

    #[tokio::test]
    async fn update_with_skips_terminal_rows() {
        let repository = Repository::new();
        let execution = repository.executions().create(pending_execution()).await;
        repository
            .executions()
            .update_with(&execution.id, |row| {
                row.status = ExecutionStatus::Passed;
                row.passed_count = 3;
            })
            .await
            .unwrap();
        let unchanged = repository
            .executions()
            .update_with(&execution.id, |row| {
                row.status = ExecutionStatus::Error;
                row.passed_count = 0;
            })
            .await
            .unwrap();
        assert_eq!(unchanged.status, ExecutionStatus::Passed);
        assert_eq!(unchanged.passed_count, 3);
    }

    #[tokio::test]
    async fn list_recent_orders_newest_first() {
        let repository = Repository::new();
        let first = repository.executions().create(pending_execution()).await;
        let mut newer = pending_execution();
        newer.created_at = first.created_at + chrono::Duration::seconds(5);
        let newer = repository.executions().create(newer).await;
        let listed = repository.executions().list_recent(&"s-1".to_string()).await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
    }
}
