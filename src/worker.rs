use crate::error::{EngineError, Result};
use crate::execution::model::ExecutionStatus;
use crate::store::repo::Repository;
use crate::suite::runner::SuiteRunner;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{error, info};

pub const QUEUE_CAPACITY: usize = 32;

/// Cloneable submit handle for queueing execution ids to the worker.
#[derive(Clone)]
pub struct ExecutionQueue {
    sender: Sender<String>,
}

impl ExecutionQueue {
    pub fn channel() -> (Self, Receiver<String>) {
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        (Self { sender }, receiver)
    }

    pub async fn submit(&self, execution_id: String) -> Result<()> {
        self.sender
            .send(execution_id)
            .await
            .map_err(|_| EngineError::Internal("execution queue is closed".to_string()))
    }
}

/// Drains the queue for the life of the process. Each id runs on its own
/// task so a slow suite never blocks the ones behind it.
pub fn spawn_worker(repository: Arc<Repository>, mut receiver: Receiver<String>) -> JoinHandle<()> {
    let runner = SuiteRunner::new(Arc::clone(&repository));
    tokio::spawn(async move {
        info!("execution worker started");
        while let Some(execution_id) = receiver.recv().await {
            let runner = runner.clone();
            let repository = Arc::clone(&repository);
            tokio::spawn(async move {
                if let Err(err) = runner.run_execution(&execution_id).await {
                    error!("execution {} failed: {}", execution_id, err);
                    force_error(&repository, &execution_id, &err).await;
                }
            });
        }
        info!("execution worker stopped");
    })
}

/// A runner error leaves the row stuck in pending or running; push it to a
/// terminal status so pollers and the CLI do not wait forever.
async fn force_error(repository: &Repository, execution_id: &String, err: &EngineError) {
    let outcome = repository
        .executions()
        .update_with(execution_id, |execution| {
            execution.status = ExecutionStatus::Error;
            execution.error_message = Some(err.to_string());
            execution.finished_at = Some(Utc::now());
        })
        .await;
    if let Err(update_err) = outcome {
        error!(
            "could not mark execution {} as errored: {}",
            execution_id, update_err
        );
    }
}
