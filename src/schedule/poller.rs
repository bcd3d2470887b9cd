use crate::execution::model::TriggerKind;
use crate::execution::service::ExecutionService;
use crate::store::repo::Repository;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct SchedulePoller {
    repository: Arc<Repository>,
    executions: ExecutionService,
}

impl SchedulePoller {
    pub fn new(repository: Arc<Repository>, executions: ExecutionService) -> Self {
        Self {
            repository,
            executions,
        }
    }

    /// One pass: claim everything due at `now` and queue a run per claim.
    /// Returns how many runs were queued. A trigger failure skips that
    /// occurrence; the claim already advanced the schedule past it.
    pub async fn tick(&self, now: DateTime<Utc>) -> usize {
        let due = self.repository.schedules().claim_due(now).await;
        let mut fired = 0;
        for schedule in due {
            match self
                .executions
                .trigger_suite_run(
                    &schedule.suite_id,
                    &schedule.environment_id,
                    TriggerKind::Schedule,
                )
                .await
            {
                Ok(execution) => {
                    info!(
                        "schedule {} queued execution {}",
                        schedule.name, execution.id
                    );
                    fired += 1;
                }
                Err(err) => {
                    warn!("schedule {} could not fire: {}", schedule.name, err);
                }
            }
        }
        fired
    }

    /// Polls forever. Meant to be spawned alongside the worker.
    pub async fn run(&self, poll_interval: Duration) {
        info!("schedule poller started, polling every {:?}", poll_interval);
        let mut interval = tokio::time::interval(poll_interval);
        loop {
            interval.tick().await;
            self.tick(Utc::now()).await;
        }
    }
}
