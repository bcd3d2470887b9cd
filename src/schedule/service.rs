use crate::error::Result;
use crate::schedule::cron;
use crate::schedule::model::Schedule;
use crate::store::repo::Repository;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct ScheduleService {
    repository: Arc<Repository>,
}

impl ScheduleService {
    pub fn new(repository: Arc<Repository>) -> Self {
        Self { repository }
    }

    /// Validates the cron expression and the referenced suite and
    /// environment, then stores the schedule with its first due time set.
    pub async fn create(&self, mut schedule: Schedule) -> Result<Schedule> {
        self.repository.suites().get(&schedule.suite_id).await?;
        self.repository
            .environments()
            .get(&schedule.environment_id)
            .await?;
        cron::validate(&schedule.cron_expression)?;
        schedule.next_run_at = if schedule.is_active {
            cron::next_occurrence(&schedule.cron_expression, Utc::now())
        } else {
            None
        };
        let schedule = self.repository.schedules().create(schedule).await;
        info!(
            "created schedule {} ({})",
            schedule.name, schedule.cron_expression
        );
        Ok(schedule)
    }

    /// Full replace. The expression is revalidated and the due time
    /// recomputed, so edits made while a schedule is overdue do not fire it
    /// with the stale expression.
    pub async fn update(&self, mut schedule: Schedule) -> Result<Schedule> {
        self.repository.schedules().get(&schedule.id).await?;
        self.repository.suites().get(&schedule.suite_id).await?;
        self.repository
            .environments()
            .get(&schedule.environment_id)
            .await?;
        cron::validate(&schedule.cron_expression)?;
        schedule.next_run_at = if schedule.is_active {
            cron::next_occurrence(&schedule.cron_expression, Utc::now())
        } else {
            None
        };
        Ok(self.repository.schedules().update(schedule).await)
    }

    pub async fn toggle(&self, id: &String) -> Result<Schedule> {
        let mut schedule = self.repository.schedules().get(id).await?;
        schedule.is_active = !schedule.is_active;
        schedule.next_run_at = if schedule.is_active {
            cron::next_occurrence(&schedule.cron_expression, Utc::now())
        } else {
            None
        };
        info!(
            "schedule {} is now {}",
            schedule.name,
            if schedule.is_active { "active" } else { "paused" }
        );
        Ok(self.repository.schedules().update(schedule).await)
    }

    pub async fn delete(&self, id: &String) -> Result<Schedule> {
        self.repository.schedules().delete(id).await
    }

    pub async fn list(&self) -> Vec<Schedule> {
        self.repository.schedules().list().await
    }
}
