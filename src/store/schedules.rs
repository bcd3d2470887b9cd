use crate::error::{EngineError, Result};
use crate::schedule::cron::next_occurrence;
use crate::schedule::model::Schedule;
use crate::store::repo::Shared;
use chrono::{DateTime, Utc};

pub struct ScheduleOperations {
    pub(crate) entities: Shared<Schedule>,
}

impl ScheduleOperations {
    pub async fn create(&self, schedule: Schedule) -> Schedule {
        self.entities
            .write()
            .unwrap()
            .insert(schedule.id.clone(), schedule.clone());
        schedule
    }

    pub async fn get(&self, id: &String) -> Result<Schedule> {
        self.entities
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("schedule", id))
    }

    pub async fn update(&self, schedule: Schedule) -> Schedule {
        self.entities
            .write()
            .unwrap()
            .insert(schedule.id.clone(), schedule.clone());
        schedule
    }

    pub async fn delete(&self, id: &String) -> Result<Schedule> {
        self.entities
            .write()
            .unwrap()
            .remove(id)
            .ok_or_else(|| EngineError::not_found("schedule", id))
    }

    pub async fn list(&self) -> Vec<Schedule> {
        let mut schedules: Vec<Schedule> =
            self.entities.read().unwrap().values().cloned().collect();
        schedules.sort_by(|a, b| a.name.cmp(&b.name));
        schedules
    }

    /// Claims every active schedule due at `now` in one critical section:
    /// last_run_at and next_run_at move forward before any trigger fires, so
    /// an overlapping poll cannot claim the same occurrence twice.
    pub async fn claim_due(&self, now: DateTime<Utc>) -> Vec<Schedule> {
        let mut entities = self.entities.write().unwrap();
        let mut claimed = Vec::new();
        for schedule in entities.values_mut() {
            let due =
                schedule.is_active && schedule.next_run_at.map_or(false, |next| next <= now);
            if due {
                schedule.last_run_at = Some(now);
                schedule.next_run_at = next_occurrence(&schedule.cron_expression, now);
                claimed.push(schedule.clone());
            }
        }
        claimed
    }
}
