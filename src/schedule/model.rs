use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_active() -> bool {
    true
}

/// Cron-driven suite trigger. The notify fields are policy carried with the
/// schedule; delivering notifications is someone else's job.
#[derive(Serialize, Deserialize, Clone, Debug, Builder)]
pub struct Schedule {
    #[builder(default = uuid::Uuid::new_v4().to_string())]
    pub id: String,
    pub name: String,
    pub suite_id: String,
    pub environment_id: String,
    pub cron_expression: String,
    #[serde(default = "default_active")]
    #[builder(default = true)]
    pub is_active: bool,
    #[serde(default)]
    #[builder(default)]
    pub notify_on_failure: bool,
    #[serde(default)]
    #[builder(default)]
    pub notify_emails: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run_at: Option<DateTime<Utc>>,
    #[serde(default = "Utc::now")]
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
}
