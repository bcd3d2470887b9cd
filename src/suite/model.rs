use bon::Builder;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel,
}

/// An ordered group of cases. Sequential suites pass extracted variables from
/// one case to the next; parallel suites run isolated contexts.
#[derive(Serialize, Deserialize, Clone, Debug, Builder)]
pub struct Suite {
    #[builder(default = uuid::Uuid::new_v4().to_string())]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    #[builder(default)]
    pub execution_mode: ExecutionMode,
    #[serde(default)]
    #[builder(default)]
    pub case_ids: Vec<String>,
}
