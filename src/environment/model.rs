use bon::Builder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EnvVariable {
    pub key: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EnvVariable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        EnvVariable {
            key: key.into(),
            value: value.into(),
            description: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Builder)]
pub struct Environment {
    #[builder(default = uuid::Uuid::new_v4().to_string())]
    pub id: String,
    pub name: String,
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    #[builder(default)]
    pub variables: Vec<EnvVariable>,
}

impl Environment {
    pub fn variable_map(&self) -> HashMap<String, String> {
        self.variables
            .iter()
            .map(|variable| (variable.key.clone(), variable.value.clone()))
            .collect()
    }
}
