use bon::Builder;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorSource {
    Body,
    Header,
    Cookie,
    #[serde(other)]
    Unsupported,
}

/// Pulls one variable out of a response. For `Body` the expression shape
/// decides the mechanism: `$...` is JSONPath, `/.../` is a regex whose first
/// capture group (or whole match) wins, empty or `.` takes the whole body.
#[derive(Serialize, Deserialize, Clone, Debug, Builder)]
pub struct ExtractorSpec {
    pub name: String,
    pub source: ExtractorSource,
    #[serde(default)]
    #[builder(default)]
    pub expression: String,
    pub variable_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExtractedValue {
    pub variable_name: String,
    pub value: Option<String>,
    pub success: bool,
}

impl ExtractedValue {
    pub fn resolved(variable_name: String, value: Option<String>) -> Self {
        ExtractedValue {
            variable_name,
            value,
            success: true,
        }
    }

    pub fn from_error(variable_name: String, default_value: Option<String>) -> Self {
        ExtractedValue {
            variable_name,
            value: default_value,
            success: false,
        }
    }
}
