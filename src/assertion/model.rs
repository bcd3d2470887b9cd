use bon::Builder;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssertionKind {
    StatusCode,
    ResponseTime,
    Header,
    JsonPath,
    Contains,
    #[serde(other)]
    Unsupported,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
    Contains,
    NotContains,
    Regex,
    IsNull,
    IsNotNull,
    #[serde(other)]
    Unsupported,
}

impl Operator {
    pub fn label(&self) -> &'static str {
        match self {
            Operator::Eq => "equals",
            Operator::Ne => "not equals",
            Operator::Gt => "greater than",
            Operator::Lt => "less than",
            Operator::Gte => "greater than or equal",
            Operator::Lte => "less than or equal",
            Operator::Contains => "contains",
            Operator::NotContains => "does not contain",
            Operator::Regex => "matches regex",
            Operator::IsNull => "is null",
            Operator::IsNotNull => "is not null",
            Operator::Unsupported => "unsupported",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Builder)]
pub struct AssertionSpec {
    #[serde(default)]
    #[builder(default)]
    pub name: String,
    pub kind: AssertionKind,
    #[serde(default)]
    #[builder(default)]
    pub expression: String,
    pub operator: Operator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AssertionOutcome {
    pub name: String,
    pub kind: AssertionKind,
    pub expression: String,
    pub operator: Operator,
    pub expected: String,
    pub actual: Option<String>,
    pub passed: bool,
    pub message: String,
}

impl AssertionOutcome {
    pub fn of_success(spec: &AssertionSpec, actual: Option<String>, message: String) -> Self {
        AssertionOutcome {
            name: spec.name.clone(),
            kind: spec.kind,
            expression: spec.expression.clone(),
            operator: spec.operator,
            expected: spec.expected.clone().unwrap_or_default(),
            actual,
            passed: true,
            message,
        }
    }

    pub fn of_failure(spec: &AssertionSpec, actual: Option<String>, message: String) -> Self {
        AssertionOutcome {
            name: spec.name.clone(),
            kind: spec.kind,
            expression: spec.expression.clone(),
            operator: spec.operator,
            expected: spec.expected.clone().unwrap_or_default(),
            actual,
            passed: false,
            message,
        }
    }
}
