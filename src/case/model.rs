use crate::assertion::model::{AssertionOutcome, AssertionSpec};
use crate::extractor::model::ExtractorSpec;
use crate::http::{HttpMethod, HttpRequest, NormalizedResponse, ReqBody};
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// A self-contained request template plus its extractors and assertions. The
/// executor needs nothing beyond this snapshot and a variable context.
#[derive(Serialize, Deserialize, Clone, Debug, Builder)]
pub struct TestCase {
    #[builder(default = uuid::Uuid::new_v4().to_string())]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub method: HttpMethod,
    pub path: String,
    #[serde(default)]
    #[builder(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    #[builder(default)]
    pub query: HashMap<String, String>,
    #[serde(default)]
    #[builder(default)]
    pub body: ReqBody,
    #[serde(default = "default_timeout")]
    #[builder(default = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
    #[serde(default)]
    #[builder(default)]
    pub extractors: Vec<ExtractorSpec>,
    #[serde(default)]
    #[builder(default)]
    pub assertions: Vec<AssertionSpec>,
    #[serde(default)]
    #[builder(default)]
    pub sort_order: u32,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Passed,
    Failed,
    Error,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CaseResult {
    pub case_id: String,
    pub case_name: String,
    pub status: CaseStatus,
    pub request: HttpRequest,
    pub response: NormalizedResponse,
    pub assertions: Vec<AssertionOutcome>,
    pub extracted: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub duration_ms: u64,
}
