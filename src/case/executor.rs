use crate::assertion::check::assert_all;
use crate::case::model::{CaseResult, CaseStatus, TestCase};
use crate::extractor::extract::extract_all;
use crate::http::{ApiClient, BodyKind, HttpRequest, ReqBody};
use crate::variable::VariableContext;
use std::collections::HashMap;
use tracing::info;

#[derive(Clone)]
pub struct CaseExecutor {
    client: ApiClient,
}

impl CaseExecutor {
    pub fn new() -> Self {
        Self {
            client: ApiClient::new(),
        }
    }

    /// render -> dispatch -> extract -> assert. A transport error
    /// short-circuits to an error result that still records the rendered
    /// request. Total over any case data.
    pub async fn execute(
        &self,
        case: &TestCase,
        context: &VariableContext,
        base_url: &str,
    ) -> CaseResult {
        info!("will execute case: {}", case.name);
        let request = render_request(case, context, base_url);
        let response = self.client.dispatch(&request).await;
        if response.is_transport_error() {
            let error_message = response.error.clone();
            return CaseResult {
                case_id: case.id.clone(),
                case_name: case.name.clone(),
                status: CaseStatus::Error,
                duration_ms: response.duration_ms,
                request,
                response,
                assertions: Vec::new(),
                extracted: HashMap::new(),
                error_message,
            };
        }
        let extracted = extract_all(&case.extractors, &response);
        let assertions = assert_all(&case.assertions, &response);
        let status = if assertions.iter().all(|outcome| outcome.passed) {
            CaseStatus::Passed
        } else {
            CaseStatus::Failed
        };
        info!("case {} finished with status {:?}", case.name, status);
        CaseResult {
            case_id: case.id.clone(),
            case_name: case.name.clone(),
            status,
            duration_ms: response.duration_ms,
            request,
            response,
            assertions,
            extracted,
            error_message: None,
        }
    }
}

fn render_request(case: &TestCase, context: &VariableContext, base_url: &str) -> HttpRequest {
    let body = match (case.body.kind, &case.body.content) {
        (BodyKind::None, _) | (_, None) => ReqBody {
            kind: case.body.kind,
            content: None,
        },
        (BodyKind::Json, Some(content)) => {
            ReqBody::new(BodyKind::Json, context.render_json_text(content))
        }
        (kind, Some(content)) => ReqBody::new(kind, context.render(content)),
    };
    HttpRequest {
        method: case.method,
        url: build_url(base_url, &case.path, context),
        headers: context.render_map(&case.headers),
        query: context.render_map(&case.query),
        body,
        timeout_secs: case.timeout_secs,
    }
}

fn build_url(base_url: &str, path: &str, context: &VariableContext) -> String {
    let rendered = context.render(path);
    let base = base_url.trim_end_matches('/');
    if rendered.is_empty() {
        base.to_string()
    } else if rendered.starts_with('/') {
        format!("{}{}", base, rendered)
    } else {
        format!("{}/{}", base, rendered)
    }
}
