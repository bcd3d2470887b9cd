use petrel::assertion::model::{AssertionKind, AssertionSpec, Operator};
use petrel::case::model::{CaseStatus, TestCase};
use petrel::extractor::model::{ExtractorSource, ExtractorSpec};
use petrel::http::{BodyKind, HttpMethod, ReqBody};
use petrel::{CaseExecutor, VariableContext};
use std::collections::HashMap;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn status_is(expected: &str) -> AssertionSpec {
    AssertionSpec::builder()
        .kind(AssertionKind::StatusCode)
        .operator(Operator::Eq)
        .expected(expected.to_string())
        .build()
}

#[tokio::test]
async fn a_passing_case_renders_extracts_and_asserts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(header("Content-Type", "application/json"))
        .and(body_string_contains("\"username\":\"admin\""))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"access_token": "tok-991", "ttl": 3600}))
                .insert_header("X-Request-Id", "req-7"),
        )
        .mount(&server)
        .await;

    let case = TestCase::builder()
        .name("login".to_string())
        .method(HttpMethod::POST)
        .path("/auth/login".to_string())
        .headers(HashMap::from([(
            "Content-Type".to_string(),
            "application/json".to_string(),
        )]))
        .body(ReqBody::new(
            BodyKind::Json,
            r#"{"username":"{{username}}","password":"secret"}"#,
        ))
        .extractors(vec![ExtractorSpec::builder()
            .name("grab token".to_string())
            .source(ExtractorSource::Body)
            .expression("$.access_token".to_string())
            .variable_name("token".to_string())
            .build()])
        .assertions(vec![
            status_is("200"),
            AssertionSpec::builder()
                .kind(AssertionKind::JsonPath)
                .expression("$.ttl".to_string())
                .operator(Operator::Gt)
                .expected("1000".to_string())
                .build(),
            AssertionSpec::builder()
                .kind(AssertionKind::Header)
                .expression("x-request-id".to_string())
                .operator(Operator::Eq)
                .expected("req-7".to_string())
                .build(),
        ])
        .build();

    let mut context = VariableContext::new();
    context.set_environment("username", "admin");
    let result = CaseExecutor::new().execute(&case, &context, &server.uri()).await;

    assert_eq!(result.status, CaseStatus::Passed);
    assert_eq!(result.extracted.get("token"), Some(&"tok-991".to_string()));
    assert_eq!(result.assertions.len(), 3);
    assert!(result.assertions.iter().all(|outcome| outcome.passed));
    assert!(result.error_message.is_none());
}

#[tokio::test]
async fn failing_assertions_mark_the_case_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let case = TestCase::builder()
        .name("health".to_string())
        .method(HttpMethod::GET)
        .path("/health".to_string())
        .assertions(vec![status_is("201")])
        .build();

    let result = CaseExecutor::new()
        .execute(&case, &VariableContext::new(), &server.uri())
        .await;
    assert_eq!(result.status, CaseStatus::Failed);
    assert_eq!(
        result.assertions[0].message,
        "assertion failed: actual [200] equals expected [201]"
    );
}

#[tokio::test]
async fn a_case_with_no_assertions_passes_vacuously() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let case = TestCase::builder()
        .name("ping".to_string())
        .method(HttpMethod::GET)
        .path("/ping".to_string())
        .build();

    let result = CaseExecutor::new()
        .execute(&case, &VariableContext::new(), &server.uri())
        .await;
    assert_eq!(result.status, CaseStatus::Passed);
    assert!(result.assertions.is_empty());
}

#[tokio::test]
async fn form_bodies_are_sent_urlencoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let case = TestCase::builder()
        .name("token".to_string())
        .method(HttpMethod::POST)
        .path("/token".to_string())
        .body(ReqBody::new(
            BodyKind::Form,
            r#"{"grant_type":"client_credentials","scope":"{{scope}}"}"#,
        ))
        .assertions(vec![status_is("200")])
        .build();

    let mut context = VariableContext::new();
    context.set_environment("scope", "read");
    let result = CaseExecutor::new().execute(&case, &context, &server.uri()).await;
    assert_eq!(result.status, CaseStatus::Passed);
}

#[tokio::test]
async fn connection_refused_is_an_error_not_a_failure() {
    // Grab a port nothing is listening on by binding and dropping it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let case = TestCase::builder()
        .name("unreachable".to_string())
        .method(HttpMethod::GET)
        .path("/users/{{id}}".to_string())
        .assertions(vec![status_is("200")])
        .extractors(vec![ExtractorSpec::builder()
            .name("grab anything".to_string())
            .source(ExtractorSource::Body)
            .expression("$.x".to_string())
            .variable_name("x".to_string())
            .build()])
        .build();

    let mut context = VariableContext::new();
    context.set_environment("id", "7");
    let result = CaseExecutor::new().execute(&case, &context, &base_url).await;

    assert_eq!(result.status, CaseStatus::Error);
    assert!(result.error_message.is_some());
    assert!(result.assertions.is_empty());
    assert!(result.extracted.is_empty());
    assert_eq!(result.request.url, format!("{}/users/7", base_url));
    assert_eq!(result.response.status, 0);
}

#[tokio::test]
async fn timeouts_report_the_configured_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let case = TestCase::builder()
        .name("slow".to_string())
        .method(HttpMethod::GET)
        .path("/slow".to_string())
        .timeout_secs(1)
        .build();

    let result = CaseExecutor::new()
        .execute(&case, &VariableContext::new(), &server.uri())
        .await;
    assert_eq!(result.status, CaseStatus::Error);
    assert_eq!(
        result.error_message.as_deref(),
        Some("request timed out after 1s")
    );
}
