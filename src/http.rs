use crate::error::EngineError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, SET_COOKIE};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    fn as_reqwest(&self) -> Method {
        match self {
            HttpMethod::GET => Method::GET,
            HttpMethod::POST => Method::POST,
            HttpMethod::PUT => Method::PUT,
            HttpMethod::PATCH => Method::PATCH,
            HttpMethod::DELETE => Method::DELETE,
            HttpMethod::HEAD => Method::HEAD,
            HttpMethod::OPTIONS => Method::OPTIONS,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for HttpMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::GET),
            "POST" => Ok(HttpMethod::POST),
            "PUT" => Ok(HttpMethod::PUT),
            "PATCH" => Ok(HttpMethod::PATCH),
            "DELETE" => Ok(HttpMethod::DELETE),
            "HEAD" => Ok(HttpMethod::HEAD),
            "OPTIONS" => Ok(HttpMethod::OPTIONS),
            _ => Err(EngineError::Validation(format!("invalid http method: {}", s))),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BodyKind {
    #[default]
    None,
    Json,
    Form,
    FormData,
    Raw,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ReqBody {
    #[serde(default)]
    pub kind: BodyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ReqBody {
    pub fn empty() -> Self {
        ReqBody::default()
    }

    pub fn new(kind: BodyKind, content: impl Into<String>) -> Self {
        ReqBody {
            kind,
            content: Some(content.into()),
        }
    }
}

/// A fully rendered request, recorded as sent.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub body: ReqBody,
    pub timeout_secs: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NormalizedResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub cookies: HashMap<String, String>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NormalizedResponse {
    /// Transport failures are status 0 with nothing but the error and the
    /// elapsed time filled in.
    pub fn failure(message: impl Into<String>, duration_ms: u64) -> Self {
        NormalizedResponse {
            status: 0,
            headers: HashMap::new(),
            body: String::new(),
            cookies: HashMap::new(),
            duration_ms,
            error: Some(message.into()),
        }
    }

    pub fn is_transport_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Sends the request and normalizes whatever happens into a response.
    /// Transport problems come back as status 0 with an error message, never
    /// as an Err.
    pub async fn dispatch(&self, request: &HttpRequest) -> NormalizedResponse {
        info!("will dispatch {} {}", request.method, request.url);
        let started = Instant::now();
        let req = match self.build_reqwest(request) {
            Ok(req) => req,
            Err(message) => return NormalizedResponse::failure(message, elapsed_ms(&started)),
        };
        match req.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let cookies = parse_cookies(response.headers());
                let headers = response
                    .headers()
                    .iter()
                    .map(|(name, value)| {
                        (
                            name.as_str().to_string(),
                            value.to_str().unwrap_or("").to_string(),
                        )
                    })
                    .collect();
                match response.text().await {
                    Ok(body) => {
                        info!("request finished with status {}", status);
                        NormalizedResponse {
                            status,
                            headers,
                            body,
                            cookies,
                            duration_ms: elapsed_ms(&started),
                            error: None,
                        }
                    }
                    Err(error) => {
                        info!("reading response body failed: {}", error);
                        NormalizedResponse::failure(error.to_string(), elapsed_ms(&started))
                    }
                }
            }
            Err(error) => {
                let message = if error.is_timeout() {
                    format!("request timed out after {}s", request.timeout_secs)
                } else {
                    error.to_string()
                };
                info!("request failed: {}", message);
                NormalizedResponse::failure(message, elapsed_ms(&started))
            }
        }
    }

    fn build_reqwest(&self, request: &HttpRequest) -> Result<RequestBuilder, String> {
        let mut headers = HeaderMap::new();
        for (key, value) in &request.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|err| format!("invalid header name {}: {}", key, err))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| format!("invalid value for header {}: {}", key, err))?;
            headers.insert(name, value);
        }
        let mut req = self
            .client
            .request(request.method.as_reqwest(), &request.url)
            .headers(headers)
            .timeout(Duration::from_secs(request.timeout_secs));
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        Ok(attach_body(req, request))
    }
}

fn attach_body(req: RequestBuilder, request: &HttpRequest) -> RequestBuilder {
    let content = match &request.body.content {
        Some(content) if !content.is_empty() => content.clone(),
        _ => return req,
    };
    match request.body.kind {
        BodyKind::None => req,
        BodyKind::Json => {
            let req = if has_content_type(&request.headers) {
                req
            } else {
                req.header(CONTENT_TYPE, "application/json")
            };
            req.body(content)
        }
        BodyKind::Form => match serde_json::from_str::<HashMap<String, Value>>(&content) {
            Ok(fields) => {
                let pairs: HashMap<String, String> = fields
                    .iter()
                    .map(|(key, value)| (key.clone(), stringify_scalar(value)))
                    .collect();
                req.form(&pairs)
            }
            Err(_) => req.body(content),
        },
        BodyKind::FormData => match serde_json::from_str::<HashMap<String, Value>>(&content) {
            Ok(fields) => {
                let mut form = reqwest::multipart::Form::new();
                for (key, value) in fields {
                    form = form.text(key, stringify_scalar(&value));
                }
                req.multipart(form)
            }
            Err(_) => req.body(content),
        },
        BodyKind::Raw => req.body(content),
    }
}

fn has_content_type(headers: &HashMap<String, String>) -> bool {
    headers.keys().any(|key| key.eq_ignore_ascii_case("content-type"))
}

fn stringify_scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn parse_cookies(headers: &HeaderMap) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for value in headers.get_all(SET_COOKIE) {
        let text = match value.to_str() {
            Ok(text) => text,
            Err(_) => continue,
        };
        let pair = text.split(';').next().unwrap_or("");
        if let Some((name, value)) = pair.split_once('=') {
            cookies.insert(name.trim().to_string(), value.trim().to_string());
        }
    }
    cookies
}

fn elapsed_ms(started: &Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
