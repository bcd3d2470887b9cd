use crate::extractor::model::{ExtractedValue, ExtractorSource, ExtractorSpec};
use crate::http::NormalizedResponse;
use regex::Regex;
use serde_json::Value;
use serde_json_path::JsonPath;
use std::collections::HashMap;
use tracing::warn;

/// Runs every extractor in declared order. Values that resolve to nothing are
/// omitted; a later extractor overwrites an earlier one on the same name.
pub fn extract_all(
    specs: &[ExtractorSpec],
    response: &NormalizedResponse,
) -> HashMap<String, String> {
    let mut extracted = HashMap::new();
    for spec in specs {
        let result = extract_one(spec, response);
        if let Some(value) = result.value {
            extracted.insert(result.variable_name, value);
        }
    }
    extracted
}

/// A miss resolves to the default value and still counts as success; only an
/// evaluation failure (bad regex, unsupported source) flips the flag. Neither
/// aborts the case.
pub fn extract_one(spec: &ExtractorSpec, response: &NormalizedResponse) -> ExtractedValue {
    let outcome = match spec.source {
        ExtractorSource::Body => extract_from_body(&spec.expression, &response.body),
        ExtractorSource::Header => Ok(lookup_header(&response.headers, &spec.expression)),
        ExtractorSource::Cookie => Ok(response.cookies.get(&spec.expression).cloned()),
        ExtractorSource::Unsupported => Err("unsupported extractor source".to_string()),
    };
    match outcome {
        Ok(Some(value)) => ExtractedValue::resolved(spec.variable_name.clone(), Some(value)),
        Ok(None) => {
            ExtractedValue::resolved(spec.variable_name.clone(), spec.default_value.clone())
        }
        Err(message) => {
            warn!("extractor {} failed: {}", spec.name, message);
            ExtractedValue::from_error(spec.variable_name.clone(), spec.default_value.clone())
        }
    }
}

fn extract_from_body(expression: &str, body: &str) -> Result<Option<String>, String> {
    if body.is_empty() {
        return Ok(None);
    }
    if expression.starts_with('$') {
        return Ok(query_json_path(expression, body));
    }
    if expression.len() >= 2 && expression.starts_with('/') && expression.ends_with('/') {
        return regex_capture(&expression[1..expression.len() - 1], body);
    }
    if expression.is_empty() || expression == "." {
        return Ok(Some(body.to_string()));
    }
    Ok(None)
}

pub(crate) fn query_json_path(expression: &str, body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    let path = JsonPath::parse(expression).ok()?;
    let node = path.query(&parsed).first()?;
    stringify_node(node)
}

fn stringify_node(node: &Value) -> Option<String> {
    match node {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn regex_capture(pattern: &str, body: &str) -> Result<Option<String>, String> {
    let regex = Regex::new(pattern).map_err(|err| err.to_string())?;
    let found = regex.captures(body).and_then(|caps| {
        if regex.captures_len() > 1 {
            caps.get(1).map(|group| group.as_str().to_string())
        } else {
            caps.get(0).map(|whole| whole.as_str().to_string())
        }
    });
    Ok(found)
}

pub(crate) fn lookup_header(headers: &HashMap<String, String>, name: &str) -> Option<String> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.clone())
}
