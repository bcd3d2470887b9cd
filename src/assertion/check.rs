use crate::assertion::model::{AssertionKind, AssertionOutcome, AssertionSpec, Operator};
use crate::extractor::extract::{lookup_header, query_json_path};
use crate::http::NormalizedResponse;
use regex::Regex;

/// Evaluates every assertion independently, preserving declared order.
pub fn assert_all(specs: &[AssertionSpec], response: &NormalizedResponse) -> Vec<AssertionOutcome> {
    specs.iter().map(|spec| assert_one(spec, response)).collect()
}

/// Total evaluation: a malformed assertion becomes a failed outcome, never an
/// Err or a panic.
pub fn assert_one(spec: &AssertionSpec, response: &NormalizedResponse) -> AssertionOutcome {
    match resolve_actual(spec, response) {
        Ok(actual) => evaluate(spec, actual),
        Err(message) => AssertionOutcome::of_failure(spec, None, message),
    }
}

fn resolve_actual(
    spec: &AssertionSpec,
    response: &NormalizedResponse,
) -> Result<Option<String>, String> {
    match spec.kind {
        AssertionKind::StatusCode => Ok(Some(response.status.to_string())),
        AssertionKind::ResponseTime => Ok(Some(response.duration_ms.to_string())),
        AssertionKind::Header => Ok(lookup_header(&response.headers, &spec.expression)),
        AssertionKind::JsonPath => Ok(query_json_path(&spec.expression, &response.body)),
        AssertionKind::Contains => Ok(Some(response.body.clone())),
        AssertionKind::Unsupported => Err("unsupported assertion kind".to_string()),
    }
}

fn evaluate(spec: &AssertionSpec, actual: Option<String>) -> AssertionOutcome {
    let expected = spec.expected.clone().unwrap_or_default();
    let shown = actual.clone().unwrap_or_default();
    let verdict = match spec.operator {
        Operator::Eq => Ok(shown == expected),
        Operator::Ne => Ok(shown != expected),
        Operator::Gt => compare_numeric(&shown, &expected, |a, e| a > e),
        Operator::Lt => compare_numeric(&shown, &expected, |a, e| a < e),
        Operator::Gte => compare_numeric(&shown, &expected, |a, e| a >= e),
        Operator::Lte => compare_numeric(&shown, &expected, |a, e| a <= e),
        Operator::Contains => Ok(shown.contains(&expected)),
        Operator::NotContains => Ok(!shown.contains(&expected)),
        Operator::Regex => match Regex::new(&expected) {
            Ok(regex) => Ok(regex.is_match(&shown)),
            Err(err) => Err(format!("comparison failed: {}", err)),
        },
        Operator::IsNull => Ok(shown.is_empty()),
        Operator::IsNotNull => Ok(!shown.is_empty()),
        Operator::Unsupported => Err("unsupported operator".to_string()),
    };
    match verdict {
        Ok(true) => AssertionOutcome::of_success(
            spec,
            actual,
            format!("assertion passed: {} {} {}", shown, spec.operator.label(), expected),
        ),
        Ok(false) => AssertionOutcome::of_failure(
            spec,
            actual,
            format!(
                "assertion failed: actual [{}] {} expected [{}]",
                shown,
                spec.operator.label(),
                expected
            ),
        ),
        Err(message) => AssertionOutcome::of_failure(spec, actual, message),
    }
}

fn compare_numeric(actual: &str, expected: &str, compare: fn(f64, f64) -> bool) -> Result<bool, String> {
    match (actual.trim().parse::<f64>(), expected.trim().parse::<f64>()) {
        (Ok(left), Ok(right)) => Ok(compare(left, right)),
        _ => Err(format!(
            "comparison failed: {:?} and {:?} are not both numeric",
            actual, expected
        )),
    }
}
