use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use cron::Schedule as CronSchedule;
use std::str::FromStr;

// The cron crate wants a seconds field; classic 5-field expressions get one
// prepended.
fn normalize(expression: &str) -> String {
    if expression.split_whitespace().count() == 5 {
        format!("0 {}", expression)
    } else {
        expression.to_string()
    }
}

pub fn validate(expression: &str) -> Result<()> {
    CronSchedule::from_str(&normalize(expression))
        .map(|_| ())
        .map_err(|err| {
            EngineError::Validation(format!("invalid cron expression {:?}: {}", expression, err))
        })
}

/// Strictly-next occurrence after the given instant.
pub fn next_occurrence(expression: &str, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    CronSchedule::from_str(&normalize(expression))
        .ok()?
        .after(&after)
        .next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn classic_five_field_expressions_are_accepted() {
        assert!(validate("*/5 * * * *").is_ok());
        assert!(validate("0 3 * * 1").is_ok());
    }

    #[test]
    fn six_field_expressions_pass_through() {
        assert!(validate("30 */5 * * * *").is_ok());
    }

    #[test]
    fn garbage_is_rejected_as_validation() {
        let err = validate("every five minutes").unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(validate("* * *").is_err());
    }

    #[test]
    fn next_occurrence_rounds_up_to_the_next_slot() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 2, 0).unwrap();
        assert_eq!(
            next_occurrence("*/5 * * * *", at),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 5, 0).unwrap())
        );
    }

    #[test]
    fn next_occurrence_is_strictly_after() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 5, 0).unwrap();
        assert_eq!(
            next_occurrence("*/5 * * * *", at),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 10, 0).unwrap())
        );
    }
}
