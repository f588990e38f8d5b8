//! Data-record validation against a placeholder schema.
//!
//! Validation is the enforcement point of the engine: substitution later on
//! is best-effort and never fails, so anything a caller wants rejected has to
//! be caught here. Every field is checked independently and all messages are
//! collected, so a client can surface them to the user in one pass.

use chrono::NaiveDate;
use common::model::placeholder::{PlaceholderSpec, ValueType};
use common::model::record::DataRecord;

/// Date formats accepted by validation and re-parsed during rendering, tried
/// in order. ISO first; day-first wins for ambiguous slashed dates.
pub(crate) const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%d %B %Y",
];

/// Parses a raw value as a calendar date using the shared format list.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// A plain numeric literal: optional sign, digits, at most one decimal point.
/// Deliberately stricter than `f64::from_str`, which would admit `inf`,
/// `NaN` and exponent notation.
pub(crate) fn is_numeric_literal(value: &str) -> bool {
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|&c| c == '.').count() <= 1
        && digits.chars().any(|c| c.is_ascii_digit())
}

/// Single-address email shape check: non-empty local part, `@`, domain with
/// at least one internal dot, no whitespace anywhere.
pub(crate) fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Validates `record` against `specs`, returning every applicable error.
///
/// Required specs produce `"<label> is required"` when the value is absent,
/// empty or whitespace-only. Independently, any non-blank value is checked
/// against the spec's type. One field's failure never short-circuits the
/// others; an empty result means the record is valid.
pub fn validate(specs: &[PlaceholderSpec], record: &DataRecord) -> Vec<String> {
    let mut errors = Vec::new();

    for spec in specs {
        let value = record.get(&spec.key).map(String::as_str).unwrap_or("");
        let blank = value.trim().is_empty();

        if spec.required && blank {
            errors.push(format!("{} is required", spec.label));
        }

        if blank {
            continue;
        }

        match spec.value_type {
            ValueType::Text => {}
            ValueType::Email => {
                if !is_valid_email(value.trim()) {
                    errors.push(format!("{} must be a valid email", spec.label));
                }
            }
            ValueType::Number => {
                if !is_numeric_literal(value) {
                    errors.push(format!("{} must be a number", spec.label));
                }
            }
            ValueType::Date => {
                if parse_date(value).is_none() {
                    errors.push(format!("{} must be a valid date", spec.label));
                }
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::reconcile::reconcile;
    use std::collections::HashMap;

    fn record(pairs: &[(&str, &str)]) -> DataRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_record_produces_one_error_per_required_field() {
        let specs = reconcile(&[], "{{name}} {{salary}} {{joining_date}}");
        let errors = validate(&specs, &HashMap::new());
        assert_eq!(errors.len(), specs.len());
        for spec in &specs {
            assert!(errors.iter().any(|e| e.contains(&spec.label)), "{:?}", errors);
        }
    }

    #[test]
    fn required_error_uses_the_label_verbatim() {
        let specs = reconcile(&[], "Dear {{name}}");
        let errors = validate(&specs, &HashMap::new());
        assert_eq!(errors, vec!["Name is required"]);
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let specs = reconcile(&[], "{{name}}");
        let errors = validate(&specs, &record(&[("name", "   ")]));
        assert_eq!(errors, vec!["Name is required"]);
    }

    #[test]
    fn optional_blank_fields_are_fine() {
        let mut specs = reconcile(&[], "{{nickname}}");
        specs[0].required = false;
        assert!(validate(&specs, &HashMap::new()).is_empty());
    }

    #[test]
    fn email_shape_is_enforced() {
        let specs = reconcile(&[], "{{work_email}}");
        assert!(validate(&specs, &record(&[("work_email", "jane@corp.com")])).is_empty());

        for bad in ["janecorp.com", "jane@corp", "jane @corp.com", "@corp.com", "jane@"] {
            let errors = validate(&specs, &record(&[("work_email", bad)]));
            assert_eq!(errors, vec!["Work Email must be a valid email"], "value: {bad}");
        }
    }

    #[test]
    fn numbers_accept_integers_and_decimals_only() {
        let specs = reconcile(&[], "{{salary}}");
        for good in ["50000", "50000.50", "-120", "+3.5"] {
            assert!(validate(&specs, &record(&[("salary", good)])).is_empty(), "value: {good}");
        }
        for bad in ["fifty", "1.2.3", "12f", "NaN", "1e5", "."] {
            let errors = validate(&specs, &record(&[("salary", bad)]));
            assert_eq!(errors, vec!["Salary must be a number"], "value: {bad}");
        }
    }

    #[test]
    fn dates_accept_common_formats_and_reject_garbage() {
        let specs = reconcile(&[], "{{joining_date}}");
        for good in ["2024-01-15", "15/01/2024", "15-01-2024", "January 15, 2024"] {
            assert!(
                validate(&specs, &record(&[("joining_date", good)])).is_empty(),
                "value: {good}"
            );
        }
        for bad in ["someday", "2024-13-40", "15th Jan-ish"] {
            let errors = validate(&specs, &record(&[("joining_date", bad)]));
            assert_eq!(errors, vec!["Joining Date must be a valid date"], "value: {bad}");
        }
    }

    #[test]
    fn errors_accumulate_across_fields() {
        let specs = reconcile(&[], "{{name}} {{salary}} {{work_email}}");
        let errors = validate(
            &specs,
            &record(&[("salary", "lots"), ("work_email", "nope")]),
        );
        assert_eq!(
            errors,
            vec![
                "Name is required",
                "Salary must be a number",
                "Work Email must be a valid email",
            ]
        );
    }
}
