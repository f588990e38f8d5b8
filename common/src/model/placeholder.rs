use serde::{Deserialize, Serialize};

/// The value type of a single placeholder, driving both validation and
/// output formatting during substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Text,
    Number,
    Date,
    Email,
}

/// One schema entry of a template: describes a single `{{key}}` token found
/// in the template body.
///
/// The list of `PlaceholderSpec`s attached to a template is kept in sync with
/// the tokens actually present in the body by the reconciliation step that
/// runs before every save. Per-key configuration (label, type, required flag,
/// default value) is user-editable and survives edits to unrelated parts of
/// the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderSpec {
    /// Case-sensitive identifier matching a `{{key}}` token in the body.
    pub key: String,
    /// Human-readable display name, used verbatim in validation messages.
    pub label: String,
    pub value_type: ValueType,
    pub required: bool,
    /// Fallback value used during substitution when no data is supplied.
    #[serde(default)]
    pub default_value: Option<String>,
}

impl PlaceholderSpec {
    /// Builds the default spec for a key that has just appeared in a template
    /// body: title-cased label, inferred type, required, no default value.
    pub fn synthesized(key: &str) -> Self {
        Self {
            key: key.to_string(),
            label: default_label(key),
            value_type: infer_value_type(key),
            required: true,
            default_value: None,
        }
    }
}

/// Title-cases a key for display: underscores become spaces and each word
/// gets a leading capital (`joining_date` -> `Joining Date`).
pub fn default_label(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Guesses a value type from substrings of the key, checked case-insensitively:
/// `date` -> Date, `email` -> Email, `salary`/`amount` -> Number, else Text.
pub fn infer_value_type(key: &str) -> ValueType {
    let lower = key.to_lowercase();
    if lower.contains("date") {
        ValueType::Date
    } else if lower.contains("email") {
        ValueType::Email
    } else if lower.contains("salary") || lower.contains("amount") {
        ValueType::Number
    } else {
        ValueType::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_title_cases_underscored_keys() {
        assert_eq!(default_label("joining_date"), "Joining Date");
        assert_eq!(default_label("name"), "Name");
        assert_eq!(default_label("employee__id"), "Employee Id");
    }

    #[test]
    fn type_inference_follows_key_substrings() {
        assert_eq!(infer_value_type("joining_date"), ValueType::Date);
        assert_eq!(infer_value_type("personal_email"), ValueType::Email);
        assert_eq!(infer_value_type("salary"), ValueType::Number);
        assert_eq!(infer_value_type("bonus_amount"), ValueType::Number);
        assert_eq!(infer_value_type("name"), ValueType::Text);
    }

    #[test]
    fn date_wins_over_number_keywords() {
        // "salary_review_date" mentions both; the date check runs first.
        assert_eq!(infer_value_type("salary_review_date"), ValueType::Date);
    }

    #[test]
    fn synthesized_spec_is_required_with_no_default() {
        let spec = PlaceholderSpec::synthesized("annual_salary");
        assert_eq!(spec.key, "annual_salary");
        assert_eq!(spec.label, "Annual Salary");
        assert_eq!(spec.value_type, ValueType::Number);
        assert!(spec.required);
        assert!(spec.default_value.is_none());
    }
}
