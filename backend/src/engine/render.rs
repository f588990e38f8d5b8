//! Substitution and type-aware formatting.
//!
//! Rendering is best-effort by contract: it never fails on bad or missing
//! data. Unresolvable keys become empty strings, unparseable dates and
//! amounts pass through raw. Anything that should stop a generation has to be
//! rejected by `validate` beforehand.

use crate::engine::tokens::token_for;
use crate::engine::validate::parse_date;
use common::model::placeholder::{PlaceholderSpec, ValueType};
use common::model::record::DataRecord;
use num_format::{Buffer, CustomFormat, Grouping};

/// Output format for dates: long human-readable form, `January 15, 2024`.
const DATE_OUTPUT_FORMAT: &str = "%B %-d, %Y";

/// The formatting convention applied during substitution.
///
/// The convention affects output bytes, so it is an explicit input to
/// `render` rather than a hidden global. Services use [`RenderConfig::inr`],
/// the product's documented default.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Symbol prefixed to currency amounts.
    pub currency_symbol: String,
    /// Digit grouping applied to the integer part of currency amounts.
    pub currency_format: CustomFormat,
}

impl RenderConfig {
    /// Indian Rupee convention: `₹` with lakh/crore grouping
    /// (`₹12,34,567`).
    pub fn inr() -> Result<Self, String> {
        let currency_format = CustomFormat::builder()
            .grouping(Grouping::Indian)
            .separator(",")
            .build()
            .map_err(|e| e.to_string())?;
        Ok(Self {
            currency_symbol: "₹".to_string(),
            currency_format,
        })
    }
}

/// Whether a number-typed key is rendered as a currency amount.
fn is_currency_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    lower.contains("salary") || lower.contains("amount")
}

/// Formats a raw amount as currency: sign, symbol, grouped integer part,
/// two-digit fraction when the amount has one. Non-numeric input passes
/// through unchanged.
fn format_currency(raw: &str, config: &RenderConfig) -> String {
    let Ok(value) = raw.trim().parse::<f64>() else {
        return raw.to_string();
    };
    // Work in hundredths so fraction rounding can carry into the integer part.
    let hundredths = (value.abs() * 100.0).round() as u64;
    let whole = hundredths / 100;
    let fraction = hundredths % 100;

    let mut grouped = Buffer::default();
    grouped.write_formatted(&whole, &config.currency_format);

    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }
    out.push_str(&config.currency_symbol);
    out.push_str(grouped.as_str());
    if fraction > 0 {
        out.push_str(&format!(".{:02}", fraction));
    }
    out
}

/// Formats a raw date value long-form; unparseable input passes through raw.
fn format_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format(DATE_OUTPUT_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

/// Resolves and formats the substitution value for one spec.
fn formatted_value(spec: &PlaceholderSpec, record: &DataRecord, config: &RenderConfig) -> String {
    let supplied = record
        .get(&spec.key)
        .map(String::as_str)
        .filter(|v| !v.trim().is_empty());
    let raw = supplied
        .or(spec.default_value.as_deref())
        .unwrap_or_default();
    if raw.is_empty() {
        return String::new();
    }

    match spec.value_type {
        ValueType::Date => format_date(raw),
        ValueType::Number if is_currency_key(&spec.key) => format_currency(raw, config),
        _ => raw.to_string(),
    }
}

/// Substitutes every `{{key}}` token of `specs` in `body` with the resolved,
/// formatted value for that key.
///
/// Every spec key is replaced, supplied or not, so no literal token survives
/// for a known key. Replacement is by the full token including braces:
/// `{{name}}` never touches `{{full_name}}`.
pub fn render(
    specs: &[PlaceholderSpec],
    body: &str,
    record: &DataRecord,
    config: &RenderConfig,
) -> String {
    let mut text = body.to_string();
    for spec in specs {
        let value = formatted_value(spec, record, config);
        text = text.replace(&token_for(&spec.key), &value);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::reconcile::reconcile;
    use common::model::record::DataRecord;

    fn record(pairs: &[(&str, &str)]) -> DataRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn config() -> RenderConfig {
        RenderConfig::inr().unwrap()
    }

    #[test]
    fn renders_long_form_dates() {
        let body = "Joining on {{joining_date}}.";
        let specs = reconcile(&[], body);
        let out = render(&specs, body, &record(&[("joining_date", "2024-01-15")]), &config());
        assert_eq!(out, "Joining on January 15, 2024.");
    }

    #[test]
    fn unparseable_dates_pass_through_raw() {
        let body = "{{joining_date}}";
        let specs = reconcile(&[], body);
        let out = render(&specs, body, &record(&[("joining_date", "soonish")]), &config());
        assert_eq!(out, "soonish");
    }

    #[test]
    fn salary_keys_format_as_indian_rupee_currency() {
        let body = "Dear {{name}}, salary {{salary}}.";
        let specs = reconcile(&[], body);
        let out = render(
            &specs,
            body,
            &record(&[("name", "Jane"), ("salary", "50000")]),
            &config(),
        );
        assert_eq!(out, "Dear Jane, salary ₹50,000.");
        assert!(!out.contains("{{"));
    }

    #[test]
    fn currency_uses_lakh_crore_grouping_and_paise() {
        let body = "{{total_amount}}";
        let specs = reconcile(&[], body);
        let cfg = config();
        let cases = [
            ("1234567", "₹12,34,567"),
            ("1234567.5", "₹12,34,567.50"),
            ("-999", "-₹999"),
            ("0", "₹0"),
        ];
        for (raw, expected) in cases {
            let out = render(&specs, body, &record(&[("total_amount", raw)]), &cfg);
            assert_eq!(out, expected, "raw: {raw}");
        }
    }

    #[test]
    fn plain_numbers_emails_and_text_pass_through() {
        let body = "{{name}} / {{age}} / {{work_email}}";
        let mut specs = reconcile(&[], body);
        specs.iter_mut().find(|s| s.key == "age").unwrap().value_type =
            common::model::placeholder::ValueType::Number;
        let out = render(
            &specs,
            body,
            &record(&[("name", "Jane"), ("age", "41"), ("work_email", "j@x.co")]),
            &config(),
        );
        assert_eq!(out, "Jane / 41 / j@x.co");
    }

    #[test]
    fn missing_values_fall_back_to_default_then_empty() {
        let body = "City: {{city}}, Note: {{note}}";
        let mut specs = reconcile(&[], body);
        specs.iter_mut().find(|s| s.key == "city").unwrap().default_value =
            Some("Bengaluru".to_string());
        let out = render(&specs, body, &DataRecord::new(), &config());
        assert_eq!(out, "City: Bengaluru, Note: ");
    }

    #[test]
    fn tokens_do_not_cross_contaminate_on_shared_prefixes() {
        let body = "{{name}} vs {{full_name}}";
        let specs = reconcile(&[], body);
        let out = render(
            &specs,
            body,
            &record(&[("name", "A"), ("full_name", "B")]),
            &config(),
        );
        assert_eq!(out, "A vs B");
    }

    #[test]
    fn rendering_never_fails_on_invalid_data() {
        // Garbage in every typed field still renders; validation is the gate.
        let body = "{{salary_amount}} on {{joining_date}} to {{work_email}}";
        let specs = reconcile(&[], body);
        let out = render(
            &specs,
            body,
            &record(&[
                ("salary_amount", "a lot"),
                ("joining_date", "eventually"),
                ("work_email", "not-an-email"),
            ]),
            &config(),
        );
        assert_eq!(out, "a lot on eventually to not-an-email");
    }
}
