//! The placeholder token grammar and scanner.
//!
//! A token is `{{` immediately followed by one or more ASCII word characters
//! (letters, digits, underscore) immediately followed by `}}`. No internal
//! whitespace, no nesting. Keys may start with a digit. This grammar is the
//! wire format baked into stored template bodies and is shared by schema
//! reconciliation, validation and substitution; it must not drift.

/// Word characters permitted inside a token.
fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Renders the literal token for a key, exactly as it appears in a body.
pub fn token_for(key: &str) -> String {
    format!("{{{{{}}}}}", key)
}

/// Scans `body` and returns the distinct placeholder keys it references, in
/// first-appearance order.
///
/// Malformed sequences (`{{}}`, `{{two words}}`, unclosed braces) are plain
/// text, not tokens. A run like `{{{name}}}` yields `name`: the scanner
/// resynchronizes on the innermost well-formed token, matching what a
/// `\{\{(\w+)\}\}` pattern would find.
pub fn extract_keys(body: &str) -> Vec<String> {
    let bytes = body.as_bytes();
    let mut keys: Vec<String> = Vec::new();
    let mut i = 0;

    while i + 4 <= bytes.len() {
        if bytes[i] != b'{' || bytes[i + 1] != b'{' {
            i += 1;
            continue;
        }
        let start = i + 2;
        let mut end = start;
        while end < bytes.len() && is_word_byte(bytes[end]) {
            end += 1;
        }
        if end > start && end + 1 < bytes.len() && bytes[end] == b'}' && bytes[end + 1] == b'}' {
            // Word bytes are ASCII, so this slice is valid UTF-8 boundaries.
            let key = &body[start..end];
            if !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
            i = end + 2;
        } else {
            i += 1;
        }
    }

    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_keys_in_first_appearance_order() {
        let body = "Dear {{name}}, your salary is {{salary}} from {{joining_date}}.";
        assert_eq!(extract_keys(body), vec!["name", "salary", "joining_date"]);
    }

    #[test]
    fn duplicate_tokens_yield_one_key() {
        assert_eq!(extract_keys("{{name}} and again {{name}}"), vec!["name"]);
    }

    #[test]
    fn body_without_tokens_yields_nothing() {
        assert!(extract_keys("plain text, no tokens here").is_empty());
        assert!(extract_keys("").is_empty());
    }

    #[test]
    fn malformed_tokens_are_ignored() {
        assert!(extract_keys("{{}}").is_empty());
        assert!(extract_keys("{{two words}}").is_empty());
        assert!(extract_keys("{{dangling").is_empty());
        assert!(extract_keys("{single}").is_empty());
        assert!(extract_keys("{{tr@iling}}").is_empty());
    }

    #[test]
    fn digit_leading_keys_are_valid() {
        // \w+ permits a leading digit; the scanner keeps that behavior.
        assert_eq!(extract_keys("use {{2fa}} now"), vec!["2fa"]);
    }

    #[test]
    fn triple_braces_resynchronize_on_inner_token() {
        assert_eq!(extract_keys("{{{name}}}"), vec!["name"]);
    }

    #[test]
    fn adjacent_and_boundary_tokens() {
        assert_eq!(extract_keys("{{a}}{{b}}"), vec!["a", "b"]);
        assert_eq!(extract_keys("{{a}}"), vec!["a"]);
    }

    #[test]
    fn token_round_trips_through_token_for() {
        let body = token_for("full_name");
        assert_eq!(body, "{{full_name}}");
        assert_eq!(extract_keys(&body), vec!["full_name"]);
    }
}
