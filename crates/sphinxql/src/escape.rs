//! Escaping for SphinxQL statement text.
//!
//! Two layers of quoting meet in a SphinxQL statement: the SQL string literal
//! and, inside `MATCH('...')`, the full-text query syntax. Metacharacters of the
//! full-text syntax are therefore escaped with a double backslash (the SQL layer
//! consumes one), while the SQL quote itself only needs one.
//!
//! Field and column names are never quoted; [`sanitize_field`] strips them down
//! to a safe alphabet instead.

use crate::error::{QlError, QlResult};
use crate::value::Value;
use regex::Regex;
use std::sync::LazyLock;

/// Characters that are not allowed in a field expression (`@`, `(`, `)` and `,`
/// stay so that `@(title,body)` survives).
static FIELD_STRIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z_,@()]+").expect("field strip pattern is valid")
});

/// Decimal numbers with optional sign, fraction and exponent.
static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$")
        .expect("numeric pattern is valid")
});

/// How a full-text term is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// `"term"`: match anywhere.
    #[default]
    Loose,
    /// `"^term$"`: the field must equal the phrase.
    Exact,
    /// `"^term"`: the field must start with the phrase.
    Prefix,
}

/// Backslash-escape full-text metacharacters and control characters.
///
/// This does not add quotes.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' | ')' | '|' | '-' | '!' | '@' | '~' | '"' | '&' | '/' | '^' | '$' | '=' => {
                out.push_str("\\\\");
                out.push(ch);
            }
            '\'' => out.push_str("\\'"),
            '\0' => out.push_str("\\x00"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x1a' => out.push_str("\\x1a"),
            _ => out.push(ch),
        }
    }
    out
}

/// Check if trimmed text is a plain decimal number the daemon reads unquoted.
pub fn is_numeric(s: &str) -> bool {
    NUMERIC.is_match(s)
}

/// Render a value as a literal: numbers and NULL verbatim, everything else
/// trimmed, escaped and single-quoted.
pub fn escape_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) if f.is_finite() => f.to_string(),
        Value::Float(f) => quote(&f.to_string()),
        Value::Text(s) => {
            let trimmed = s.trim();
            if is_numeric(trimmed) {
                trimmed.to_string()
            } else {
                quote(trimmed)
            }
        }
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", escape_string(s))
}

/// Render one full-text term, trimmed, escaped and wrapped per `mode`.
///
/// An empty term still renders as `""`.
pub fn escape_match_term(term: &str, mode: MatchMode) -> String {
    let escaped = escape_string(term.trim());
    match mode {
        MatchMode::Loose => format!("\"{escaped}\""),
        MatchMode::Exact => format!("\"^{escaped}$\""),
        MatchMode::Prefix => format!("\"^{escaped}\""),
    }
}

/// Strip every character outside `[A-Za-z_,@()]` from a field name.
///
/// Fails with [`QlError::InvalidField`] when nothing is left.
pub fn sanitize_field(field: &str) -> QlResult<String> {
    let cleaned = FIELD_STRIP.replace_all(field, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(QlError::invalid_field(field));
    }
    Ok(cleaned.to_string())
}

/// Validate an index name (or comma-separated list of names).
pub(crate) fn check_index(index: &str) -> QlResult<String> {
    let trimmed = index.trim();
    if trimmed.is_empty() {
        return Err(QlError::EmptyIndex);
    }
    let valid = trimmed.split(',').map(str::trim).all(|part| {
        !part.is_empty() && part.chars().all(|c| c == '_' || c.is_ascii_alphanumeric())
    });
    if !valid {
        return Err(QlError::InvalidIndex(index.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const META: &str = "()|-!@~\"&/^$=";

    /// Reverse `escape_string` one escape sequence at a time.
    fn unescape(s: &str) -> String {
        let mut out = String::new();
        let mut rest = s;
        while let Some(pos) = rest.find('\\') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            let (decoded, len) = if tail.starts_with("\\x00") {
                ('\0', 4)
            } else if tail.starts_with("\\x1a") {
                ('\x1a', 4)
            } else if tail.starts_with("\\n") {
                ('\n', 2)
            } else if tail.starts_with("\\r") {
                ('\r', 2)
            } else if tail.starts_with("\\'") {
                ('\'', 2)
            } else {
                match tail[2..].chars().next() {
                    Some(c) if META.contains(c) => (c, 3),
                    _ => ('\\', 2),
                }
            };
            out.push(decoded);
            rest = &tail[len..];
        }
        out.push_str(rest);
        out
    }

    #[test]
    fn escape_metacharacters() {
        assert_eq!(escape_string("a-b"), r"a\\-b");
        assert_eq!(escape_string("(x)"), r"\\(x\\)");
        assert_eq!(escape_string(r"back\slash"), r"back\\slash");
        assert_eq!(escape_string("it's"), r"it\'s");
        assert_eq!(escape_string("a\nb\r\0\x1a"), r"a\nb\r\x00\x1a");
    }

    #[test]
    fn escape_round_trips_every_metacharacter() {
        let samples = [
            r#"\()|-!@~"&/^$='"#,
            "plain words",
            "line\nbreak\rand\0nul\x1asub",
            r"\\already\\escaped",
            "mixed @field -neg \"quoted\" 'single'",
        ];
        for s in samples {
            assert_eq!(unescape(&escape_string(s)), s, "sample {s:?}");
        }
    }

    #[test]
    fn literal_passes_numbers_through() {
        assert_eq!(escape_literal(&Value::Int(42)), "42");
        assert_eq!(escape_literal(&Value::Float(1.5)), "1.5");
        assert_eq!(escape_literal(&Value::from(" 17 ")), "17");
        assert_eq!(escape_literal(&Value::from("-3.25e2")), "-3.25e2");
        assert_eq!(escape_literal(&Value::Null), "NULL");
    }

    #[test]
    fn literal_quotes_text() {
        assert_eq!(escape_literal(&Value::from("  hello ")), "'hello'");
        assert_eq!(escape_literal(&Value::from("o'neil")), r"'o\'neil'");
        assert_eq!(escape_literal(&Value::from("12abc")), "'12abc'");
        assert_eq!(escape_literal(&Value::from("")), "''");
    }

    #[test]
    fn literal_quotes_non_finite_floats() {
        assert_eq!(escape_literal(&Value::Float(f64::NAN)), "'NaN'");
    }

    #[test]
    fn numeric_detection() {
        for s in ["0", "10", "+1", "-1", "1.", ".5", "1e10", "2.5E-3"] {
            assert!(is_numeric(s), "{s}");
        }
        for s in ["", "-", "1e", "0x1A", "inf", "NaN", "1 2", "abc"] {
            assert!(!is_numeric(s), "{s}");
        }
    }

    #[test]
    fn match_term_modes() {
        assert_eq!(escape_match_term(" foo ", MatchMode::Loose), r#""foo""#);
        assert_eq!(escape_match_term("foo bar", MatchMode::Exact), r#""^foo bar$""#);
        assert_eq!(escape_match_term("foo", MatchMode::Prefix), r#""^foo""#);
    }

    #[test]
    fn match_term_escapes_quotes_and_operators() {
        assert_eq!(
            escape_match_term(r#"say "hi" -now"#, MatchMode::Loose),
            r#""say \\"hi\\" \\-now""#
        );
    }

    #[test]
    fn match_term_empty_is_quoted_empty() {
        assert_eq!(escape_match_term("   ", MatchMode::Loose), r#""""#);
    }

    #[test]
    fn sanitize_strips_disallowed_characters_in_order() {
        assert_eq!(sanitize_field("title").unwrap(), "title");
        assert_eq!(sanitize_field("@(title,body)").unwrap(), "@(title,body)");
        assert_eq!(sanitize_field("na;me--").unwrap(), "name");
        assert_eq!(sanitize_field("field2").unwrap(), "field");
        assert_eq!(sanitize_field("a b'c\"d").unwrap(), "abcd");
        assert_eq!(sanitize_field("user_id = 1 OR 1").unwrap(), "user_idOR");
    }

    #[test]
    fn sanitize_rejects_empty_result() {
        let err = sanitize_field("123 ;").unwrap_err();
        assert!(matches!(err, QlError::InvalidField(ref f) if f == "123 ;"));
        assert!(sanitize_field("").is_err());
    }

    #[test]
    fn index_names() {
        assert_eq!(check_index(" products ").unwrap(), "products");
        assert_eq!(check_index("main, delta2").unwrap(), "main, delta2");
        assert!(matches!(check_index("  "), Err(QlError::EmptyIndex)));
        assert!(matches!(check_index("x; DROP"), Err(QlError::InvalidIndex(_))));
        assert!(matches!(check_index("a,,b"), Err(QlError::InvalidIndex(_))));
    }
}
