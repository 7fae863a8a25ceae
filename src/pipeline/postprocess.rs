//! Post-processing: turn a raw model reply into a [`ResumeRecord`].
//!
//! Models are asked for a bare JSON object but regularly wrap it in a code
//! fence anyway, sometimes with a sentence of preamble. Cleanup runs in a
//! fixed order:
//!
//! 1. Strip the fence (` ```json ` first, then a bare ` ``` `)
//! 2. Parse as JSON; anything but an object is a decode failure
//! 3. Decode leniently into the eight-field record
//! 4. Normalise the phone number

use crate::error::ItemError;
use crate::output::ResumeRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Decode a model reply into a record, normalising `number`.
pub fn decode_resume(reply: &str) -> Result<ResumeRecord, ItemError> {
    let json_text = strip_json_fences(reply);

    let value: Value = serde_json::from_str(json_text).map_err(|e| ItemError::JsonDecode {
        detail: e.to_string(),
    })?;
    if !value.is_object() {
        return Err(ItemError::JsonDecode {
            detail: format!("expected a JSON object, got {}", json_kind(&value)),
        });
    }

    let mut record: ResumeRecord =
        serde_json::from_value(value).map_err(|e| ItemError::JsonDecode {
            detail: e.to_string(),
        })?;
    record.number = format_number(&record.number);
    Ok(record)
}

// ── Step 1: Strip code fences ────────────────────────────────────────────────

/// Return the payload inside the first code fence, or the trimmed reply if
/// there is none.
///
/// The language-tagged fence is checked first so that a reply like
/// `` Here you go: ```json {…} ``` `` yields the object, not `json {…}`.
/// An unterminated fence yields everything after the opening marker.
pub fn strip_json_fences(reply: &str) -> &str {
    let text = reply.trim();
    let opened = text
        .split_once(JSON_FENCE)
        .or_else(|| text.split_once(FENCE))
        .map(|(_, rest)| rest);

    match opened {
        Some(rest) => rest.split(FENCE).next().unwrap_or(rest).trim(),
        None => text,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Step 4: Phone numbers ────────────────────────────────────────────────────

/// Strips every `+91` / `+91-` country prefix and every non-digit.
static RE_PHONE_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+91-?|\D").unwrap());

static RE_TEN_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{10}").unwrap());

/// Normalise a free-text phone field to comma-separated 10-digit numbers.
///
/// The country prefix and all separators are removed first, then the
/// remaining digit string is cut into successive 10-digit groups; a trailing
/// remainder shorter than 10 digits is dropped.
///
/// ```rust
/// use resume_vlm::pipeline::postprocess::format_number;
///
/// assert_eq!(format_number("+91-9876543210"), "9876543210");
/// assert_eq!(format_number("9876543210 and 9123456789"), "9876543210, 9123456789");
/// assert_eq!(format_number("12345"), "");
/// ```
pub fn format_number(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let digits = RE_PHONE_NOISE.replace_all(raw, "");
    RE_TEN_DIGITS
        .find_iter(&digits)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_strip_json_fence() {
        let input = "```json\n{\"name\":\"A\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"name\":\"A\"}");
    }

    #[test]
    fn test_strip_bare_fence() {
        let input = "```\n{\"name\":\"A\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"name\":\"A\"}");
    }

    #[test]
    fn test_no_fence_passthrough() {
        assert_eq!(strip_json_fences("  {\"a\":1}\n"), "{\"a\":1}");
    }

    #[test]
    fn test_json_fence_wins_over_earlier_bare_fence_text() {
        let input = "Sure! ```json\n{\"a\":1}\n``` hope this helps";
        assert_eq!(strip_json_fences(input), "{\"a\":1}");
    }

    #[test]
    fn test_unterminated_fence() {
        assert_eq!(strip_json_fences("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_fenced_and_bare_decode_identically() {
        let body = r#"{"name":"A","email":"a@b.c","number":"+91-9876543210","skills":"Go"}"#;
        let fenced = format!("```json\n{body}\n```");
        let a = decode_resume(body).unwrap();
        let b = decode_resume(&fenced).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.number, "9876543210");
    }

    #[test]
    fn test_decode_rejects_prose() {
        let err = decode_resume("I could not read this resume.").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.to_string().starts_with("Failed to parse JSON response"));
    }

    #[test]
    fn test_decode_rejects_array() {
        let err = decode_resume("[\"Asha\", \"asha@x.io\"]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.to_string().contains("an array"), "got: {err}");
    }

    #[test]
    fn test_decode_missing_number_stays_empty() {
        let r = decode_resume(r#"{"name":"A"}"#).unwrap();
        assert_eq!(r.number, "");
    }

    #[test]
    fn test_format_number_prefix() {
        assert_eq!(format_number("+91-9876543210"), "9876543210");
        assert_eq!(format_number("+919876543210"), "9876543210");
        assert_eq!(format_number("+91 98765 43210"), "9876543210");
    }

    #[test]
    fn test_format_number_multiple() {
        assert_eq!(
            format_number("9876543210 and 9123456789"),
            "9876543210, 9123456789"
        );
        assert_eq!(
            format_number("+91-9876543210 / +91-9123456789"),
            "9876543210, 9123456789"
        );
    }

    #[test]
    fn test_format_number_too_short() {
        assert_eq!(format_number("12345"), "");
        assert_eq!(format_number(""), "");
        assert_eq!(format_number("n/a"), "");
    }

    #[test]
    fn test_format_number_drops_remainder() {
        // 12 digits after cleanup: one full group, two digits discarded.
        assert_eq!(format_number("987-654-321-012"), "9876543210");
    }
}
