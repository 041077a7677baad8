//! Input normalization helpers
//!
//! Free text is trimmed and empty strings become absent; numeric text from
//! untrusted sources (metadata prefill) is coerced leniently, with
//! malformed input treated as absent rather than zero.

use crate::error::{LibraryError, LibraryResult};

/// Trim a free-text value; empty after trimming means absent
pub fn clean_text(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trim a required text field, rejecting empty values
pub fn required_text(value: &str, field: &str) -> LibraryResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LibraryError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Trim, drop empties, and de-duplicate category names
///
/// Matching is case-sensitive and the first occurrence wins, so the
/// caller's ordering is preserved.
pub fn clean_categories(raw: &[String]) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for name in raw {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !cleaned.iter().any(|existing| existing == trimmed) {
            cleaned.push(trimmed.to_string());
        }
    }
    cleaned
}

/// Coerce raw text to an integer
///
/// Accepts an optional sign followed by digits and ignores any trailing
/// garbage, so `"320 pages"` parses as 320. Returns `None` when no leading
/// integer is present.
pub fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Coerce raw text to a finite decimal number
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}
