/*!
 * Small text and logging helpers shared across the service.
 *
 * These are the common primitives for request logging: bounded truncation
 * of large payloads, masking of sensitive headers, and a couple of
 * JSON-value accessors used by the webhook extractor.
 */

use std::collections::BTreeMap;

use axum::http::HeaderMap;
use serde_json::Value;

/// Headers whose values must never reach the logs.
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie", "x-webhook-secret"];

/// Truncate a string for logging, appending a marker with the original length
/// when the limit is exceeded.
pub fn truncate_for_log(s: &str, limit: usize) -> String {
    if s.len() <= limit {
        return s.to_string();
    }
    // Cut on a char boundary at or below the limit
    let mut end = limit;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}… (truncated, {} chars total)", &s[..end], s.chars().count())
}

/// Copy a header map into a loggable form with sensitive values masked.
pub fn redact_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (name, value) in headers {
        let key = name.as_str().to_lowercase();
        let rendered = if SENSITIVE_HEADERS.contains(&key.as_str()) {
            "[redacted]".to_string()
        } else {
            value.to_str().unwrap_or("[binary]").to_string()
        };
        out.insert(key, rendered);
    }
    out
}

/// Walk a JSON value along a sequence of object keys.
pub fn get_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = value;
    for key in path {
        cur = cur.as_object()?.get(*key)?;
    }
    Some(cur)
}

/// Return the trimmed string content of a JSON value, or `None` when the
/// value is not a string or trims to empty.
pub fn as_non_empty_str(value: Option<&Value>) -> Option<String> {
    let s = value?.as_str()?.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

/// Current date in `YYYY-MM-DD` form, used for workflow stage comments.
pub fn format_date_for_comment() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}
