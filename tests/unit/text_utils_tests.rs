/*!
 * Tests for logging/text helper functions
 */

use axum::http::{HeaderMap, HeaderValue};
use serde_json::json;
use stackling::text_utils::{
    as_non_empty_str, format_date_for_comment, get_path, redact_headers, truncate_for_log,
};

/// Test truncation below and above the limit
#[test]
fn test_truncateForLog_withShortAndLongInput_shouldTruncateOnlyLong() {
    assert_eq!(truncate_for_log("short", 100), "short");

    let long = "x".repeat(150);
    let truncated = truncate_for_log(&long, 100);
    assert!(truncated.starts_with(&"x".repeat(100)));
    assert!(truncated.contains("truncated, 150 chars total"));
}

/// Test that truncation never splits a multi-byte character
#[test]
fn test_truncateForLog_withMultiByteBoundary_shouldCutOnCharBoundary() {
    let text = "aé".repeat(40); // 3 bytes per repeat
    let truncated = truncate_for_log(&text, 4);
    assert!(truncated.contains("truncated"));
}

/// Test sensitive header masking
#[test]
fn test_redactHeaders_withSensitiveHeaders_shouldMaskValues() {
    let mut headers = HeaderMap::new();
    headers.insert("authorization", HeaderValue::from_static("Bearer secret"));
    headers.insert("cookie", HeaderValue::from_static("session=abc"));
    headers.insert("x-webhook-secret", HeaderValue::from_static("hook-secret"));
    headers.insert("content-type", HeaderValue::from_static("application/json"));

    let redacted = redact_headers(&headers);
    assert_eq!(redacted["authorization"], "[redacted]");
    assert_eq!(redacted["cookie"], "[redacted]");
    assert_eq!(redacted["x-webhook-secret"], "[redacted]");
    assert_eq!(redacted["content-type"], "application/json");
}

/// Test JSON path walking
#[test]
fn test_getPath_withNestedValue_shouldWalkObjects() {
    let value = json!({ "data": { "workflow": { "entry": { "uid": "e1" } } } });
    assert_eq!(
        get_path(&value, &["data", "workflow", "entry", "uid"]),
        Some(&json!("e1"))
    );
    assert_eq!(get_path(&value, &["data", "missing"]), None);
    assert_eq!(get_path(&value, &["data", "workflow", "entry", "uid", "deeper"]), None);
}

/// Test non-empty string coercion
#[test]
fn test_asNonEmptyStr_withVariousValues_shouldTrimAndFilter() {
    assert_eq!(as_non_empty_str(Some(&json!("  hi  "))), Some("hi".to_string()));
    assert_eq!(as_non_empty_str(Some(&json!("   "))), None);
    assert_eq!(as_non_empty_str(Some(&json!(42))), None);
    assert_eq!(as_non_empty_str(None), None);
}

/// Test the audit comment date format
#[test]
fn test_formatDateForComment_shouldBeIsoDate() {
    let date = format_date_for_comment();
    assert_eq!(date.len(), 10);
    assert_eq!(date.as_bytes()[4], b'-');
    assert_eq!(date.as_bytes()[7], b'-');
}
