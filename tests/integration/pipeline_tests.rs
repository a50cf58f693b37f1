/*!
 * End-to-end pipeline tests over mock collaborators
 */

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use stackling::app_controller::{Controller, EntryContext};
use stackling::entry_diff::ChangedField;
use stackling::errors::AppError;
use stackling::providers::mock::MockTranslator;

use crate::common::{MockCms, sample_webhook_payload, test_config};

fn controller_with(
    targets: &[&str],
    cms: Arc<MockCms>,
    translator: Arc<MockTranslator>,
) -> Controller {
    Controller::with_clients(test_config(targets), cms, translator)
}

fn entry_context(draft_version: Option<u64>) -> EntryContext {
    EntryContext {
        content_type_uid: "blog_post".to_string(),
        entry_uid: "entry123".to_string(),
        cms_locale: "en-us".to_string(),
        source_locale_id: "en-US".to_string(),
        draft_version,
    }
}

fn changed(path: &str, after: Value) -> ChangedField {
    ChangedField { path: path.to_string(), after: Some(after) }
}

/// Wait for a condition driven by a background task.
async fn wait_for(description: &str, condition: impl Fn() -> bool) {
    for _ in 0..300 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for: {}", description);
}

/// Test the full webhook flow: diff in the response, translation in the background
#[tokio::test]
async fn test_handleWebhook_withChangedEntry_shouldDiffAndLocalize() {
    let cms = Arc::new(MockCms::new(
        json!({ "title": "New", "body": { "text": "Hi" }, "empty_field": "", "_version": 4, "uid": "entry123" }),
        json!({ "title": "Old", "body": { "text": "Hi" }, "uid": "entry123" }),
    ));
    let translator = Arc::new(MockTranslator::new());
    let controller = controller_with(&["fr-FR"], cms.clone(), translator.clone());

    let payload = sample_webhook_payload("blog_post", "entry123", Some("en-us"));
    let response = controller.handle_webhook(1, &payload).await.expect("webhook should succeed");

    assert!(response.ok);
    assert!(response.received);
    assert_eq!(response.locale, "en-us");
    assert_eq!(response.extracted.entry_uid, "entry123");
    // Only the edited title shows up: body.text is unchanged, empty_field
    // is suppressed, system fields are redacted.
    assert_eq!(response.changed_fields.len(), 1);
    assert_eq!(response.changed_fields[0].get("title"), Some(&json!("New")));

    wait_for("workflow stage advance", || !cms.workflow_calls().is_empty()).await;

    let calls = translator.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].source_locale_id, "en-US");
    assert_eq!(calls[0].target_locale_id, "fr-FR");

    let localized = cms.localize_calls();
    assert_eq!(localized.len(), 1);
    assert_eq!(localized[0].locale_code, "fr-fr");
    assert_eq!(
        localized[0].entry_patch.get("title"),
        Some(&json!("[fr-FR] New"))
    );

    let workflow = cms.workflow_calls();
    assert_eq!(workflow[0].locale_code, "fr-fr");
    assert_eq!(workflow[0].workflow_stage_uid, "stage_translation_review");
    assert!(workflow[0].comment.contains("from version 4"));
}

/// Test that an unchanged entry short-circuits without translation
#[tokio::test]
async fn test_handleWebhook_withNoChanges_shouldSkipTranslation() {
    let entry = json!({ "title": "Same", "body": { "text": "Hi" } });
    let cms = Arc::new(MockCms::new(entry.clone(), entry));
    let translator = Arc::new(MockTranslator::new());
    let controller = controller_with(&["fr-FR"], cms.clone(), translator.clone());

    let payload = sample_webhook_payload("blog_post", "entry123", Some("en-us"));
    let response = controller.handle_webhook(1, &payload).await.expect("webhook should succeed");

    assert!(response.changed_fields.is_empty());
    assert!(translator.calls().is_empty());
    assert!(cms.localize_calls().is_empty());
}

/// Test the explicit no-op when no target locales are configured
#[tokio::test]
async fn test_handleWebhook_withNoTargetLocales_shouldReturnDiffWithoutTranslating() {
    let cms = Arc::new(MockCms::new(
        json!({ "title": "New" }),
        json!({ "title": "Old" }),
    ));
    let translator = Arc::new(MockTranslator::new());
    let controller = controller_with(&[], cms.clone(), translator.clone());

    let payload = sample_webhook_payload("blog_post", "entry123", Some("en-us"));
    let response = controller.handle_webhook(1, &payload).await.expect("webhook should succeed");

    assert_eq!(response.changed_fields.len(), 1);
    assert!(translator.calls().is_empty());
    assert!(cms.localize_calls().is_empty());
}

/// Test that a missing locale falls back to the default baseline locale
#[tokio::test]
async fn test_handleWebhook_withoutLocale_shouldDefaultToBaseline() {
    let cms = Arc::new(MockCms::new(json!({ "title": "New" }), json!({ "title": "Old" })));
    let translator = Arc::new(MockTranslator::new());
    let controller = controller_with(&[], cms, translator);

    let payload = sample_webhook_payload("blog_post", "entry123", None);
    let response = controller.handle_webhook(1, &payload).await.expect("webhook should succeed");
    assert_eq!(response.locale, "en-us");
}

/// Test rejection of payloads without the required identifiers
#[tokio::test]
async fn test_handleWebhook_withUnsupportedPayload_shouldRejectWith400() {
    let cms = Arc::new(MockCms::default());
    let translator = Arc::new(MockTranslator::new());
    let controller = controller_with(&[], cms, translator);

    let err = controller
        .handle_webhook(1, &json!({ "module": "workflow" }))
        .await
        .expect_err("should reject");
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(err.http_status(), 400);
}

/// Test rejection of non-workflow modules
#[tokio::test]
async fn test_handleWebhook_withModuleMismatch_shouldRejectWith400() {
    let cms = Arc::new(MockCms::default());
    let translator = Arc::new(MockTranslator::new());
    let controller = controller_with(&[], cms, translator);

    let mut payload = sample_webhook_payload("blog_post", "entry123", None);
    payload["module"] = json!("asset");

    let err = controller.handle_webhook(1, &payload).await.expect_err("should reject");
    assert!(matches!(err, AppError::Validation(_)));
}

/// Test that an upstream fetch failure aborts with the upstream status
#[tokio::test]
async fn test_handleWebhook_withFetchFailure_shouldPropagateStatus() {
    let cms = Arc::new(MockCms::default().with_fetch_failure(404));
    let translator = Arc::new(MockTranslator::new());
    let controller = controller_with(&["fr-FR"], cms, translator.clone());

    let payload = sample_webhook_payload("blog_post", "entry123", Some("en-us"));
    let err = controller.handle_webhook(1, &payload).await.expect_err("should fail");
    assert_eq!(err.http_status(), 404);
    assert!(translator.calls().is_empty());
}

/// Test that one failing locale does not abort the others
#[tokio::test]
async fn test_processLocales_withFailingTranslation_shouldContinueWithNextLocale() {
    let cms = Arc::new(MockCms::new(json!({}), json!({})));
    let translator = Arc::new(MockTranslator::new().with_failure_for("de-DE"));
    let controller = controller_with(&["de-DE", "fr-FR"], cms.clone(), translator.clone());

    let changes = vec![changed("title", json!("Hello"))];
    controller.process_locales(7, entry_context(Some(2)), changes).await;

    // Both locales were attempted, in order
    let calls = translator.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].target_locale_id, "de-DE");
    assert_eq!(calls[1].target_locale_id, "fr-FR");

    // Only the healthy locale was localized and advanced
    let localized = cms.localize_calls();
    assert_eq!(localized.len(), 1);
    assert_eq!(localized[0].locale_code, "fr-fr");
    let workflow = cms.workflow_calls();
    assert_eq!(workflow.len(), 1);
    assert!(workflow[0].comment.contains("from version 2"));
}

/// Test that a localize failure is isolated the same way
#[tokio::test]
async fn test_processLocales_withLocalizeFailure_shouldSkipStageAdvanceForThatLocale() {
    let cms = Arc::new(
        MockCms::new(json!({}), json!({})).with_localize_failure_for("de-de"),
    );
    let translator = Arc::new(MockTranslator::new());
    let controller = controller_with(&["de-DE", "fr-FR"], cms.clone(), translator);

    let changes = vec![changed("title", json!("Hello"))];
    controller.process_locales(7, entry_context(None), changes).await;

    let workflow = cms.workflow_calls();
    assert_eq!(workflow.len(), 1);
    assert_eq!(workflow[0].locale_code, "fr-fr");
    assert!(workflow[0].comment.contains("from version unknown"));
}

/// Test that purely non-string diffs trigger no provider calls
#[tokio::test]
async fn test_processLocales_withNoTranslatableStrings_shouldSkipProvider() {
    let cms = Arc::new(MockCms::new(json!({}), json!({})));
    let translator = Arc::new(MockTranslator::new());
    let controller = controller_with(&["fr-FR"], cms.clone(), translator.clone());

    let changes = vec![changed("count", json!(5)), changed("blank", json!("  "))];
    controller.process_locales(7, entry_context(None), changes).await;

    assert!(translator.calls().is_empty());
    assert!(cms.localize_calls().is_empty());
}

/// Test that untranslated paths keep their draft value in the patch
#[tokio::test]
async fn test_processLocales_withPartialProviderResult_shouldFallBackToDraftText() {
    let cms = Arc::new(MockCms::new(json!({}), json!({})));
    let translator = Arc::new(MockTranslator::new().with_skipped_key("subtitle"));
    let controller = controller_with(&["fr-FR"], cms.clone(), translator);

    let changes = vec![
        changed("title", json!("Hello")),
        changed("subtitle", json!("World")),
        changed("count", json!(5)),
    ];
    controller.process_locales(7, entry_context(None), changes).await;

    let localized = cms.localize_calls();
    assert_eq!(localized.len(), 1);
    let patch = &localized[0].entry_patch;
    assert_eq!(patch.get("title"), Some(&json!("[fr-FR] Hello")));
    assert_eq!(patch.get("subtitle"), Some(&json!("World")));
    // Non-string changes ride along untranslated
    assert_eq!(patch.get("count"), Some(&json!(5)));
}
