/*!
 * Tests for provider types and the mock translator
 */

use serde_json::json;
use stackling::providers::mock::MockTranslator;
use stackling::providers::{MachineTranslator, TranslatedItem, TranslationItem};

fn items(texts: &[(&str, &str)]) -> Vec<TranslationItem> {
    texts
        .iter()
        .map(|(key, text)| TranslationItem {
            key: key.to_string(),
            source_text: text.to_string(),
        })
        .collect()
}

/// Test the wire shape of translation request items
#[test]
fn test_translationItem_serialization_shouldUseProviderFieldNames() {
    let item = TranslationItem {
        key: "body.text".to_string(),
        source_text: "Hello".to_string(),
    };
    let rendered = serde_json::to_value(&item).expect("serializable");
    assert_eq!(rendered, json!({ "key": "body.text", "sourceText": "Hello" }));
}

/// Test the wire shape of translated response items
#[test]
fn test_translatedItem_deserialization_shouldReadProviderFieldNames() {
    let item: TranslatedItem =
        serde_json::from_value(json!({ "key": "title", "translationText": "Bonjour" }))
            .expect("deserializable");
    assert_eq!(item.key, "title");
    assert_eq!(item.translation_text, "Bonjour");
}

/// Test mock translation output and call recording
#[tokio::test]
async fn test_mockTranslator_withItems_shouldTranslateAndRecordCall() {
    let translator = MockTranslator::new();
    let request = items(&[("title", "Hello"), ("body.text", "World")]);

    let translated = translator
        .translate("en-US", "fr-FR", &request)
        .await
        .expect("mock should succeed");

    assert_eq!(translated.len(), 2);
    assert_eq!(translated[0].key, "title");
    assert_eq!(translated[0].translation_text, "[fr-FR] Hello");

    let calls = translator.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].source_locale_id, "en-US");
    assert_eq!(calls[0].target_locale_id, "fr-FR");
    assert_eq!(calls[0].item_count, 2);
}

/// Test configured failures for one target locale
#[tokio::test]
async fn test_mockTranslator_withFailureLocale_shouldErrorOnlyForIt() {
    let translator = MockTranslator::new().with_failure_for("de-DE");
    let request = items(&[("title", "Hello")]);

    assert!(translator.translate("en-US", "de-DE", &request).await.is_err());
    assert!(translator.translate("en-US", "fr-FR", &request).await.is_ok());
    assert_eq!(translator.calls().len(), 2);
}

/// Test partial provider results
#[tokio::test]
async fn test_mockTranslator_withSkippedKey_shouldOmitItFromResponse() {
    let translator = MockTranslator::new().with_skipped_key("title");
    let request = items(&[("title", "Hello"), ("body.text", "World")]);

    let translated = translator
        .translate("en-US", "fr-FR", &request)
        .await
        .expect("mock should succeed");
    assert_eq!(translated.len(), 1);
    assert_eq!(translated[0].key, "body.text");
}
