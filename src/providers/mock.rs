/*!
 * Mock translation provider for testing.
 *
 * Translates deterministically by prefixing the target locale, records
 * every call, and can be told to fail for specific target locales so tests
 * can exercise per-locale failure isolation.
 */

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::ProviderError;
use crate::providers::{MachineTranslator, TranslatedItem, TranslationItem};

/// One recorded `translate` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    /// Source locale id of the call
    pub source_locale_id: String,
    /// Target locale id of the call
    pub target_locale_id: String,
    /// Number of items in the request
    pub item_count: usize,
}

/// Deterministic in-memory translator
#[derive(Debug, Default)]
pub struct MockTranslator {
    /// Target locales whose calls fail
    fail_for: HashSet<String>,
    /// Keys to omit from responses, simulating partial provider results
    skip_keys: HashSet<String>,
    /// Recorded calls, in order
    calls: Mutex<Vec<MockCall>>,
}

impl MockTranslator {
    /// Create a mock that translates everything it is given
    pub fn new() -> Self {
        Self::default()
    }

    /// Make calls for `target_locale_id` fail with a request error
    pub fn with_failure_for(mut self, target_locale_id: impl Into<String>) -> Self {
        self.fail_for.insert(target_locale_id.into());
        self
    }

    /// Leave `key` out of every response
    pub fn with_skipped_key(mut self, key: impl Into<String>) -> Self {
        self.skip_keys.insert(key.into());
        self
    }

    /// All calls made so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Mock translation: prefix the source text with the target locale
    pub fn translate_text(target_locale_id: &str, source_text: &str) -> String {
        format!("[{}] {}", target_locale_id, source_text)
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        source_locale_id: &str,
        target_locale_id: &str,
        items: &[TranslationItem],
    ) -> Result<Vec<TranslatedItem>, ProviderError> {
        self.calls.lock().push(MockCall {
            source_locale_id: source_locale_id.to_string(),
            target_locale_id: target_locale_id.to_string(),
            item_count: items.len(),
        });

        if self.fail_for.contains(target_locale_id) {
            return Err(ProviderError::RequestFailed(format!(
                "mock failure for locale {}",
                target_locale_id
            )));
        }

        Ok(items
            .iter()
            .filter(|item| !self.skip_keys.contains(&item.key))
            .map(|item| TranslatedItem {
                key: item.key.clone(),
                translation_text: Self::translate_text(target_locale_id, &item.source_text),
            })
            .collect())
    }
}
