/*!
 * Provider implementations for machine translation.
 *
 * This module contains the client implementations behind the
 * [`MachineTranslator`] seam:
 * - Smartling: the production MT router API
 * - Mock: a deterministic in-memory translator for tests
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::ProviderError;

/// One string queued for translation, keyed by its entry path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationItem {
    /// Dot-joined entry path, echoed back by the provider
    pub key: String,
    /// Trimmed source text
    pub source_text: String,
}

/// One translated string returned by the provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedItem {
    /// The key from the matching request item
    pub key: String,
    /// Translated text
    pub translation_text: String,
}

/// Common trait for machine translation providers
///
/// Implementations translate a batch of keyed strings from one locale to
/// another in a single call; translation is best-effort with no retry.
#[async_trait]
pub trait MachineTranslator: Send + Sync + Debug {
    /// Translate `items` from `source_locale_id` to `target_locale_id`.
    ///
    /// # Returns
    /// * The provider's translated items; keys not present in the result
    ///   simply keep their source text downstream.
    async fn translate(
        &self,
        source_locale_id: &str,
        target_locale_id: &str,
        items: &[TranslationItem],
    ) -> Result<Vec<TranslatedItem>, ProviderError>;
}

pub mod mock;
pub mod smartling;
