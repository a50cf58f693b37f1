/*!
 * Locale identifier utilities.
 *
 * The CMS and the translation provider spell the same locale differently:
 * the CMS uses an all-lowercase `lang-region` code (e.g. `fr-fr`) while the
 * provider expects `lang-REGION` with an uppercase region (e.g. `fr-FR`).
 * Single-segment codes (e.g. `ar`) pass through with only case
 * normalization.
 */

use isolang::Language;

/// Convert a CMS locale code to the translation provider's locale id.
///
/// `fr-fr` becomes `fr-FR`; `ar` stays `ar`; empty input stays empty.
/// Only the first two subtags are kept, so `zh-hans-cn` becomes `zh-HANS`.
pub fn to_provider_locale_id(locale: &str) -> String {
    let raw = locale.trim();
    if raw.is_empty() {
        return String::new();
    }
    let mut subtags = raw.split('-');
    match (subtags.next(), subtags.next()) {
        (Some(lang), Some(region)) => format!("{}-{}", lang.to_lowercase(), region.to_uppercase()),
        _ => raw.to_string(),
    }
}

/// Convert a provider locale id to the CMS locale code (all lowercase).
/// As with [`to_provider_locale_id`], subtags past the second are dropped.
pub fn to_cms_locale_code(locale_id: &str) -> String {
    let raw = locale_id.trim();
    if raw.is_empty() {
        return String::new();
    }
    let mut subtags = raw.split('-');
    match (subtags.next(), subtags.next()) {
        (Some(lang), Some(region)) => format!("{}-{}", lang.to_lowercase(), region.to_lowercase()),
        _ => raw.to_lowercase(),
    }
}

/// Check whether the language subtag of a locale code is a known ISO 639-1
/// language. Used to warn about likely configuration typos; unknown subtags
/// are still accepted.
pub fn is_known_language_subtag(locale: &str) -> bool {
    let raw = locale.trim();
    let lang = match raw.split_once('-') {
        Some((lang, _)) => lang,
        None => raw,
    };
    Language::from_639_1(&lang.to_lowercase()).is_some()
}
