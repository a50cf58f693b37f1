/*!
 * Turning a diff into provider requests and back into an entry patch.
 *
 * The request side selects the translatable subset of a diff (non-empty
 * strings) under a hard item cap. The patch side rebuilds a minimal nested
 * document from the flat dotted paths, substituting translations where the
 * provider returned one.
 */

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::entry_diff::ChangedField;
use crate::providers::TranslationItem;

/// Hard cap on items per translation request; bounds one call's payload.
pub const MAX_TRANSLATION_ITEMS: usize = 1000;

/// Select the translatable changed fields as provider request items.
///
/// Only string values with non-empty trimmed text qualify; the text is sent
/// trimmed. Input order is preserved and paths are not deduplicated. Items
/// beyond [`MAX_TRANSLATION_ITEMS`] are dropped silently.
pub fn collect_translatable(changed_fields: &[ChangedField]) -> Vec<TranslationItem> {
    let mut items = Vec::new();
    for field in changed_fields {
        let Some(Value::String(text)) = &field.after else {
            continue;
        };
        let source_text = text.trim();
        if source_text.is_empty() {
            continue;
        }
        items.push(TranslationItem {
            key: field.path.clone(),
            source_text: source_text.to_string(),
        });
        if items.len() >= MAX_TRANSLATION_ITEMS {
            break;
        }
    }
    items
}

/// Build the nested entry patch for one target locale.
///
/// For each changed field the effective value is the translation when the
/// original value is a string and the provider returned one for that path,
/// otherwise the original draft value. Removed fields (no draft value) are
/// skipped. Values are written at their dotted path; with duplicate or
/// overlapping paths the last write wins.
pub fn build_entry_patch(
    changed_fields: &[ChangedField],
    translations: &HashMap<String, String>,
) -> Map<String, Value> {
    let mut patch = Map::new();
    for field in changed_fields {
        if field.path.is_empty() {
            continue;
        }
        let value = match &field.after {
            None => continue,
            Some(Value::String(original)) => match translations.get(&field.path) {
                Some(translated) => Value::String(translated.clone()),
                None => Value::String(original.clone()),
            },
            Some(other) => other.clone(),
        };
        set_deep(&mut patch, &field.path, value);
    }
    patch
}

/// Write `value` at the dotted `path` inside `root`, creating intermediate
/// object nodes as needed. An intermediate node holding a non-object value
/// is replaced with a fresh object. A path with any empty segment is
/// skipped entirely.
pub fn set_deep(root: &mut Map<String, Value>, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return;
    }
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut cursor = root;
    for segment in parents {
        let slot = cursor
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        match slot {
            Value::Object(map) => cursor = map,
            _ => return,
        }
    }
    cursor.insert(last.to_string(), value);
}
