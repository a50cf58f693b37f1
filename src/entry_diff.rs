/*!
 * Structural diffing of CMS entry snapshots.
 *
 * Two snapshots of the same entry are compared: the published version as
 * baseline and the draft as candidate. System and bookkeeping fields are
 * stripped first, then the trees are walked recursively and every changed
 * leaf is reported with its dot-joined path and draft value. Arrays are
 * treated as opaque leaves and compared by canonical serialization, never
 * element-wise.
 */

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

/// Top-level and nested keys never considered part of the entry content.
pub static IGNORED_KEYS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "tags",
        "locale",
        "uid",
        "created_by",
        "created_at",
        "create_at",
        "updated_by",
        "updated_at",
        "ACL",
        "_version",
        "_workflow",
        "_in_progress",
        "publish_details",
        "_rules",
    ])
});

/// The one underscore-prefixed key that survives redaction.
pub const PRESERVED_METADATA_KEY: &str = "_metadata";

/// One detected difference between the published and draft snapshots.
///
/// `after` is the draft-side value; `None` means the field was removed in
/// the draft (absent is distinct from JSON null).
#[derive(Debug, Clone, PartialEq)]
pub struct ChangedField {
    /// Dot-joined path from the entry root, e.g. `body.text`
    pub path: String,
    /// The new (draft) value, or `None` when the field was removed
    pub after: Option<Value>,
}

/// Strip system-managed top-level fields from an entry snapshot.
///
/// Non-object input passes through unchanged. For objects, every key in
/// [`IGNORED_KEYS`] is dropped, as is every key starting with `_` except
/// [`PRESERVED_METADATA_KEY`]. Key order of the remaining fields follows
/// the source map. Pure function; idempotent.
pub fn redact_system_fields(entry: &Value) -> Value {
    let Some(map) = entry.as_object() else {
        return entry.clone();
    };
    let mut out = Map::new();
    for (key, value) in map {
        if IGNORED_KEYS.contains(key.as_str()) {
            continue;
        }
        if key.starts_with('_') && key != PRESERVED_METADATA_KEY {
            continue;
        }
        out.insert(key.clone(), value.clone());
    }
    Value::Object(out)
}

/// Recursively diff two snapshots, reporting changed leaves.
///
/// `None` on either side means the value is absent at that path. The walk
/// is depth-first over the union of keys at each object level, so the
/// output order is deterministic for a fixed pair of inputs. Keys in
/// [`IGNORED_KEYS`] are skipped at every level, not just the top.
pub fn diff_leaf_values(baseline: Option<&Value>, candidate: Option<&Value>) -> Vec<ChangedField> {
    let mut changes = Vec::new();
    walk(baseline, candidate, &mut Vec::new(), &mut changes);
    changes
}

/// A value is a leaf if it is null, a boolean, a number, a string, or an
/// array. Objects descend; arrays are compared whole.
fn is_leaf(value: &Value) -> bool {
    !value.is_object()
}

/// The suppression rule's notion of "empty": absent, null, a
/// whitespace-only string, or an empty array.
fn is_empty_candidate_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        _ => false,
    }
}

/// Canonical serialization used for leaf equality. serde_json keeps object
/// keys sorted, so equal trees serialize byte-identically regardless of
/// insertion order.
fn canonical(value: &Value) -> String {
    value.to_string()
}

fn walk(
    baseline: Option<&Value>,
    candidate: Option<&Value>,
    path: &mut Vec<String>,
    changes: &mut Vec<ChangedField>,
) {
    let baseline_leaf = baseline.is_some_and(is_leaf);
    let candidate_leaf = candidate.is_some_and(is_leaf);

    if baseline_leaf || candidate_leaf {
        // Fields that only exist in the draft and are empty there are
        // scaffolding, not edits.
        if baseline.is_none() && is_empty_candidate_value(candidate) {
            return;
        }
        if baseline.map(canonical) != candidate.map(canonical) {
            changes.push(ChangedField {
                path: path.join("."),
                after: candidate.cloned(),
            });
        }
        return;
    }

    let baseline_obj = baseline.and_then(Value::as_object);
    let candidate_obj = candidate.and_then(Value::as_object);

    if baseline_obj.is_none() && candidate_obj.is_none() {
        // Neither side is a leaf or an object, i.e. both absent.
        if baseline.is_none() && is_empty_candidate_value(candidate) {
            return;
        }
        if baseline != candidate {
            changes.push(ChangedField {
                path: path.join("."),
                after: candidate.cloned(),
            });
        }
        return;
    }

    // Union of keys, baseline keys first, then candidate-only keys.
    let mut keys: Vec<&String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for map in [baseline_obj, candidate_obj].into_iter().flatten() {
        for key in map.keys() {
            if seen.insert(key.as_str()) {
                keys.push(key);
            }
        }
    }

    for key in keys {
        if IGNORED_KEYS.contains(key.as_str()) {
            continue;
        }
        path.push(key.clone());
        walk(
            baseline_obj.and_then(|m| m.get(key)),
            candidate_obj.and_then(|m| m.get(key)),
            path,
            changes,
        );
        path.pop();
    }
}

/// Wrap changed fields as single-entry `{path: after}` maps, the transport
/// form echoed in the webhook response. A removed field renders as an empty
/// map, mirroring how an undefined value disappears from JSON output.
pub fn changed_field_maps(changes: &[ChangedField]) -> Vec<Map<String, Value>> {
    changes
        .iter()
        .map(|change| {
            let mut entry = Map::new();
            if let Some(after) = &change.after {
                entry.insert(change.path.clone(), after.clone());
            }
            entry
        })
        .collect()
}
