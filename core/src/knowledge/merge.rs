//! Keyed JSON merge for dataset updates

use serde_json::{Map, Value};

/// Fields that identify an entry inside a list of objects, by priority
const IDENTITY_KEYS: [&str; 8] = [
    "id", "industry", "size", "role", "area", "metric", "name", "title",
];

/// Merge `patch` into `base`.
///
/// Objects merge key by key. Lists of objects merge entry by entry, matched
/// on the first identity field both entries carry; unmatched entries are
/// appended. Lists of scalars gain the values they do not already hold.
/// Anything else is replaced.
pub fn merge_patch(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => merge_objects(base_map, patch_map),
        (Value::Array(base_items), Value::Array(patch_items)) => {
            merge_arrays(base_items, patch_items)
        }
        (base, patch) => *base = patch.clone(),
    }
}

fn merge_objects(base: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        match base.get_mut(key) {
            Some(existing) => merge_patch(existing, value),
            None => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

fn merge_arrays(base: &mut Vec<Value>, patch: &[Value]) {
    for item in patch {
        match item {
            Value::Object(patch_entry) => {
                let position = identity(patch_entry).and_then(|(key, id)| {
                    base.iter()
                        .position(|existing| existing.get(key) == Some(id))
                });
                match position {
                    Some(index) => merge_patch(&mut base[index], item),
                    None => base.push(item.clone()),
                }
            }
            scalar => {
                if !base.contains(scalar) {
                    base.push(scalar.clone());
                }
            }
        }
    }
}

fn identity(entry: &Map<String, Value>) -> Option<(&'static str, &Value)> {
    IDENTITY_KEYS
        .iter()
        .find_map(|key| entry.get(*key).filter(|v| !v.is_null()).map(|v| (*key, v)))
}
