//! Path reads and writes over `serde_json` object trees.

use serde_json::{Map, Value};

use crate::path::JsonPath;

/// A nested string-keyed mapping.
pub type ValueTree = Map<String, Value>;

/// Resolve `path` against `tree`.
///
/// Returns `None` on a missing key or as soon as a non-mapping value is met
/// before the path is exhausted.
pub fn get<'a>(tree: &'a ValueTree, path: &JsonPath) -> Option<&'a Value> {
    let (first, rest) = path.segments().split_first()?;
    let mut current = tree.get(first)?;
    for segment in rest {
        match current {
            Value::Object(map) => current = map.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

/// Write `value` at `path`, creating intermediate mappings as needed.
///
/// Intermediate non-mapping values are replaced by empty mappings before the
/// leaf is compared. When the current leaf (a missing key counts as `null`)
/// already equals `value` it is left alone and `false` is returned, even if
/// intermediates were just created.
pub fn set(tree: &mut ValueTree, path: &JsonPath, value: Value) -> bool {
    let Some((last, parents)) = path.segments().split_last() else {
        return false;
    };

    let mut current = tree;
    for segment in parents {
        let slot = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(next) = slot else {
            return false;
        };
        current = next;
    }
    if current.get(last).unwrap_or(&Value::Null) == &value {
        return false;
    }
    let _ = current.insert(last.clone(), value);
    true
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
