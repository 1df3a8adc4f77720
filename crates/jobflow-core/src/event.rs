//! Read-only event payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::PathError;
use crate::path::JsonPath;
use crate::tree::{self, ValueTree};

/// One delivered event. Read through the same paths as the context, never
/// written.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event {
    data: ValueTree,
}

impl Event {
    /// Wrap an event payload.
    #[must_use]
    pub fn new(data: ValueTree) -> Self {
        Self { data }
    }

    /// Read the value at `path`.
    pub fn get(&self, path: &str) -> Result<Option<&Value>, PathError> {
        let path = JsonPath::parse(path)?;
        Ok(self.get_path(&path))
    }

    /// Read the value at an already compiled path.
    pub fn get_path(&self, path: &JsonPath) -> Option<&Value> {
        tree::get(&self.data, path)
    }

    /// Borrow the payload.
    #[must_use]
    pub fn data(&self) -> &ValueTree {
        &self.data
    }
}

impl From<Map<String, Value>> for Event {
    fn from(data: Map<String, Value>) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn event() -> Event {
        serde_json::from_value(json!({
            "info": {"name": "name1", "level": 12},
            "quantity": 2,
            "type": "head",
            "datetime": "2021-01-01T01:02:03"
        }))
        .unwrap()
    }

    #[test]
    fn reads_nested_fields() {
        let e = event();
        assert_eq!(e.get("$.info.level").unwrap(), Some(&json!(12)));
        assert_eq!(e.get("$.type").unwrap(), Some(&json!("head")));
        assert_eq!(e.get("$.info.name.first").unwrap(), None);
    }

    #[test]
    fn rejects_array_paths() {
        assert_matches!(event().get("$.info[0]"), Err(PathError::ArrayAddressing { .. }));
    }

    #[test]
    fn non_object_payload_does_not_deserialize() {
        assert!(serde_json::from_value::<Event>(json!([1, 2])).is_err());
    }

    #[test]
    fn serializes_as_plain_object() {
        let e = Event::new(json!({"a": 1}).as_object().cloned().unwrap());
        assert_eq!(serde_json::to_value(&e).unwrap(), json!({"a": 1}));
    }
}
