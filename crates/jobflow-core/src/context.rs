//! The mutable, persisted job context.
//!
//! A [`Context`] is one JSON object shared by every condition of a job. Each
//! condition writes under a top-level key named after itself, so the whole
//! state serializes as a single document while staying partitioned.
//!
//! The `updated` flag is sticky: it turns on the first time a `set` actually
//! changes a value and stays on until the owner consumes it with
//! [`Context::take_updated`] or [`Context::reset_updated`].

use serde_json::{Map, Value};

use crate::errors::PathError;
use crate::path::JsonPath;
use crate::tree::{self, ValueTree};

/// Job context tree plus its dirty flag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Context {
    data: ValueTree,
    updated: bool,
}

impl Context {
    /// Create an empty, clean context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a previously persisted tree. The flag starts clean.
    #[must_use]
    pub fn from_map(data: ValueTree) -> Self {
        Self {
            data,
            updated: false,
        }
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

    /// Write `value` at `path`.
    ///
    /// Returns whether the leaf changed. Writing a value equal to the
    /// current one leaves the leaf and the flag untouched; missing
    /// intermediates are still created.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<bool, PathError> {
        let path = JsonPath::parse(path)?;
        Ok(self.set_path(&path, value.into()))
    }

    /// Write `value` at an already compiled path.
    pub fn set_path(&mut self, path: &JsonPath, value: Value) -> bool {
        let changed = tree::set(&mut self.data, path, value);
        if changed && !self.updated {
            tracing::trace!(%path, "context marked updated");
            self.updated = true;
        }
        changed
    }

    /// Whether any `set` changed the tree since the flag was last cleared.
    #[must_use]
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    /// Read and clear the flag.
    pub fn take_updated(&mut self) -> bool {
        std::mem::take(&mut self.updated)
    }

    /// Clear the flag.
    pub fn reset_updated(&mut self) {
        self.updated = false;
    }

    /// Independent deep copy with a clean flag.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        Self::from_map(self.data.clone())
    }

    /// Borrow the underlying tree.
    #[must_use]
    pub fn data(&self) -> &ValueTree {
        &self.data
    }

    /// Consume the context, returning the tree.
    #[must_use]
    pub fn into_data(self) -> ValueTree {
        self.data
    }

    /// Render the tree as a JSON document.
    pub fn to_json_string(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(&self.data)
        } else {
            serde_json::to_string(&self.data)
        }
    }
}

impl From<Map<String, Value>> for Context {
    fn from(data: Map<String, Value>) -> Self {
        Self::from_map(data)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
