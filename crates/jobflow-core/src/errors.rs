//! Addressing errors.

/// Errors raised when a path string cannot be used to address a value tree.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The string is not a `$.key.key` path.
    #[error("not a valid path: {path:?} ({reason})")]
    InvalidPath {
        /// The rejected path string.
        path: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The path indexes into a list (`[0]`, `[*]`).
    #[error("array addressing is not supported: {path:?}")]
    ArrayAddressing {
        /// The rejected path string.
        path: String,
    },
}

impl PathError {
    pub(crate) fn invalid(path: &str, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason,
        }
    }

    /// The offending path string.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::InvalidPath { path, .. } | Self::ArrayAddressing { path } => path,
        }
    }
}
