//! Dotted `$.a.b.c` paths.
//!
//! A [`JsonPath`] is the compiled form of a path string: the leading `$` and
//! first `.` are stripped and the remainder is split into key segments.
//! Paths only ever select mapping keys. Any bracket selector (`[0]`, `[*]`,
//! `[-1]`, `[1:2]`) is rejected with [`PathError::ArrayAddressing`] before
//! any other check, so a path is refused the same way whether or not it would
//! otherwise resolve.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::PathError;

static ARRAY_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());

/// Root marker every path starts with.
pub const ROOT: char = '$';

/// A validated, key-only path into a value tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JsonPath {
    segments: Vec<String>,
}

impl JsonPath {
    /// Compile a path string.
    ///
    /// Accepted form: `$.seg1.seg2...segN` with at least one non-empty
    /// segment.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if ARRAY_INDEX.is_match(raw) {
            return Err(PathError::ArrayAddressing {
                path: raw.to_string(),
            });
        }
        let Some(rest) = raw.strip_prefix(ROOT) else {
            return Err(PathError::invalid(raw, "must start with `$`"));
        };
        if rest.is_empty() {
            return Err(PathError::invalid(raw, "must address at least one key"));
        }
        if rest.contains(['[', ']']) {
            return Err(PathError::invalid(raw, "bracket notation is not supported"));
        }
        let Some(body) = rest.strip_prefix('.') else {
            return Err(PathError::invalid(raw, "expected `.` after `$`"));
        };

        let mut segments = Vec::new();
        for segment in body.split('.') {
            if segment.is_empty() {
                return Err(PathError::invalid(raw, "empty segment"));
            }
            if segment == "*" {
                return Err(PathError::invalid(raw, "wildcards are not supported"));
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Key segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// This path relocated under a top-level `namespace` key:
    /// `$.a.b` becomes `$.{namespace}.a.b`.
    #[must_use]
    pub fn namespaced(&self, namespace: &str) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.push(namespace.to_string());
        segments.extend(self.segments.iter().cloned());
        Self { segments }
    }

    /// This path extended by one literal key.
    ///
    /// The key is taken verbatim: dots inside it do not create further
    /// levels, and the empty key is allowed.
    #[must_use]
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(key.into());
        Self { segments }
    }

    /// This path extended by a dotted `suffix`: `$.a` joined with `b.c` is
    /// `$.a.b.c`.
    ///
    /// The joined path goes through [`JsonPath::parse`], so brackets and
    /// empty segments inside the suffix are rejected. An empty suffix
    /// appends the empty key.
    pub fn join(&self, suffix: &str) -> Result<Self, PathError> {
        if suffix.is_empty() {
            return Ok(self.child(""));
        }
        Self::parse(&format!("{self}.{suffix}"))
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ROOT}")?;
        for segment in &self.segments {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for JsonPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
