//! Condition evaluation settings.

use serde::{Deserialize, Serialize};

/// What the evaluator does after an operation fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log the failure, record it, and keep running the remaining operations.
    #[default]
    Continue,
    /// Stop the event pass at the first failure and return the error.
    Abort,
}

impl FailurePolicy {
    /// Wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::Abort => "abort",
        }
    }

    /// Parse the wire representation (case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "continue" => Some(Self::Continue),
            "abort" => Some(Self::Abort),
            _ => None,
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluation behaviour.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluationSettings {
    /// Reaction to failing operations.
    pub failure_policy: FailurePolicy,
    /// Validate job definitions (paths, operand counts) before the first event.
    pub validate_jobs: bool,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Continue,
            validate_jobs: true,
        }
    }
}
