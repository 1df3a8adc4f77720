//! Job model vocabulary.
//!
//! Every enum here is closed: an unknown value in a job document fails
//! deserialization instead of being carried around as a string. Wire names
//! are `snake_case`, except the namespace shortcuts which read
//! `context::<condition>`.

use std::collections::BTreeMap;

use jobflow_core::Value;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Enums
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle signal a condition feeds. Doubles as the context namespace the
/// condition writes under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    /// Start signal.
    Run,
    /// Suspend signal.
    Pause,
    /// Completion signal.
    Succeed,
    /// Failure signal.
    Fail,
    /// Restart signal.
    Reset,
}

impl ConditionType {
    /// Order in which conditions are evaluated for every event.
    pub const EVALUATION_ORDER: [Self; 5] =
        [Self::Pause, Self::Run, Self::Succeed, Self::Fail, Self::Reset];

    /// Wire name, also the context namespace key.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Pause => "pause",
            Self::Succeed => "succeed",
            Self::Fail => "fail",
            Self::Reset => "reset",
        }
    }
}

impl std::fmt::Display for ConditionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an operand's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandSource {
    /// A path into the current event.
    #[serde(rename = "event")]
    Event,
    /// A literal parsed by the operand's declared type.
    #[serde(rename = "constant")]
    Constant,
    /// A path into the context, under the active namespace.
    #[serde(rename = "context")]
    Context,
    /// A path into the `run` namespace.
    #[serde(rename = "context::run")]
    ContextRun,
    /// A path into the `pause` namespace.
    #[serde(rename = "context::pause")]
    ContextPause,
    /// A path into the `succeed` namespace.
    #[serde(rename = "context::succeed")]
    ContextSucceed,
    /// A path into the `fail` namespace.
    #[serde(rename = "context::fail")]
    ContextFail,
    /// A path into the `reset` namespace.
    #[serde(rename = "context::reset")]
    ContextReset,
}

impl OperandSource {
    /// Whether the operand reads the context.
    #[must_use]
    pub fn is_context(self) -> bool {
        !matches!(self, Self::Event | Self::Constant)
    }

    /// Namespace fixed by a `context::<condition>` shortcut.
    #[must_use]
    pub fn implied_namespace(self) -> Option<ConditionType> {
        match self {
            Self::ContextRun => Some(ConditionType::Run),
            Self::ContextPause => Some(ConditionType::Pause),
            Self::ContextSucceed => Some(ConditionType::Succeed),
            Self::ContextFail => Some(ConditionType::Fail),
            Self::ContextReset => Some(ConditionType::Reset),
            Self::Event | Self::Constant | Self::Context => None,
        }
    }

    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Constant => "constant",
            Self::Context => "context",
            Self::ContextRun => "context::run",
            Self::ContextPause => "context::pause",
            Self::ContextSucceed => "context::succeed",
            Self::ContextFail => "context::fail",
            Self::ContextReset => "context::reset",
        }
    }
}

impl std::fmt::Display for OperandSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of an operand. Operators dispatch on this, not on the
/// runtime shape of the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperandType {
    /// Numeric.
    Number,
    /// Text.
    String,
    /// `true` / `false`.
    Boolean,
}

impl OperandType {
    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
        }
    }

    /// Parse a constant literal. Unparseable input is `null`, not an error.
    #[must_use]
    pub fn parse_constant(self, raw: &str) -> Value {
        match self {
            Self::Number => raw
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map_or(Value::Null, Value::Number),
            Self::String => Value::String(raw.to_string()),
            Self::Boolean => match raw {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::Null,
            },
        }
    }
}

impl std::fmt::Display for OperandType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys accepted in an operand's `options` map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperandOption {
    /// `substring` start index (inclusive).
    Start,
    /// `substring` end index (exclusive).
    End,
    /// Namespace override for context reads.
    ContextNamespace,
    /// Event path whose value is appended to the target key.
    ContextKeyPostfix,
}

impl OperandOption {
    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::ContextNamespace => "context_namespace",
            Self::ContextKeyPostfix => "context_key_postfix",
        }
    }
}

impl std::fmt::Display for OperandOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator applied by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorType {
    /// Copy each operand value to the target.
    Projection,
    /// Same as projection; conventionally used with a key postfix.
    Merge,
    /// Count non-null operands (or deliveries) into the target.
    Count,
    /// Accumulate the first operand into the target.
    Sum,
    /// Equality of two operands.
    Equal,
    /// Negated equality.
    NotEqual,
    /// Strict ordering, left above right.
    GreaterThan,
    /// Ordering or equality, left above right.
    GreaterThanEqual,
    /// Strict ordering, left below right.
    LessThan,
    /// Ordering or equality, left below right.
    LessThanEqual,
    /// Every operand is present.
    HasAllKey,
    /// At least one operand is present.
    HasAnyKey,
    /// Character slice of the first operand.
    Substring,
}

impl OperatorType {
    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Projection => "projection",
            Self::Merge => "merge",
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Equal => "equal",
            Self::NotEqual => "not_equal",
            Self::GreaterThan => "greater_than",
            Self::GreaterThanEqual => "greater_than_equal",
            Self::LessThan => "less_than",
            Self::LessThanEqual => "less_than_equal",
            Self::HasAllKey => "has_all_key",
            Self::HasAnyKey => "has_any_key",
            Self::Substring => "substring",
        }
    }

    /// Whether the operator compares exactly two operands.
    #[must_use]
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::GreaterThan
                | Self::GreaterThanEqual
                | Self::LessThan
                | Self::LessThanEqual
        )
    }

    /// Whether the operator reads only its first operand.
    #[must_use]
    pub fn is_unary(self) -> bool {
        matches!(self, Self::Sum | Self::Substring)
    }
}

impl std::fmt::Display for OperatorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Operand / Operation
// ─────────────────────────────────────────────────────────────────────────────

/// A value descriptor: where to read, how to interpret it, and options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operand {
    /// Value source.
    pub source: OperandSource,
    /// Declared type.
    #[serde(rename = "type")]
    pub operand_type: OperandType,
    /// A `$.a.b` path for event and context sources, a literal for constants.
    pub value: String,
    /// Extra knobs keyed by [`OperandOption`].
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<OperandOption, String>,
}

impl Operand {
    /// Operand with no options.
    #[must_use]
    pub fn new(source: OperandSource, operand_type: OperandType, value: impl Into<String>) -> Self {
        Self {
            source,
            operand_type,
            value: value.into(),
            options: BTreeMap::new(),
        }
    }

    /// Event-path operand.
    #[must_use]
    pub fn event(operand_type: OperandType, path: impl Into<String>) -> Self {
        Self::new(OperandSource::Event, operand_type, path)
    }

    /// Constant literal operand.
    #[must_use]
    pub fn constant(operand_type: OperandType, literal: impl Into<String>) -> Self {
        Self::new(OperandSource::Constant, operand_type, literal)
    }

    /// Context-path operand under the active namespace.
    #[must_use]
    pub fn context(operand_type: OperandType, path: impl Into<String>) -> Self {
        Self::new(OperandSource::Context, operand_type, path)
    }

    /// Set an option.
    #[must_use]
    pub fn with_option(mut self, option: OperandOption, value: impl Into<String>) -> Self {
        let _ = self.options.insert(option, value.into());
        self
    }

    /// Read an option.
    #[must_use]
    pub fn option(&self, option: OperandOption) -> Option<&str> {
        self.options.get(&option).map(String::as_str)
    }
}

/// One unit of work: apply `operator` to `operands`, write under
/// `context_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Target path, relative to the condition's namespace.
    pub context_key: String,
    /// Operator to apply.
    pub operator: OperatorType,
    /// Ordered operands.
    #[serde(default)]
    pub operands: Vec<Operand>,
}

impl Operation {
    /// Build an operation.
    #[must_use]
    pub fn new(
        context_key: impl Into<String>,
        operator: OperatorType,
        operands: Vec<Operand>,
    ) -> Self {
        Self {
            context_key: context_key.into(),
            operator,
            operands,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
