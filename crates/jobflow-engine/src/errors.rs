//! Engine error types.
//!
//! [`EngineError`] covers configuration-shape problems that abort a single
//! operation. Value-shape problems (an unparseable constant, a missing event
//! field) are not errors; they resolve to `null`.
//!
//! [`OperationError`] pins an [`EngineError`] to the operation it came from.

use jobflow_core::PathError;

use crate::types::{ConditionType, OperandOption, OperandType, OperatorType};

/// Failure while evaluating (or validating) one operation.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// A path in the operation could not be compiled.
    #[error(transparent)]
    Path(#[from] PathError),

    /// A binary operator was given operand types it cannot combine.
    #[error("operator '{operator}' does not support operand types '{left}' and '{right}'")]
    UnsupportedOperation {
        /// Offending operator.
        operator: OperatorType,
        /// Declared type of the first operand.
        left: OperandType,
        /// Declared type of the second operand.
        right: OperandType,
    },

    /// A unary operator was given an operand type it cannot handle.
    #[error("operator '{operator}' does not support operand type '{operand_type}'")]
    UnsupportedType {
        /// Offending operator.
        operator: OperatorType,
        /// Declared operand type.
        operand_type: OperandType,
    },

    /// The operator needs an operand at `index` that was not supplied.
    #[error("operator '{operator}' requires operand {index} but only {len} supplied")]
    OperandIndexOutOfRange {
        /// Offending operator.
        operator: OperatorType,
        /// Zero-based index that was requested.
        index: usize,
        /// Number of operands supplied.
        len: usize,
    },

    /// The operator takes a fixed number of operands and got more.
    #[error("operator '{operator}' takes {expected} operands, got {actual}")]
    UnexpectedOperands {
        /// Offending operator.
        operator: OperatorType,
        /// Operands the operator takes.
        expected: usize,
        /// Operands supplied.
        actual: usize,
    },

    /// An operand option holds an unusable value.
    #[error("invalid value {value:?} for option '{option}': {reason}")]
    InvalidOption {
        /// Option key.
        option: OperandOption,
        /// Raw option value.
        value: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// `substring` indices fall outside the string.
    #[error("substring range [{start}, {end}) is out of bounds for length {len}")]
    SubstringRange {
        /// Requested start (inclusive).
        start: usize,
        /// Requested end (exclusive).
        end: usize,
        /// Length of the string in characters.
        len: usize,
    },
}

/// Engine result alias.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// An [`EngineError`] located within a job.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{condition} operation #{index} ({operator}): {source}")]
pub struct OperationError {
    /// Condition the operation belongs to.
    pub condition: ConditionType,
    /// Zero-based position within the condition.
    pub index: usize,
    /// The operation's operator.
    pub operator: OperatorType,
    /// What went wrong.
    pub source: EngineError,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
