//! Operator semantics over resolved values.
//!
//! Everything here is pure: inputs are already-resolved [`Value`]s tagged
//! with their declared [`OperandType`], outputs are the value to write.
//! Reading operands and writing the context is the topology's job.

use std::cmp::Ordering;

use jobflow_core::Value;

use crate::errors::{EngineError, Result};
use crate::types::{OperandOption, OperandType, OperatorType};

// ─────────────────────────────────────────────────────────────────────────────
// Accumulators
// ─────────────────────────────────────────────────────────────────────────────

/// `sum`: add `value` onto `current`.
///
/// Numbers accumulate as 64-bit integers (wrapping on overflow). Strings
/// append `value` after `current`. A missing or mistyped side counts as the
/// identity (`0` or `""`).
pub fn sum(operand_type: OperandType, value: &Value, current: Option<&Value>) -> Result<Value> {
    match operand_type {
        OperandType::Number => {
            let total = integer_or_zero(current).wrapping_add(integer_or_zero(Some(value)));
            Ok(Value::from(total))
        }
        OperandType::String => {
            let mut text = current.and_then(Value::as_str).unwrap_or_default().to_string();
            text.push_str(value.as_str().unwrap_or_default());
            Ok(Value::String(text))
        }
        OperandType::Boolean => Err(EngineError::UnsupportedType {
            operator: OperatorType::Sum,
            operand_type,
        }),
    }
}

/// `count`: add `hits` onto the integer at `current`.
#[must_use]
pub fn count(current: Option<&Value>, hits: usize) -> Value {
    let hits = i64::try_from(hits).unwrap_or(i64::MAX);
    Value::from(integer_or_zero(current).wrapping_add(hits))
}

fn integer_or_zero(value: Option<&Value>) -> i64 {
    let Some(Value::Number(n)) = value else {
        return 0;
    };
    n.as_i64()
        .or_else(|| n.as_u64().map(|u| u as i64))
        .or_else(|| n.as_f64().map(|f| f as i64))
        .unwrap_or(0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Comparisons
// ─────────────────────────────────────────────────────────────────────────────

/// `equal`: both sides present and equal under their declared type.
///
/// Declared types must match. Numbers compare as `f64`; a side that does
/// not parse makes the result `false`.
pub fn equal(
    left_type: OperandType,
    left: &Value,
    right_type: OperandType,
    right: &Value,
) -> Result<bool> {
    match (left_type, right_type) {
        (OperandType::Number, OperandType::Number) => {
            Ok(matches!((as_number(left), as_number(right)), (Some(l), Some(r)) if l == r))
        }
        (OperandType::String, OperandType::String)
        | (OperandType::Boolean, OperandType::Boolean) => {
            Ok(!left.is_null() && !right.is_null() && left == right)
        }
        _ => Err(unsupported(OperatorType::Equal, left_type, right_type)),
    }
}

/// `not_equal`: negation of [`equal`], same type rules.
pub fn not_equal(
    left_type: OperandType,
    left: &Value,
    right_type: OperandType,
    right: &Value,
) -> Result<bool> {
    equal(left_type, left, right_type, right)
        .map(|eq| !eq)
        .map_err(|e| retag(e, OperatorType::NotEqual))
}

/// `greater_than`: numbers by value, strings lexicographically.
pub fn greater_than(
    left_type: OperandType,
    left: &Value,
    right_type: OperandType,
    right: &Value,
) -> Result<bool> {
    let ordering = compare(OperatorType::GreaterThan, left_type, left, right_type, right)?;
    Ok(ordering == Some(Ordering::Greater))
}

/// `greater_than_equal`: [`greater_than`] or [`equal`].
pub fn greater_than_equal(
    left_type: OperandType,
    left: &Value,
    right_type: OperandType,
    right: &Value,
) -> Result<bool> {
    let operator = OperatorType::GreaterThanEqual;
    let gt = greater_than(left_type, left, right_type, right).map_err(|e| retag(e, operator))?;
    Ok(gt || equal(left_type, left, right_type, right).map_err(|e| retag(e, operator))?)
}

/// `less_than`: mirror of [`greater_than`].
pub fn less_than(
    left_type: OperandType,
    left: &Value,
    right_type: OperandType,
    right: &Value,
) -> Result<bool> {
    let ordering = compare(OperatorType::LessThan, left_type, left, right_type, right)?;
    Ok(ordering == Some(Ordering::Less))
}

/// `less_than_equal`: [`less_than`] or [`equal`].
pub fn less_than_equal(
    left_type: OperandType,
    left: &Value,
    right_type: OperandType,
    right: &Value,
) -> Result<bool> {
    let operator = OperatorType::LessThanEqual;
    let lt = less_than(left_type, left, right_type, right).map_err(|e| retag(e, operator))?;
    Ok(lt || equal(left_type, left, right_type, right).map_err(|e| retag(e, operator))?)
}

/// Apply a comparison operator (`equal` through `less_than_equal`).
///
/// Any other operator is reported as an unsupported operation.
pub fn apply_comparison(
    operator: OperatorType,
    left_type: OperandType,
    left: &Value,
    right_type: OperandType,
    right: &Value,
) -> Result<bool> {
    match operator {
        OperatorType::Equal => equal(left_type, left, right_type, right),
        OperatorType::NotEqual => not_equal(left_type, left, right_type, right),
        OperatorType::GreaterThan => greater_than(left_type, left, right_type, right),
        OperatorType::GreaterThanEqual => greater_than_equal(left_type, left, right_type, right),
        OperatorType::LessThan => less_than(left_type, left, right_type, right),
        OperatorType::LessThanEqual => less_than_equal(left_type, left, right_type, right),
        OperatorType::Projection
        | OperatorType::Merge
        | OperatorType::Count
        | OperatorType::Sum
        | OperatorType::HasAllKey
        | OperatorType::HasAnyKey
        | OperatorType::Substring => Err(unsupported(operator, left_type, right_type)),
    }
}

/// Ordering of two values, `None` when either side is missing or does not
/// parse under its declared type.
fn compare(
    operator: OperatorType,
    left_type: OperandType,
    left: &Value,
    right_type: OperandType,
    right: &Value,
) -> Result<Option<Ordering>> {
    match (left_type, right_type) {
        (OperandType::Number, OperandType::Number) => match (as_number(left), as_number(right)) {
            (Some(l), Some(r)) => Ok(l.partial_cmp(&r)),
            _ => Ok(None),
        },
        (OperandType::String, OperandType::String) => match (left, right) {
            (Value::String(l), Value::String(r)) => Ok(Some(l.cmp(r))),
            _ => Ok(None),
        },
        _ => Err(unsupported(operator, left_type, right_type)),
    }
}

/// Numeric reading of a value declared `number`: JSON numbers directly,
/// strings by parsing.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn unsupported(operator: OperatorType, left: OperandType, right: OperandType) -> EngineError {
    EngineError::UnsupportedOperation {
        operator,
        left,
        right,
    }
}

/// Report a delegated comparison's type error under the caller's operator.
fn retag(error: EngineError, operator: OperatorType) -> EngineError {
    match error {
        EngineError::UnsupportedOperation { left, right, .. } => unsupported(operator, left, right),
        other => other,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Presence
// ─────────────────────────────────────────────────────────────────────────────

/// `has_all_key`: no value is `null`.
#[must_use]
pub fn has_all_key(values: &[Value]) -> bool {
    values.iter().all(|v| !v.is_null())
}

/// `has_any_key`: at least one value is not `null`.
#[must_use]
pub fn has_any_key(values: &[Value]) -> bool {
    values.iter().any(|v| !v.is_null())
}

// ─────────────────────────────────────────────────────────────────────────────
// Strings
// ─────────────────────────────────────────────────────────────────────────────

/// String form of a value: strings verbatim, everything else as JSON.
#[must_use]
pub fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `substring`: characters `[start, end)` of the value's string form.
///
/// `start` defaults to 0 and `end` to the length.
pub fn substring(value: &Value, start: Option<&str>, end: Option<&str>) -> Result<String> {
    let text = display_string(value);
    let len = text.chars().count();
    let start = parse_index(OperandOption::Start, start)?.unwrap_or(0);
    let end = parse_index(OperandOption::End, end)?.unwrap_or(len);
    if start > end || end > len {
        return Err(EngineError::SubstringRange { start, end, len });
    }
    Ok(text.chars().skip(start).take(end - start).collect())
}

/// Parse an optional index option as a non-negative integer.
pub fn parse_index(option: OperandOption, raw: Option<&str>) -> Result<Option<usize>> {
    raw.map(|value| {
        value.trim().parse::<usize>().map_err(|_| EngineError::InvalidOption {
            option,
            value: value.to_string(),
            reason: "must be a non-negative integer",
        })
    })
    .transpose()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
