//! Conditions, jobs, and structural validation.
//!
//! A [`Job`] is static configuration: built once, never mutated by
//! evaluation. [`Job::validate`] front-loads every check that does not need
//! event data, including declared operand types an operator cannot combine.
//! A job that validates can still fail at runtime on substring bounds or
//! on a postfix key taken from the event.

use std::collections::BTreeMap;

use jobflow_core::{JsonPath, Value};
use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, OperationError, Result};
use crate::operators;
use crate::types::{ConditionType, Operand, OperandOption, OperandSource, Operation, OperatorType};

/// Ordered operations run under one condition's namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Operations in evaluation order.
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl Condition {
    /// Condition from a list of operations.
    #[must_use]
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }
}

/// Condition definitions keyed by condition type. Absent entries have no
/// operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Conditions by type.
    #[serde(default)]
    pub conditions: BTreeMap<ConditionType, Condition>,
}

impl Job {
    /// Empty job.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a condition.
    #[must_use]
    pub fn with_condition(mut self, condition_type: ConditionType, condition: Condition) -> Self {
        let _ = self.conditions.insert(condition_type, condition);
        self
    }

    /// Look up a condition.
    #[must_use]
    pub fn condition(&self, condition_type: ConditionType) -> Option<&Condition> {
        self.conditions.get(&condition_type)
    }

    /// Total number of operations across all conditions.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.conditions.values().map(|c| c.operations.len()).sum()
    }

    /// Check every operation, in evaluation order, and report the first
    /// problem found.
    pub fn validate(&self) -> Result<(), OperationError> {
        for condition_type in ConditionType::EVALUATION_ORDER {
            let Some(condition) = self.condition(condition_type) else {
                continue;
            };
            for (index, operation) in condition.operations.iter().enumerate() {
                validate_operation(operation).map_err(|source| OperationError {
                    condition: condition_type,
                    index,
                    operator: operation.operator,
                    source,
                })?;
            }
        }
        Ok(())
    }
}

/// Structural checks for one operation.
pub fn validate_operation(operation: &Operation) -> Result<()> {
    let _ = JsonPath::parse(&operation.context_key)?;

    let operator = operation.operator;
    let len = operation.operands.len();
    if operator.is_binary() {
        if len < 2 {
            return Err(EngineError::OperandIndexOutOfRange {
                operator,
                index: len,
                len,
            });
        }
        if len > 2 {
            return Err(EngineError::UnexpectedOperands {
                operator,
                expected: 2,
                actual: len,
            });
        }
    } else if operator.is_unary() && len == 0 {
        return Err(EngineError::OperandIndexOutOfRange {
            operator,
            index: 0,
            len,
        });
    }

    check_declared_types(operation)?;
    for operand in &operation.operands {
        validate_operand(operator, operand)?;
    }
    Ok(())
}

/// Run the type check of `sum` and the comparison operators against null
/// values, so only the declared operand types decide the outcome.
fn check_declared_types(operation: &Operation) -> Result<()> {
    let operator = operation.operator;
    match operation.operands.as_slice() {
        [operand, ..] if operator == OperatorType::Sum => {
            let _ = operators::sum(operand.operand_type, &Value::Null, None)?;
        }
        [left, right] if operator.is_binary() => {
            let _ = operators::apply_comparison(
                operator,
                left.operand_type,
                &Value::Null,
                right.operand_type,
                &Value::Null,
            )?;
        }
        _ => {}
    }
    Ok(())
}

fn validate_operand(operator: OperatorType, operand: &Operand) -> Result<()> {
    if operand.source != OperandSource::Constant {
        let _ = JsonPath::parse(&operand.value)?;
    }
    if let Some(postfix) = operand.option(OperandOption::ContextKeyPostfix) {
        let _ = JsonPath::parse(postfix)?;
    }
    if let Some(namespace) = operand.option(OperandOption::ContextNamespace)
        && (namespace.is_empty() || namespace.contains(['.', '[', ']']))
    {
        return Err(EngineError::InvalidOption {
            option: OperandOption::ContextNamespace,
            value: namespace.to_string(),
            reason: "must be a single non-empty key",
        });
    }
    if operator == OperatorType::Substring {
        for option in [OperandOption::Start, OperandOption::End] {
            let _ = operators::parse_index(option, operand.option(option))?;
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
