//! Operand resolution.
//!
//! Turns an [`Operand`] descriptor into a runtime [`Value`] by reading the
//! event, parsing a constant, or reading the context under a namespace.
//! Missing data resolves to `null`; only malformed paths are errors.

use jobflow_core::{Context, Event, JsonPath, Value};

use crate::errors::Result;
use crate::operators::display_string;
use crate::types::{ConditionType, Operand, OperandOption, OperandSource};

/// Namespace a context operand reads from.
///
/// Precedence: the `context_namespace` option, then a `context::<type>`
/// shortcut, then `active`.
#[must_use]
pub fn namespace_for<'a>(operand: &'a Operand, active: &'a str) -> &'a str {
    operand
        .option(OperandOption::ContextNamespace)
        .or_else(|| operand.source.implied_namespace().map(ConditionType::as_str))
        .unwrap_or(active)
}

/// Resolve an operand while evaluating under the `active` namespace.
pub fn resolve(operand: &Operand, event: &Event, context: &Context, active: &str) -> Result<Value> {
    match operand.source {
        OperandSource::Constant => Ok(operand.operand_type.parse_constant(&operand.value)),
        OperandSource::Event => {
            let path = JsonPath::parse(&operand.value)?;
            Ok(event.get_path(&path).cloned().unwrap_or(Value::Null))
        }
        OperandSource::Context
        | OperandSource::ContextRun
        | OperandSource::ContextPause
        | OperandSource::ContextSucceed
        | OperandSource::ContextFail
        | OperandSource::ContextReset => {
            let path = JsonPath::parse(&operand.value)?.namespaced(namespace_for(operand, active));
            Ok(context.get_path(&path).cloned().unwrap_or(Value::Null))
        }
    }
}

/// Target key suffix from the operand's `context_key_postfix` event path.
///
/// `None` without the option. A missing or `null` event value gives the
/// empty key.
pub fn postfix_key(operand: &Operand, event: &Event) -> Result<Option<String>> {
    let Some(raw) = operand.option(OperandOption::ContextKeyPostfix) else {
        return Ok(None);
    };
    let path = JsonPath::parse(raw)?;
    let key = match event.get_path(&path) {
        None | Some(Value::Null) => String::new(),
        Some(value) => display_string(value),
    };
    Ok(Some(key))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
