//! Applying one operation to the context.
//!
//! [`Topology::run`] resolves an operation's operands, hands them to the
//! operator library, and writes the result under the active namespace. The
//! target key is always namespaced by the condition being evaluated; only
//! operand reads honour namespace overrides.

use jobflow_core::{Context, Event, JsonPath, Value};

use crate::errors::{EngineError, Result};
use crate::operators;
use crate::resolver::{postfix_key, resolve};
use crate::types::{Operand, OperandOption, Operation, OperatorType};

/// Stateless operation executor.
pub struct Topology;

impl Topology {
    /// Apply `operation` for `event`, writing into `context` under
    /// `namespace`.
    ///
    /// On error the context may already hold writes from earlier operands of
    /// a multi-operand projection; nothing is rolled back.
    pub fn run(
        event: &Event,
        operation: &Operation,
        context: &mut Context,
        namespace: &str,
    ) -> Result<()> {
        let target = JsonPath::parse(&operation.context_key)?.namespaced(namespace);
        let operator = operation.operator;

        match operator {
            OperatorType::Projection | OperatorType::Merge => {
                for operand in &operation.operands {
                    let value = resolve(operand, event, context, namespace)?;
                    let path = match postfix_key(operand, event)? {
                        Some(key) => target.join(&key)?,
                        None => target.clone(),
                    };
                    let changed = context.set_path(&path, value);
                    tracing::debug!(%operator, %path, changed, "operand written");
                }
            }
            OperatorType::Sum => {
                let operand = operand_at(operation, 0)?;
                let value = resolve(operand, event, context, namespace)?;
                let next = operators::sum(operand.operand_type, &value, context.get_path(&target))?;
                write(context, operator, &target, next);
            }
            OperatorType::Count => {
                let hits = if operation.operands.is_empty() {
                    1
                } else {
                    resolve_all(operation, event, context, namespace)?
                        .iter()
                        .filter(|v| !v.is_null())
                        .count()
                };
                let next = operators::count(context.get_path(&target), hits);
                write(context, operator, &target, next);
            }
            OperatorType::Equal
            | OperatorType::NotEqual
            | OperatorType::GreaterThan
            | OperatorType::GreaterThanEqual
            | OperatorType::LessThan
            | OperatorType::LessThanEqual => {
                let (left_operand, right_operand) = binary_operands(operation)?;
                let left = resolve(left_operand, event, context, namespace)?;
                let right = resolve(right_operand, event, context, namespace)?;
                let result = operators::apply_comparison(
                    operator,
                    left_operand.operand_type,
                    &left,
                    right_operand.operand_type,
                    &right,
                )?;
                write(context, operator, &target, Value::Bool(result));
            }
            OperatorType::HasAllKey | OperatorType::HasAnyKey => {
                let values = resolve_all(operation, event, context, namespace)?;
                let result = if operator == OperatorType::HasAllKey {
                    operators::has_all_key(&values)
                } else {
                    operators::has_any_key(&values)
                };
                write(context, operator, &target, Value::Bool(result));
            }
            OperatorType::Substring => {
                let operand = operand_at(operation, 0)?;
                let value = resolve(operand, event, context, namespace)?;
                let sliced = operators::substring(
                    &value,
                    operand.option(OperandOption::Start),
                    operand.option(OperandOption::End),
                )?;
                write(context, operator, &target, Value::String(sliced));
            }
        }
        Ok(())
    }
}

fn write(context: &mut Context, operator: OperatorType, target: &JsonPath, value: Value) {
    let changed = context.set_path(target, value);
    tracing::debug!(%operator, path = %target, changed, "operation written");
}

fn operand_at(operation: &Operation, index: usize) -> Result<&Operand> {
    operation
        .operands
        .get(index)
        .ok_or(EngineError::OperandIndexOutOfRange {
            operator: operation.operator,
            index,
            len: operation.operands.len(),
        })
}

fn binary_operands(operation: &Operation) -> Result<(&Operand, &Operand)> {
    let len = operation.operands.len();
    if len > 2 {
        return Err(EngineError::UnexpectedOperands {
            operator: operation.operator,
            expected: 2,
            actual: len,
        });
    }
    Ok((operand_at(operation, 0)?, operand_at(operation, 1)?))
}

fn resolve_all(
    operation: &Operation,
    event: &Event,
    context: &Context,
    namespace: &str,
) -> Result<Vec<Value>> {
    operation
        .operands
        .iter()
        .map(|operand| resolve(operand, event, context, namespace))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OperandSource, OperandType};
    use assert_matches::assert_matches;
    use serde_json::json;

    fn event(value: serde_json::Value) -> Event {
        serde_json::from_value(value).unwrap()
    }

    fn first_event() -> Event {
        event(json!({
            "info": {"name": "name1", "level": 12},
            "quantity": 2,
            "type": "head",
            "value": "head",
            "datetime": "2021-01-01T01:02:03"
        }))
    }

    fn second_event() -> Event {
        event(json!({
            "info": {"name": "name2", "level": 13},
            "quantity": 3,
            "type": "foot",
            "value": "foot",
            "datetime": "2021-01-02T02:03:04"
        }))
    }

    fn read<'a>(ctx: &'a Context, path: &str) -> Option<&'a Value> {
        ctx.get(path).unwrap()
    }

    #[test]
    fn projection_copies_event_values() {
        let op = Operation::new(
            "$.projection",
            OperatorType::Projection,
            vec![Operand::event(OperandType::String, "$.info.name")],
        );
        let mut ctx = Context::new();
        Topology::run(&first_event(), &op, &mut ctx, "run").unwrap();
        assert_eq!(read(&ctx, "$.run.projection"), Some(&json!("name1")));
        assert!(ctx.is_updated());
    }

    #[test]
    fn projection_of_subtree_and_missing_value() {
        let op = Operation::new(
            "$.meta",
            OperatorType::Projection,
            vec![Operand::event(OperandType::String, "$.info")],
        );
        let mut ctx = Context::new();
        Topology::run(&first_event(), &op, &mut ctx, "run").unwrap();
        assert_eq!(read(&ctx, "$.run.meta.level"), Some(&json!(12)));

        let missing = Operation::new(
            "$.absent",
            OperatorType::Projection,
            vec![Operand::event(OperandType::String, "$.nope")],
        );
        ctx.reset_updated();
        Topology::run(&first_event(), &missing, &mut ctx, "run").unwrap();
        assert_eq!(read(&ctx, "$.run.absent"), None);
        assert!(!ctx.is_updated());
    }

    #[test]
    fn merge_with_postfix_builds_keyed_map() {
        let op = Operation::new(
            "$.human",
            OperatorType::Merge,
            vec![Operand::event(OperandType::String, "$.value")
                .with_option(OperandOption::ContextKeyPostfix, "$.type")],
        );
        let mut ctx = Context::new();
        Topology::run(&first_event(), &op, &mut ctx, "succeed").unwrap();
        Topology::run(&second_event(), &op, &mut ctx, "succeed").unwrap();
        assert_eq!(
            read(&ctx, "$.succeed.human"),
            Some(&json!({"head": "head", "foot": "foot"}))
        );
    }

    #[test]
    fn dotted_postfix_nests_and_stays_addressable() {
        let merge = Operation::new(
            "$.human",
            OperatorType::Merge,
            vec![Operand::event(OperandType::String, "$.value")
                .with_option(OperandOption::ContextKeyPostfix, "$.type")],
        );
        let has_all = Operation::new(
            "$.has_all",
            OperatorType::HasAllKey,
            vec![Operand::context(OperandType::String, "$.human.body.head")],
        );
        let ev = event(json!({"type": "body.head", "value": "x"}));
        let mut ctx = Context::new();
        Topology::run(&ev, &merge, &mut ctx, "succeed").unwrap();
        Topology::run(&ev, &has_all, &mut ctx, "succeed").unwrap();

        assert_eq!(read(&ctx, "$.succeed.human.body.head"), Some(&json!("x")));
        assert_eq!(read(&ctx, "$.succeed.has_all"), Some(&json!(true)));
    }

    #[test]
    fn bracket_postfix_is_array_addressing() {
        let merge = Operation::new(
            "$.human",
            OperatorType::Merge,
            vec![Operand::event(OperandType::String, "$.value")
                .with_option(OperandOption::ContextKeyPostfix, "$.type")],
        );
        let ev = event(json!({"type": "[0]", "value": "x"}));
        let mut ctx = Context::new();
        assert_matches!(
            Topology::run(&ev, &merge, &mut ctx, "succeed"),
            Err(EngineError::Path(jobflow_core::PathError::ArrayAddressing { .. }))
        );
        assert!(!ctx.is_updated());
    }

    #[test]
    fn missing_value_still_creates_intermediates() {
        let op = Operation::new(
            "$.a.b",
            OperatorType::Projection,
            vec![Operand::event(OperandType::String, "$.nope")],
        );
        let mut ctx = Context::new();
        Topology::run(&first_event(), &op, &mut ctx, "run").unwrap();
        assert_eq!(ctx.to_json_string(false).unwrap(), r#"{"run":{"a":{}}}"#);
        assert_eq!(read(&ctx, "$.run.a.b"), None);
        assert!(!ctx.is_updated());
    }

    #[test]
    fn sum_then_equal_across_events() {
        let sum = Operation::new(
            "$.quantity_sum",
            OperatorType::Sum,
            vec![Operand::event(OperandType::Number, "$.quantity")],
        );
        let equal = Operation::new(
            "$.quantity_sum_equal",
            OperatorType::Equal,
            vec![
                Operand::context(OperandType::Number, "$.quantity_sum"),
                Operand::constant(OperandType::Number, "5"),
            ],
        );
        let mut ctx = Context::new();
        for ev in [first_event(), second_event()] {
            Topology::run(&ev, &sum, &mut ctx, "run").unwrap();
            Topology::run(&ev, &equal, &mut ctx, "run").unwrap();
        }
        assert_eq!(read(&ctx, "$.run.quantity_sum"), Some(&json!(5)));
        assert_eq!(read(&ctx, "$.run.quantity_sum_equal"), Some(&json!(true)));
    }

    #[test]
    fn count_operands_and_deliveries() {
        let present = Operation::new(
            "$.seen",
            OperatorType::Count,
            vec![
                Operand::event(OperandType::String, "$.type"),
                Operand::event(OperandType::String, "$.missing"),
            ],
        );
        let deliveries = Operation::new("$.deliveries", OperatorType::Count, vec![]);
        let mut ctx = Context::new();
        for _ in 0..3 {
            Topology::run(&first_event(), &present, &mut ctx, "run").unwrap();
            Topology::run(&first_event(), &deliveries, &mut ctx, "run").unwrap();
        }
        assert_eq!(read(&ctx, "$.run.seen"), Some(&json!(3)));
        assert_eq!(read(&ctx, "$.run.deliveries"), Some(&json!(3)));
    }

    #[test]
    fn key_presence_over_context() {
        let merge = Operation::new(
            "$.human",
            OperatorType::Merge,
            vec![Operand::event(OperandType::String, "$.value")
                .with_option(OperandOption::ContextKeyPostfix, "$.type")],
        );
        let keys = || {
            vec![
                Operand::context(OperandType::String, "$.human.head"),
                Operand::context(OperandType::String, "$.human.foot"),
            ]
        };
        let has_all = Operation::new("$.has_all", OperatorType::HasAllKey, keys());
        let has_any = Operation::new("$.has_any", OperatorType::HasAnyKey, keys());

        let mut ctx = Context::new();
        for op in [&merge, &has_all, &has_any] {
            Topology::run(&first_event(), op, &mut ctx, "succeed").unwrap();
        }
        assert_eq!(read(&ctx, "$.succeed.has_all"), Some(&json!(false)));
        assert_eq!(read(&ctx, "$.succeed.has_any"), Some(&json!(true)));

        for op in [&merge, &has_all, &has_any] {
            Topology::run(&second_event(), op, &mut ctx, "succeed").unwrap();
        }
        assert_eq!(read(&ctx, "$.succeed.has_all"), Some(&json!(true)));
        assert_eq!(read(&ctx, "$.succeed.has_any"), Some(&json!(true)));
    }

    #[test]
    fn substring_writes_date_prefix() {
        let op = Operation::new(
            "$.date",
            OperatorType::Substring,
            vec![Operand::event(OperandType::String, "$.datetime")
                .with_option(OperandOption::Start, "0")
                .with_option(OperandOption::End, "10")],
        );
        let mut ctx = Context::new();
        Topology::run(&first_event(), &op, &mut ctx, "fail").unwrap();
        assert_eq!(read(&ctx, "$.fail.date"), Some(&json!("2021-01-01")));
    }

    #[test]
    fn cross_namespace_copy() {
        let mut ctx = Context::new();
        let _ = ctx.set("$.succeed.has_all", true).unwrap();
        let op = Operation::new(
            "$.copy_from_succeed.has_all",
            OperatorType::Projection,
            vec![Operand::context(OperandType::Boolean, "$.has_all")
                .with_option(OperandOption::ContextNamespace, "succeed")],
        );
        Topology::run(&first_event(), &op, &mut ctx, "reset").unwrap();
        assert_eq!(read(&ctx, "$.reset.copy_from_succeed.has_all"), Some(&json!(true)));
        assert_eq!(read(&ctx, "$.succeed.copy_from_succeed"), None);
    }

    #[test]
    fn comparison_family_writes_booleans() {
        let mut ctx = Context::new();
        let quantity = || Operand::event(OperandType::Number, "$.quantity");
        let three = || Operand::constant(OperandType::Number, "3");
        let cases = [
            (OperatorType::NotEqual, true),
            (OperatorType::GreaterThan, false),
            (OperatorType::GreaterThanEqual, false),
            (OperatorType::LessThan, true),
            (OperatorType::LessThanEqual, true),
        ];
        for (operator, expected) in cases {
            let op = Operation::new("$.cmp", operator, vec![quantity(), three()]);
            Topology::run(&first_event(), &op, &mut ctx, "pause").unwrap();
            assert_eq!(read(&ctx, "$.pause.cmp"), Some(&json!(expected)), "{operator}");
        }
    }

    #[test]
    fn operand_count_errors() {
        let mut ctx = Context::new();
        let one = Operation::new(
            "$.eq",
            OperatorType::Equal,
            vec![Operand::event(OperandType::Number, "$.quantity")],
        );
        assert_matches!(
            Topology::run(&first_event(), &one, &mut ctx, "run"),
            Err(EngineError::OperandIndexOutOfRange { index: 1, len: 1, .. })
        );

        let none = Operation::new("$.s", OperatorType::Substring, vec![]);
        assert_matches!(
            Topology::run(&first_event(), &none, &mut ctx, "run"),
            Err(EngineError::OperandIndexOutOfRange { index: 0, len: 0, .. })
        );

        let three = Operation::new(
            "$.eq",
            OperatorType::Equal,
            vec![
                Operand::constant(OperandType::Number, "1"),
                Operand::constant(OperandType::Number, "1"),
                Operand::constant(OperandType::Number, "1"),
            ],
        );
        assert_matches!(
            Topology::run(&first_event(), &three, &mut ctx, "run"),
            Err(EngineError::UnexpectedOperands { .. })
        );
        assert!(!ctx.is_updated());
    }

    #[test]
    fn type_errors_leave_target_untouched() {
        let mut ctx = Context::new();
        let op = Operation::new(
            "$.eq",
            OperatorType::Equal,
            vec![
                Operand::event(OperandType::String, "$.type"),
                Operand::new(OperandSource::Constant, OperandType::Boolean, "true"),
            ],
        );
        assert_matches!(
            Topology::run(&first_event(), &op, &mut ctx, "run"),
            Err(EngineError::UnsupportedOperation { .. })
        );
        let sum = Operation::new(
            "$.total",
            OperatorType::Sum,
            vec![Operand::constant(OperandType::Boolean, "true")],
        );
        assert_matches!(
            Topology::run(&first_event(), &sum, &mut ctx, "run"),
            Err(EngineError::UnsupportedType { .. })
        );
        assert_eq!(read(&ctx, "$.run"), None);
    }

    #[test]
    fn bad_context_key_is_path_error() {
        let op = Operation::new("quantity", OperatorType::Count, vec![]);
        let mut ctx = Context::new();
        assert_matches!(
            Topology::run(&first_event(), &op, &mut ctx, "run"),
            Err(EngineError::Path(_))
        );
    }
}
