//! Per-event evaluation of a whole job.
//!
//! [`ConditionProcessor`] pairs a job with the context it drives. Each call
//! to [`ConditionProcessor::run`] walks the conditions in
//! [`ConditionType::EVALUATION_ORDER`], applying every operation with the
//! condition type as namespace. Later operations see earlier writes,
//! including writes made earlier in the same pass by other conditions.
//!
//! Failures are handled per [`FailurePolicy`]: `continue` records them in the
//! [`EvaluationReport`] and moves on, `abort` stops the pass.

use jobflow_core::{Context, Event};
use jobflow_settings::{EvaluationSettings, FailurePolicy, JobflowSettings};

use crate::errors::OperationError;
use crate::job::Job;
use crate::topology::Topology;
use crate::types::ConditionType;

/// Outcome of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationReport {
    /// Operations that completed.
    pub operations_run: usize,
    /// Operations that failed, in evaluation order.
    pub failures: Vec<OperationError>,
}

impl EvaluationReport {
    /// Whether every operation completed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Evaluates events for one job against one context.
///
/// Holds the context mutably, so only one evaluation can touch it at a time.
pub struct ConditionProcessor<'a> {
    job: &'a Job,
    context: &'a mut Context,
    evaluation: EvaluationSettings,
    pretty_json: bool,
}

impl<'a> ConditionProcessor<'a> {
    /// Create a processor. Validates the job first when
    /// `evaluation.validateJobs` is set.
    pub fn new(
        job: &'a Job,
        context: &'a mut Context,
        settings: &JobflowSettings,
    ) -> Result<Self, OperationError> {
        if settings.evaluation.validate_jobs {
            job.validate()?;
        }
        Ok(Self {
            job,
            context,
            evaluation: settings.evaluation.clone(),
            pretty_json: settings.context.pretty_json,
        })
    }

    /// Evaluate one event.
    ///
    /// Under [`FailurePolicy::Abort`] the first failure is returned and the
    /// remaining operations are skipped; writes already made stay.
    pub fn run(&mut self, event: &Event) -> Result<EvaluationReport, OperationError> {
        let mut report = EvaluationReport::default();

        for condition_type in ConditionType::EVALUATION_ORDER {
            let Some(condition) = self.job.condition(condition_type) else {
                continue;
            };
            let namespace = condition_type.as_str();
            for (index, operation) in condition.operations.iter().enumerate() {
                match Topology::run(event, operation, self.context, namespace) {
                    Ok(()) => report.operations_run += 1,
                    Err(source) => {
                        let failure = OperationError {
                            condition: condition_type,
                            index,
                            operator: operation.operator,
                            source,
                        };
                        tracing::warn!(
                            condition = %condition_type,
                            index,
                            operator = %operation.operator,
                            context_key = %operation.context_key,
                            error = %failure.source,
                            policy = %self.evaluation.failure_policy,
                            "operation failed"
                        );
                        match self.evaluation.failure_policy {
                            FailurePolicy::Abort => return Err(failure),
                            FailurePolicy::Continue => report.failures.push(failure),
                        }
                    }
                }
            }
        }

        tracing::debug!(
            operations = report.operations_run,
            failures = report.failures.len(),
            updated = self.context.is_updated(),
            "event evaluated"
        );
        Ok(report)
    }

    /// Borrow the context.
    #[must_use]
    pub fn context(&self) -> &Context {
        self.context
    }

    /// Render the context as JSON, pretty-printed if configured.
    pub fn context_json(&self) -> serde_json::Result<String> {
        self.context.to_json_string(self.pretty_json)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EngineError;
    use crate::job::Condition;
    use crate::types::{Operand, OperandOption, OperandType, Operation, OperatorType};
    use assert_matches::assert_matches;
    use serde_json::json;

    fn settings(policy: FailurePolicy, validate_jobs: bool) -> JobflowSettings {
        let mut settings = JobflowSettings::default();
        settings.evaluation.failure_policy = policy;
        settings.evaluation.validate_jobs = validate_jobs;
        settings
    }

    fn event(quantity: i64) -> Event {
        serde_json::from_value(json!({"quantity": quantity, "datetime": "2021"})).unwrap()
    }

    fn counter(key: &str) -> Operation {
        Operation::new(key, OperatorType::Count, vec![])
    }

    fn broken_substring() -> Operation {
        Operation::new(
            "$.date",
            OperatorType::Substring,
            vec![Operand::event(OperandType::String, "$.datetime")
                .with_option(OperandOption::End, "10")],
        )
    }

    fn job_with_failure() -> Job {
        Job::new()
            .with_condition(
                ConditionType::Fail,
                Condition::new(vec![counter("$.before"), broken_substring(), counter("$.after")]),
            )
            .with_condition(ConditionType::Reset, Condition::new(vec![counter("$.later")]))
    }

    #[test]
    fn pause_runs_before_run() {
        // pause reads run's sum before run updates it in the same pass
        let job = Job::new()
            .with_condition(
                ConditionType::Run,
                Condition::new(vec![Operation::new(
                    "$.total",
                    OperatorType::Sum,
                    vec![Operand::event(OperandType::Number, "$.quantity")],
                )]),
            )
            .with_condition(
                ConditionType::Pause,
                Condition::new(vec![Operation::new(
                    "$.seen_total",
                    OperatorType::Projection,
                    vec![Operand::context(OperandType::Number, "$.total")
                        .with_option(OperandOption::ContextNamespace, "run")],
                )]),
            );
        let mut ctx = Context::new();
        let mut processor =
            ConditionProcessor::new(&job, &mut ctx, &JobflowSettings::default()).unwrap();

        let report = processor.run(&event(2)).unwrap();
        assert_eq!(report.operations_run, 2);
        assert_eq!(processor.context().get("$.pause.seen_total").unwrap(), None);

        let _ = processor.run(&event(3)).unwrap();
        assert_eq!(processor.context().get("$.pause.seen_total").unwrap(), Some(&json!(2)));
        assert_eq!(processor.context().get("$.run.total").unwrap(), Some(&json!(5)));
    }

    #[test]
    fn empty_job_changes_nothing() {
        let job = Job::new();
        let mut ctx = Context::new();
        let mut processor =
            ConditionProcessor::new(&job, &mut ctx, &JobflowSettings::default()).unwrap();
        let report = processor.run(&event(1)).unwrap();
        assert_eq!(report, EvaluationReport::default());
        assert!(!ctx.is_updated());
        assert!(ctx.data().is_empty());
    }

    #[test]
    fn continue_policy_records_and_keeps_going() {
        let job = job_with_failure();
        let mut ctx = Context::new();
        let mut processor =
            ConditionProcessor::new(&job, &mut ctx, &settings(FailurePolicy::Continue, true))
                .unwrap();
        let report = processor.run(&event(1)).unwrap();

        assert!(!report.is_clean());
        assert_eq!(report.operations_run, 3);
        assert_eq!(report.failures.len(), 1);
        let failure = &report.failures[0];
        assert_eq!((failure.condition, failure.index), (ConditionType::Fail, 1));
        assert_eq!(failure.operator, OperatorType::Substring);
        assert_matches!(failure.source, EngineError::SubstringRange { end: 10, len: 4, .. });

        assert_eq!(ctx.get("$.fail.after").unwrap(), Some(&json!(1)));
        assert_eq!(ctx.get("$.reset.later").unwrap(), Some(&json!(1)));
    }

    #[test]
    fn abort_policy_stops_pass() {
        let job = job_with_failure();
        let mut ctx = Context::new();
        let mut processor =
            ConditionProcessor::new(&job, &mut ctx, &settings(FailurePolicy::Abort, true))
                .unwrap();
        let err = processor.run(&event(1)).unwrap_err();
        assert_eq!(err.condition, ConditionType::Fail);
        assert_eq!(err.index, 1);

        assert_eq!(ctx.get("$.fail.before").unwrap(), Some(&json!(1)));
        assert_eq!(ctx.get("$.fail.after").unwrap(), None);
        assert_eq!(ctx.get("$.reset.later").unwrap(), None);
    }

    #[test]
    fn validation_gate_follows_setting() {
        let job = Job::new().with_condition(
            ConditionType::Run,
            Condition::new(vec![Operation::new("$.eq", OperatorType::Equal, vec![])]),
        );
        let mut ctx = Context::new();
        let err = ConditionProcessor::new(&job, &mut ctx, &settings(FailurePolicy::Continue, true))
            .err()
            .unwrap();
        assert_matches!(err.source, EngineError::OperandIndexOutOfRange { .. });

        let mut processor =
            ConditionProcessor::new(&job, &mut ctx, &settings(FailurePolicy::Continue, false))
                .unwrap();
        let report = processor.run(&event(1)).unwrap();
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn context_json_honours_pretty_setting() {
        let job =
            Job::new().with_condition(ConditionType::Run, Condition::new(vec![counter("$.n")]));
        let mut ctx = Context::new();
        let mut settings = JobflowSettings::default();
        settings.context.pretty_json = true;
        let mut processor = ConditionProcessor::new(&job, &mut ctx, &settings).unwrap();
        let _ = processor.run(&event(1)).unwrap();
        assert_eq!(
            processor.context_json().unwrap(),
            "{\n  \"run\": {\n    \"n\": 1\n  }\n}"
        );
    }
}
