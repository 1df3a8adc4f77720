//! # jobflow-engine
//!
//! Per-event condition evaluation for jobflow jobs.
//!
//! - **Model**: [`types`] vocabulary and [`job::Job`] definitions, with
//!   [`job::Job::validate`] for structural checks
//! - **Resolution**: [`resolver::resolve`] reads event, constant, and
//!   namespaced context operands
//! - **Operators**: [`operators`], pure functions over resolved values
//! - **Topology**: [`topology::Topology::run`] applies one operation
//! - **Processor**: [`processor::ConditionProcessor`] drives an event
//!   through every condition in [`types::ConditionType::EVALUATION_ORDER`]
//!
//! ## Crate Position
//!
//! Depends on: jobflow-core, jobflow-settings.

#![deny(unsafe_code)]

pub mod errors;
pub mod job;
pub mod operators;
pub mod processor;
pub mod resolver;
pub mod topology;
pub mod types;

pub use errors::{EngineError, OperationError};
pub use job::{Condition, Job};
pub use processor::{ConditionProcessor, EvaluationReport};
pub use topology::Topology;
pub use types::{
    ConditionType, Operand, OperandOption, OperandSource, OperandType, Operation, OperatorType,
};
