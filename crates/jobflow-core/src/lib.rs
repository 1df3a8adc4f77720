//! # jobflow-core
//!
//! Value trees, path addressing, and the mutable job context.
//!
//! - **Paths**: [`path::JsonPath`] compiles `$.a.b` strings; list indexing
//!   is rejected with [`errors::PathError::ArrayAddressing`]
//! - **Trees**: [`tree::get`] / [`tree::set`] over `serde_json` objects
//! - **Context**: [`context::Context`], the persisted per-job tree with a
//!   sticky `updated` flag
//! - **Events**: [`event::Event`], read-only payloads
//! - **Logging**: [`logging::init_logging`] subscriber setup
//!
//! ## Crate Position
//!
//! Foundation crate. Depends on: jobflow-settings.
//! Depended on by: jobflow-engine.

#![deny(unsafe_code)]

pub mod context;
pub mod errors;
pub mod event;
pub mod logging;
pub mod path;
pub mod tree;

pub use context::Context;
pub use errors::PathError;
pub use event::Event;
pub use path::JsonPath;
pub use serde_json::{Map, Value};
pub use tree::ValueTree;
