//! llearn-core: exercise validation, sessions, and progress tracking.
//!
//! This crate defines the rule model and evaluator, the validation engine
//! that aggregates rule results, the exercise session state machine, the
//! progress store contract with its storage backends, and the lesson
//! catalog with its TOML content loader.

pub mod catalog;
pub mod error;
pub mod model;
pub mod parser;
pub mod progress;
pub mod rules;
pub mod session;
pub mod validation;

