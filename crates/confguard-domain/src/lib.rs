//! Pure policy evaluation (no IO).
//!
//! Input: a configuration document and a resolved policy set constructed
//! elsewhere. Output: a deterministic decision with classified violations.

#![forbid(unsafe_code)]

pub mod builtins;
pub mod model;

mod aggregate;
mod conditions;
mod engine;
mod error;

#[cfg(test)]
mod proptest;
#[cfg(test)]
pub(crate) mod test_support;

pub use engine::{evaluate, evaluate_rule, ErrorMode, EvalOptions, Fired, RuleOutcome};
pub use error::EvalError;
