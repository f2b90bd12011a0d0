use thiserror::Error;

/// Runtime failure inside a single rule's evaluation.
///
/// Isolated per rule: it never aborts the other rules, and the aggregator
/// decides (per [`crate::ErrorMode`]) whether it blocks the decision.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EvalError {
    #[error("field `{field}` has type {actual}, expected a number")]
    TypeMismatch { field: String, actual: &'static str },

    #[error("field `{field}` is not a number: {value:?}")]
    NotANumber { field: String, value: String },
}
