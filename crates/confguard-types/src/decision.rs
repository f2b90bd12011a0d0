use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Stable schema identifier for the decision artifact.
pub const SCHEMA_DECISION_V1: &str = "confguard.decision.v1";

/// Aggregate compliance verdict for one evaluation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Pass,
    SoftFail,
    HardFail,
}

impl Status {
    /// Whether this status must block the dependent action.
    pub fn blocks(self) -> bool {
        matches!(self, Status::HardFail)
    }
}

/// One rule firing against the input document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Violation {
    pub rule: String,
    pub reason: String,
}

/// A rule whose evaluation itself failed at runtime.
///
/// Distinct from a [`Violation`]: it means the policy is broken, not that the
/// config violates the policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RuleError {
    pub rule: String,
    pub error: String,
}

/// The evaluation artifact: immutable once returned.
///
/// `hard_failures` and `soft_failures` preserve rule declaration order and,
/// within one rule, violation emission order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Decision {
    pub status: Status,
    pub hard_failures: Vec<Violation>,
    pub soft_failures: Vec<Violation>,

    /// Diagnostic channel for per-rule evaluation errors. Omitted from the
    /// wire shape when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<RuleError>,
}

impl Decision {
    /// A clean PASS with no violations of either level.
    pub fn pass() -> Self {
        Decision {
            status: Status::Pass,
            hard_failures: Vec::new(),
            soft_failures: Vec::new(),
            errors: Vec::new(),
        }
    }
}
