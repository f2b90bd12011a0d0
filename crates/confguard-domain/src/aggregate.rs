//! Enforcement aggregation: a pure classification/merge over rule outcomes.

use crate::engine::{ErrorMode, RuleOutcome};
use crate::model::Enforcement;
use confguard_types::{Decision, RuleError, Status, Violation};

/// Partition fired violations by enforcement level and compute the status.
///
/// Ordering is load-bearing: outcomes arrive in rule declaration order and
/// violations within one rule in emission order; both are preserved so the
/// same inputs always produce a bit-identical decision.
pub(crate) fn decide(outcomes: &[RuleOutcome], on_rule_error: ErrorMode) -> Decision {
    let mut hard_failures = Vec::new();
    let mut soft_failures = Vec::new();
    let mut errors = Vec::new();

    for outcome in outcomes {
        if let Some(err) = &outcome.error {
            errors.push(RuleError {
                rule: outcome.rule.clone(),
                error: err.to_string(),
            });
            continue;
        }
        let bucket = match outcome.enforcement {
            Enforcement::HardFail => &mut hard_failures,
            Enforcement::SoftFail => &mut soft_failures,
        };
        for fired in &outcome.fired {
            bucket.push(Violation {
                rule: outcome.rule.clone(),
                reason: fired.reason.clone(),
            });
        }
    }

    let fail_closed = on_rule_error == ErrorMode::FailClosed && !errors.is_empty();
    let status = if !hard_failures.is_empty() || fail_closed {
        Status::HardFail
    } else if !soft_failures.is_empty() {
        Status::SoftFail
    } else {
        Status::Pass
    };

    Decision {
        status,
        hard_failures,
        soft_failures,
        errors,
    }
}
