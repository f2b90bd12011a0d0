use crate::aggregate;
use crate::builtins::Builtins;
use crate::conditions;
use crate::error::EvalError;
use crate::model::{Clause, Enforcement, ForEach, PolicySet, Rule, RuleBody, Selector};
use confguard_doc::ConfigValue;
use confguard_types::Decision;
use rayon::prelude::*;
use tracing::debug;

/// What a rule-evaluation error does to the decision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorMode {
    /// A broken rule blocks, like a hard failure.
    #[default]
    FailClosed,
    /// A broken rule is reported but does not block.
    FailOpen,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct EvalOptions {
    pub on_rule_error: ErrorMode,
}

/// One violation instance before wire conversion. The id distinguishes
/// multiple firings of an id-indexed rule.
#[derive(Clone, Debug, PartialEq)]
pub struct Fired {
    pub id: Option<String>,
    pub reason: String,
}

/// Everything one rule produced: zero or more firings, or one isolated error.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleOutcome {
    pub rule: String,
    pub enforcement: Enforcement,
    pub fired: Vec<Fired>,
    pub error: Option<EvalError>,
}

/// Evaluate every enabled rule against the document and aggregate the
/// outcomes into a decision.
///
/// Each rule's output is a pure function of the shared read-only document, so
/// enabled rules run concurrently; the indexed parallel map collects outcomes
/// back in declaration order, which keeps the decision deterministic.
pub fn evaluate(policies: &PolicySet, doc: &ConfigValue, options: &EvalOptions) -> Decision {
    let builtins = Builtins::new(doc);
    let enabled: Vec<&Rule> = policies.enabled_rules().collect();
    debug!(
        package = %policies.package,
        enabled = enabled.len(),
        total = policies.rules.len(),
        "evaluating policy set"
    );
    let outcomes: Vec<RuleOutcome> = enabled
        .par_iter()
        .map(|rule| evaluate_rule(rule, &builtins))
        .collect();
    aggregate::decide(&outcomes, options.on_rule_error)
}

/// Evaluate a single rule. Never panics; a runtime failure lands in
/// `RuleOutcome::error` without touching any other rule.
pub fn evaluate_rule(rule: &Rule, builtins: &Builtins<'_>) -> RuleOutcome {
    let result = match &rule.body {
        RuleBody::Check(clause) => eval_clauses(std::slice::from_ref(clause), builtins),
        RuleBody::Clauses(clauses) => eval_clauses(clauses, builtins),
        RuleBody::ForEach(for_each) => eval_for_each(for_each, builtins),
    };
    let (fired, error) = match result {
        Ok(fired) => (fired, None),
        Err(err) => (Vec::new(), Some(err)),
    };
    RuleOutcome {
        rule: rule.name.clone(),
        enforcement: rule.enforcement,
        fired,
        error,
    }
}

/// Clauses model an if/elseif chain over failure causes: first clause whose
/// guards hold wins and emits the sole violation for this pass.
fn eval_clauses(clauses: &[Clause], builtins: &Builtins<'_>) -> Result<Vec<Fired>, EvalError> {
    for clause in clauses {
        if let Some(reason) = conditions::clause_fires(clause, builtins)? {
            return Ok(vec![Fired { id: None, reason }]);
        }
    }
    Ok(Vec::new())
}

/// Id-indexed rules iterate a derived set in document order; every matching id
/// fires independently.
fn eval_for_each(for_each: &ForEach, builtins: &Builtins<'_>) -> Result<Vec<Fired>, EvalError> {
    let ids = select_ids(for_each.select, builtins);
    let placeholder = format!("{{{}}}", for_each.select.placeholder());
    let mut fired = Vec::new();
    for id in ids {
        if for_each.matcher.matches(&id) {
            let reason = for_each
                .reason
                .replace("{id}", &id)
                .replace(&placeholder, &id);
            fired.push(Fired {
                id: Some(id),
                reason,
            });
        }
    }
    Ok(fired)
}

fn select_ids(selector: Selector, builtins: &Builtins<'_>) -> Vec<String> {
    match selector {
        Selector::DockerImages => builtins.docker_images(),
        Selector::JobNames => builtins.jobs().to_vec(),
        Selector::OrbNames => builtins.orbs().keys().cloned().collect(),
    }
}
