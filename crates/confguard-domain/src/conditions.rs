//! Guard condition evaluation and reason templating.

use crate::builtins::Builtins;
use crate::error::EvalError;
use crate::model::{Clause, Condition};
use confguard_doc::{lookup, ConfigValue, Number};
use std::collections::BTreeMap;

/// Values captured by a holding condition, keyed by template placeholder.
pub(crate) type Captures = BTreeMap<&'static str, String>;

/// Test one condition. `Ok(Some(captures))` means the condition holds.
pub(crate) fn test(
    condition: &Condition,
    builtins: &Builtins<'_>,
) -> Result<Option<Captures>, EvalError> {
    match condition {
        Condition::RequireJobs(names) => Ok(holds(builtins.require_jobs(names))),
        Condition::RequireOrbs(names) => Ok(holds(builtins.require_orbs(names))),
        Condition::RequireOrbsVersion(refs) => Ok(holds(builtins.require_orbs_version(refs))),
        Condition::BanOrbs(names) => Ok(holds(builtins.ban_orbs(names))),
        Condition::BanOrbsVersion(refs) => Ok(holds(builtins.ban_orbs_version(refs))),
        Condition::FieldAbsent(field) => {
            if lookup(builtins.document(), field).is_none() {
                Ok(Some(field_capture(field)))
            } else {
                Ok(None)
            }
        }
        Condition::FieldPresent(field) => {
            if lookup(builtins.document(), field).is_some() {
                Ok(Some(field_capture(field)))
            } else {
                Ok(None)
            }
        }
        Condition::VersionBelow { field, min } => version_below(builtins, field, *min),
    }
}

/// Evaluate one clause: every `when` condition must hold and every `unless`
/// predicate must fail. Returns the rendered reason when the clause fires.
pub(crate) fn clause_fires(
    clause: &Clause,
    builtins: &Builtins<'_>,
) -> Result<Option<String>, EvalError> {
    let mut captures = Captures::new();
    for condition in &clause.when {
        match test(condition, builtins)? {
            Some(found) => captures.extend(found),
            None => return Ok(None),
        }
    }
    for condition in &clause.unless {
        if test(condition, builtins)?.is_some() {
            return Ok(None);
        }
    }
    Ok(Some(render(&clause.reason, &captures)))
}

/// Fill `{placeholder}` occurrences from the captures. Unknown placeholders
/// are left literal.
pub(crate) fn render(template: &str, captures: &Captures) -> String {
    let mut out = template.to_string();
    for (key, value) in captures {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

fn holds(predicate: bool) -> Option<Captures> {
    predicate.then(Captures::new)
}

fn field_capture(field: &str) -> Captures {
    Captures::from([("field", field.to_string())])
}

/// A guard over an absent field is simply unsatisfied (the clause chain puts a
/// `field_absent` clause ahead of it); a present non-numeric value is a
/// rule-evaluation error.
fn version_below(
    builtins: &Builtins<'_>,
    field: &str,
    min: f64,
) -> Result<Option<Captures>, EvalError> {
    let Some(value) = lookup(builtins.document(), field) else {
        return Ok(None);
    };
    let number = match value {
        ConfigValue::Number(n) => *n,
        ConfigValue::String(s) => {
            Number::Float(s.parse::<f64>().map_err(|_| EvalError::NotANumber {
                field: field.to_string(),
                value: s.clone(),
            })?)
        }
        other => {
            return Err(EvalError::TypeMismatch {
                field: field.to_string(),
                actual: other.type_name(),
            });
        }
    };
    if number.as_f64() < min {
        let mut captures = field_capture(field);
        captures.insert("value", number.to_string());
        captures.insert("min", Number::Float(min).to_string());
        Ok(Some(captures))
    } else {
        Ok(None)
    }
}
