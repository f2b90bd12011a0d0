//! Property-based tests for the evaluation engine.
//!
//! These verify invariants around:
//! - Decision determinism across repeated evaluation
//! - Enablement isolation (disabled rules never change the decision)
//! - Hard-fail dominance and status consistency

use crate::engine::{evaluate, EvalOptions};
use crate::model::{Clause, Condition, Enforcement, Matcher, PolicySet, Rule, Selector};
use crate::test_support::{check_rule, for_each_rule, policy};
use confguard_doc::{ConfigMap, ConfigValue};
use confguard_types::Status;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_job_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_-]{0,12}").expect("valid regex")
}

fn arb_image() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("cimg/base:stable".to_string()),
        Just("circleci/node:18".to_string()),
        prop::string::string_regex("[a-z]{1,8}/[a-z]{1,8}").expect("valid regex"),
    ]
}

/// A small pipeline document: jobs with docker images, one workflow
/// referencing every declared job.
fn arb_document() -> impl Strategy<Value = ConfigValue> {
    prop::collection::vec(
        (arb_job_name(), prop::collection::vec(arb_image(), 0..4)),
        0..5,
    )
    .prop_map(|jobs| {
        let mut job_map = ConfigMap::new();
        let mut referenced = Vec::new();
        for (name, images) in jobs {
            referenced.push(ConfigValue::String(name.clone()));
            let docker: Vec<ConfigValue> = images
                .into_iter()
                .map(|image| {
                    ConfigValue::Map(ConfigMap::from_iter([(
                        "image".to_string(),
                        ConfigValue::String(image),
                    )]))
                })
                .collect();
            job_map.insert(
                name,
                ConfigValue::Map(ConfigMap::from_iter([(
                    "docker".to_string(),
                    ConfigValue::Seq(docker),
                )])),
            );
        }
        let workflow = ConfigValue::Map(ConfigMap::from_iter([(
            "jobs".to_string(),
            ConfigValue::Seq(referenced),
        )]));
        ConfigValue::Map(ConfigMap::from_iter([
            ("jobs".to_string(), ConfigValue::Map(job_map)),
            (
                "workflows".to_string(),
                ConfigValue::Map(ConfigMap::from_iter([(
                    "main".to_string(),
                    workflow,
                )])),
            ),
        ]))
    })
}

fn arb_enforcement() -> impl Strategy<Value = Enforcement> {
    prop_oneof![Just(Enforcement::HardFail), Just(Enforcement::SoftFail)]
}

/// Rule sets mixing image-allowlist rules and required-job checks, with
/// unique generated names.
fn arb_rules() -> impl Strategy<Value = Vec<Rule>> {
    prop::collection::vec(
        (
            arb_enforcement(),
            prop::collection::vec(Just("cimg/".to_string()), 0..2),
            arb_job_name(),
            any::<bool>(),
        ),
        0..6,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(index, (enforcement, prefixes, job, use_for_each))| {
                let name = format!("rule_{index}");
                if use_for_each {
                    for_each_rule(
                        &name,
                        enforcement,
                        Selector::DockerImages,
                        Matcher::NotPrefixedBy(prefixes),
                        "{image} is not approved",
                    )
                } else {
                    check_rule(
                        &name,
                        enforcement,
                        Clause {
                            when: Vec::new(),
                            unless: vec![Condition::RequireJobs(vec![job])],
                            reason: "required job missing from workflows".to_string(),
                        },
                    )
                }
            })
            .collect()
    })
}

fn arb_policy() -> impl Strategy<Value = PolicySet> {
    arb_rules().prop_map(policy)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Re-running the evaluator on the same (document, rules) input yields a
    /// bit-identical decision, parallel scheduling notwithstanding.
    #[test]
    fn evaluation_is_deterministic(document in arb_document(), policies in arb_policy()) {
        let first = evaluate(&policies, &document, &EvalOptions::default());
        for _ in 0..4 {
            let again = evaluate(&policies, &document, &EvalOptions::default());
            prop_assert_eq!(&again, &first);
        }
    }

    /// Adding a disabled rule never changes the decision for any document.
    #[test]
    fn disabled_rules_are_isolated(document in arb_document(), policies in arb_policy()) {
        let baseline = evaluate(&policies, &document, &EvalOptions::default());

        let mut extended = policies.clone();
        let mut extra = check_rule(
            "extra_disabled",
            Enforcement::HardFail,
            Clause {
                when: vec![Condition::FieldAbsent("__always_absent__".to_string())],
                unless: Vec::new(),
                reason: "would always fire if enabled".to_string(),
            },
        );
        extra.enabled = false;
        extended.rules.push(extra);

        let with_disabled = evaluate(&extended, &document, &EvalOptions::default());
        prop_assert_eq!(with_disabled, baseline);
    }

    /// A fired hard_fail rule forces HARD_FAIL regardless of how many
    /// soft_fail rules fired alongside it.
    #[test]
    fn hard_fail_dominates(document in arb_document(), policies in arb_policy()) {
        let mut extended = policies.clone();
        extended.rules.push(check_rule(
            "always_fires_hard",
            Enforcement::HardFail,
            Clause {
                when: vec![Condition::FieldAbsent("__always_absent__".to_string())],
                unless: Vec::new(),
                reason: "sentinel".to_string(),
            },
        ));

        let decision = evaluate(&extended, &document, &EvalOptions::default());
        prop_assert_eq!(decision.status, Status::HardFail);
    }

    /// Status is fully determined by the two violation sequences when no rule
    /// errored.
    #[test]
    fn status_matches_partition(document in arb_document(), policies in arb_policy()) {
        let decision = evaluate(&policies, &document, &EvalOptions::default());
        prop_assert!(decision.errors.is_empty());
        let expected = if !decision.hard_failures.is_empty() {
            Status::HardFail
        } else if !decision.soft_failures.is_empty() {
            Status::SoftFail
        } else {
            Status::Pass
        };
        prop_assert_eq!(decision.status, expected);
    }

    /// Violations preserve rule declaration order within each level.
    #[test]
    fn violations_follow_declaration_order(document in arb_document(), policies in arb_policy()) {
        let decision = evaluate(&policies, &document, &EvalOptions::default());
        let declared: Vec<&str> = policies.rules.iter().map(|r| r.name.as_str()).collect();
        for failures in [&decision.hard_failures, &decision.soft_failures] {
            let mut last_index = 0usize;
            for violation in failures.iter() {
                let index = declared
                    .iter()
                    .position(|n| *n == violation.rule)
                    .expect("violation names a declared rule");
                prop_assert!(index >= last_index);
                last_index = index;
            }
        }
    }
}
