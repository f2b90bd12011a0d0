use crate::error::LoadError;
use crate::model::{ClauseConfig, ConditionConfig, ForEachConfig, MatcherConfig, RuleConfig};
use crate::parse_policy_yaml;
use confguard_domain::model::{
    Clause, Condition, Enforcement, ForEach, Matcher, OrbRef, PolicySet, Rule, RuleBody, Selector,
};
use std::collections::{BTreeMap, BTreeSet};

/// Namespace used when no bundled file declares a package.
const DEFAULT_PACKAGE: &str = "org";

/// One rule file: a display name (path or label, used in errors) plus its
/// content. Bundle order is the caller's responsibility and is load-bearing:
/// rule declaration order follows it.
#[derive(Clone, Debug, PartialEq)]
pub struct PolicySource {
    pub name: String,
    pub content: String,
}

impl PolicySource {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        PolicySource {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Parse, validate, and lower a bundle of rule files into one [`PolicySet`].
///
/// Validation covers everything that must fail before evaluation: malformed
/// files, duplicate rule names, enable/enforcement references to undefined
/// rules, a rule listed at both enforcement levels, and package mismatches
/// between bundled files.
pub fn resolve_policies(sources: &[PolicySource]) -> Result<PolicySet, LoadError> {
    if sources.is_empty() {
        return Err(LoadError::EmptyBundle);
    }

    let mut package: Option<String> = None;
    let mut rules: Vec<Rule> = Vec::new();
    let mut origins: BTreeMap<String, String> = BTreeMap::new();
    let mut enable: Vec<(String, String)> = Vec::new();
    let mut hard: Vec<(String, String)> = Vec::new();
    let mut soft: Vec<(String, String)> = Vec::new();

    for source in sources {
        let file = parse_policy_yaml(&source.content).map_err(|err| LoadError::Malformed {
            source_name: source.name.clone(),
            err,
        })?;

        if let Some(pkg) = file.package {
            match &package {
                Some(existing) if *existing != pkg => {
                    return Err(LoadError::PackageMismatch {
                        first: existing.clone(),
                        second: pkg,
                        source_name: source.name.clone(),
                    });
                }
                Some(_) => {}
                None => package = Some(pkg),
            }
        }

        for rule_config in file.rules {
            if let Some(first) = origins.get(&rule_config.name) {
                return Err(LoadError::DuplicateRule {
                    name: rule_config.name,
                    first: first.clone(),
                    second: source.name.clone(),
                });
            }
            origins.insert(rule_config.name.clone(), source.name.clone());
            rules.push(lower_rule(rule_config)?);
        }

        enable.extend(file.enable.into_iter().map(|n| (n, source.name.clone())));
        hard.extend(file.hard_fail.into_iter().map(|n| (n, source.name.clone())));
        soft.extend(file.soft_fail.into_iter().map(|n| (n, source.name.clone())));
    }

    let hard_names: BTreeSet<&str> = hard.iter().map(|(n, _)| n.as_str()).collect();
    for (name, _) in &soft {
        if hard_names.contains(name.as_str()) {
            return Err(LoadError::ConflictingEnforcement { name: name.clone() });
        }
    }

    apply_list(&mut rules, &enable, "enable", |rule| rule.enabled = true)?;
    apply_list(&mut rules, &hard, "hard_fail", |rule| {
        rule.enforcement = Enforcement::HardFail;
    })?;
    apply_list(&mut rules, &soft, "soft_fail", |rule| {
        rule.enforcement = Enforcement::SoftFail;
    })?;

    Ok(PolicySet {
        package: package.unwrap_or_else(|| DEFAULT_PACKAGE.to_string()),
        rules,
    })
}

fn apply_list(
    rules: &mut [Rule],
    entries: &[(String, String)],
    list: &'static str,
    mut apply: impl FnMut(&mut Rule),
) -> Result<(), LoadError> {
    for (name, source_name) in entries {
        match rules.iter_mut().find(|rule| &rule.name == name) {
            Some(rule) => apply(rule),
            None => {
                return Err(LoadError::DanglingReference {
                    list,
                    name: name.clone(),
                    source_name: source_name.clone(),
                });
            }
        }
    }
    Ok(())
}

fn lower_rule(config: RuleConfig) -> Result<Rule, LoadError> {
    let RuleConfig {
        name,
        description,
        enabled,
        enforcement,
        check,
        clauses,
        for_each,
    } = config;

    let enforcement = match enforcement.as_deref() {
        None => Enforcement::default(),
        Some("hard_fail") => Enforcement::HardFail,
        Some("soft_fail") => Enforcement::SoftFail,
        Some(other) => {
            return Err(LoadError::UnknownEnforcement {
                name,
                value: other.to_string(),
            });
        }
    };

    let body = match (check, clauses.is_empty(), for_each) {
        (Some(clause), true, None) => RuleBody::Check(lower_clause(&name, clause)?),
        (None, false, None) => {
            let lowered = clauses
                .into_iter()
                .map(|clause| lower_clause(&name, clause))
                .collect::<Result<Vec<_>, _>>()?;
            RuleBody::Clauses(lowered)
        }
        (None, true, Some(for_each)) => RuleBody::ForEach(lower_for_each(&name, for_each)?),
        (None, true, None) => {
            // A body-less rule is only legal as an explicitly disabled helper
            // stub; it can never fire.
            if enabled == Some(false) {
                RuleBody::Clauses(Vec::new())
            } else {
                return Err(LoadError::MissingBody { name });
            }
        }
        _ => return Err(LoadError::AmbiguousBody { name }),
    };

    Ok(Rule {
        name,
        description,
        enabled: enabled.unwrap_or(false),
        enforcement,
        body,
    })
}

fn lower_clause(rule: &str, config: ClauseConfig) -> Result<Clause, LoadError> {
    if config.when.is_empty() && config.unless.is_empty() {
        return Err(LoadError::EmptyClause {
            name: rule.to_string(),
        });
    }
    let when = config
        .when
        .into_iter()
        .map(|condition| lower_condition(rule, condition))
        .collect::<Result<Vec<_>, _>>()?;
    let unless = config
        .unless
        .into_iter()
        .map(|condition| lower_condition(rule, condition))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Clause {
        when,
        unless,
        reason: config.reason,
    })
}

fn lower_condition(rule: &str, config: ConditionConfig) -> Result<Condition, LoadError> {
    Ok(match config {
        ConditionConfig::RequireJobs(names) => Condition::RequireJobs(names),
        ConditionConfig::RequireOrbs(names) => Condition::RequireOrbs(names),
        ConditionConfig::RequireOrbsVersion(refs) => {
            Condition::RequireOrbsVersion(parse_orb_refs(rule, refs)?)
        }
        ConditionConfig::BanOrbs(names) => Condition::BanOrbs(names),
        ConditionConfig::BanOrbsVersion(refs) => {
            Condition::BanOrbsVersion(parse_orb_refs(rule, refs)?)
        }
        ConditionConfig::FieldAbsent(field) => Condition::FieldAbsent(field),
        ConditionConfig::FieldPresent(field) => Condition::FieldPresent(field),
        ConditionConfig::VersionBelow { field, min } => Condition::VersionBelow { field, min },
    })
}

fn parse_orb_refs(rule: &str, refs: Vec<String>) -> Result<Vec<OrbRef>, LoadError> {
    refs.into_iter()
        .map(|reference| {
            OrbRef::parse(&reference).ok_or_else(|| LoadError::MalformedOrbRef {
                name: rule.to_string(),
                reference,
            })
        })
        .collect()
}

fn lower_for_each(rule: &str, config: ForEachConfig) -> Result<ForEach, LoadError> {
    let select = match config.select.as_str() {
        "docker_images" => Selector::DockerImages,
        "job_names" => Selector::JobNames,
        "orb_names" => Selector::OrbNames,
        other => {
            return Err(LoadError::UnknownSelector {
                name: rule.to_string(),
                value: other.to_string(),
            });
        }
    };
    let matcher = match config.matcher {
        MatcherConfig::NotPrefixedBy(prefixes) => Matcher::NotPrefixedBy(prefixes),
        MatcherConfig::PrefixedBy(prefixes) => Matcher::PrefixedBy(prefixes),
        MatcherConfig::NotIn(names) => Matcher::NotIn(names),
        MatcherConfig::In(names) => Matcher::In(names),
    };
    Ok(ForEach {
        select,
        matcher,
        reason: config.reason,
    })
}
