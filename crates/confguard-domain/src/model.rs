use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity classification of a fired rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Enforcement {
    HardFail,
    #[default]
    SoftFail,
}

/// A named, versionless orb reference: `registry/name@version`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrbRef {
    pub name: String,
    pub version: String,
}

impl OrbRef {
    /// Parse `name@version`. Both parts must be non-empty; the split is on
    /// the last `@` so registry paths containing `@` never confuse it.
    pub fn parse(reference: &str) -> Option<Self> {
        let (name, version) = reference.rsplit_once('@')?;
        if name.is_empty() || version.is_empty() {
            return None;
        }
        Some(OrbRef {
            name: name.to_string(),
            version: version.to_string(),
        })
    }
}

impl fmt::Display for OrbRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// Guard condition inside a clause. Each maps onto one built-in predicate or
/// one document introspection primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    RequireJobs(Vec<String>),
    RequireOrbs(Vec<String>),
    RequireOrbsVersion(Vec<OrbRef>),
    BanOrbs(Vec<String>),
    BanOrbsVersion(Vec<OrbRef>),
    FieldAbsent(String),
    FieldPresent(String),
    VersionBelow { field: String, min: f64 },
}

/// One clause: fires when every `when` condition holds and every `unless`
/// predicate fails. Captures from `when` conditions fill the reason template.
#[derive(Clone, Debug, PartialEq)]
pub struct Clause {
    pub when: Vec<Condition>,
    pub unless: Vec<Condition>,
    pub reason: String,
}

/// Derived id set an id-indexed rule iterates over, in document order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selector {
    DockerImages,
    JobNames,
    OrbNames,
}

impl Selector {
    /// Domain-specific template placeholder accepted alongside `{id}`.
    pub fn placeholder(self) -> &'static str {
        match self {
            Selector::DockerImages => "image",
            Selector::JobNames => "job",
            Selector::OrbNames => "orb",
        }
    }
}

/// Which selected ids count as offending.
#[derive(Clone, Debug, PartialEq)]
pub enum Matcher {
    NotPrefixedBy(Vec<String>),
    PrefixedBy(Vec<String>),
    NotIn(Vec<String>),
    In(Vec<String>),
}

impl Matcher {
    pub fn matches(&self, id: &str) -> bool {
        match self {
            Matcher::NotPrefixedBy(prefixes) => !prefixes.iter().any(|p| id.starts_with(p.as_str())),
            Matcher::PrefixedBy(prefixes) => prefixes.iter().any(|p| id.starts_with(p.as_str())),
            Matcher::NotIn(names) => !names.iter().any(|n| n == id),
            Matcher::In(names) => names.iter().any(|n| n == id),
        }
    }
}

/// Id-indexed rule body: every matching id fires independently.
#[derive(Clone, Debug, PartialEq)]
pub struct ForEach {
    pub select: Selector,
    pub matcher: Matcher,
    pub reason: String,
}

/// The three rule evaluation shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum RuleBody {
    /// Single-clause predicate: at most one violation.
    Check(Clause),
    /// Ordered clause chain; the first clause whose guards hold emits the
    /// sole violation (an if/elseif chain over failure causes).
    Clauses(Vec<Clause>),
    /// Id-indexed: one violation per matching id, all matches fire.
    ForEach(ForEach),
}

/// A named rule with its evaluation, enforcement level, and enablement flag.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub enforcement: Enforcement,
    pub body: RuleBody,
}

/// A loaded policy set: one package namespace, rules in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct PolicySet {
    pub package: String,
    pub rules: Vec<Rule>,
}

impl PolicySet {
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn enabled_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orb_ref_splits_on_last_at() {
        let orb = OrbRef::parse("circleci/slack@4.1").expect("valid");
        assert_eq!(orb.name, "circleci/slack");
        assert_eq!(orb.version, "4.1");
        assert_eq!(orb.to_string(), "circleci/slack@4.1");
    }

    #[test]
    fn orb_ref_rejects_missing_parts() {
        assert_eq!(OrbRef::parse("no-version"), None);
        assert_eq!(OrbRef::parse("@1.0"), None);
        assert_eq!(OrbRef::parse("name@"), None);
    }

    #[test]
    fn matcher_prefix_semantics() {
        let approved = Matcher::NotPrefixedBy(vec!["circleci/".to_string(), "cimg/".to_string()]);
        assert!(approved.matches("evil/bad"));
        assert!(!approved.matches("circleci/node"));
        assert!(!approved.matches("cimg/rust:1.92"));
    }

    #[test]
    fn matcher_set_semantics() {
        let banned = Matcher::In(vec!["deploy".to_string()]);
        assert!(banned.matches("deploy"));
        assert!(!banned.matches("build"));

        let required = Matcher::NotIn(vec!["build".to_string()]);
        assert!(required.matches("lint"));
        assert!(!required.matches("build"));
    }

    #[test]
    fn enforcement_defaults_to_soft_fail() {
        assert_eq!(Enforcement::default(), Enforcement::SoftFail);
    }
}
