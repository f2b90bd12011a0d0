use serde::{Deserialize, Serialize};

/// Rule file schema v1.
///
/// This is a *user-facing* model: permissive where forward-compat is cheap,
/// strict validation happens during resolution.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyFileV1 {
    /// Optional schema string for tooling (`confguard.policy.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Package namespace. All files of one bundle must agree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,

    /// Rules in declaration order.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,

    /// Names of rules to enable (alternative to inline `enabled: true`).
    #[serde(default)]
    pub enable: Vec<String>,

    /// Names of rules enforced at hard_fail level.
    #[serde(default)]
    pub hard_fail: Vec<String>,

    /// Names of rules enforced at soft_fail level.
    #[serde(default)]
    pub soft_fail: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// `hard_fail` or `soft_fail`; defaults to `soft_fail` when neither this
    /// nor a file-level list names the rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforcement: Option<String>,

    /// Single-clause predicate body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<ClauseConfig>,

    /// First-match clause chain body.
    #[serde(default)]
    pub clauses: Vec<ClauseConfig>,

    /// Id-indexed body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_each: Option<ForEachConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClauseConfig {
    /// Conditions that must hold for the clause to fire.
    #[serde(default)]
    pub when: Vec<ConditionConfig>,

    /// Predicates that must fail for the clause to fire.
    #[serde(default)]
    pub unless: Vec<ConditionConfig>,

    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionConfig {
    RequireJobs(Vec<String>),
    RequireOrbs(Vec<String>),
    /// `name@version` references.
    RequireOrbsVersion(Vec<String>),
    BanOrbs(Vec<String>),
    /// `name@version` references.
    BanOrbsVersion(Vec<String>),
    FieldAbsent(String),
    FieldPresent(String),
    VersionBelow {
        field: String,
        min: f64,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForEachConfig {
    /// `docker_images`, `job_names`, or `orb_names`.
    pub select: String,

    #[serde(rename = "where")]
    pub matcher: MatcherConfig,

    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherConfig {
    NotPrefixedBy(Vec<String>),
    PrefixedBy(Vec<String>),
    NotIn(Vec<String>),
    In(Vec<String>),
}
