//! Policy source parsing and resolution.
//!
//! This crate is intentionally IO-free: it parses and validates rule files
//! provided as strings and lowers them into the engine-facing
//! [`confguard_domain::model::PolicySet`].

#![forbid(unsafe_code)]

mod error;
mod model;
mod resolve;

pub use error::LoadError;
pub use model::{
    ClauseConfig, ConditionConfig, ForEachConfig, MatcherConfig, PolicyFileV1, RuleConfig,
};
pub use resolve::{resolve_policies, PolicySource};

/// Parse one rule file (YAML) into the permissive user-facing model.
pub fn parse_policy_yaml(input: &str) -> Result<PolicyFileV1, serde_yaml::Error> {
    serde_yaml::from_str(input)
}
