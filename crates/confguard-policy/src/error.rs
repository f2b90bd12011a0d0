use thiserror::Error;

/// Load-time policy source errors. All are fatal to the request and reported
/// before any evaluation begins.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("malformed policy source `{source_name}`: {err}")]
    Malformed {
        source_name: String,
        #[source]
        err: serde_yaml::Error,
    },

    #[error("policy bundle is empty")]
    EmptyBundle,

    #[error("duplicate rule name `{name}` (declared in `{first}` and `{second}`)")]
    DuplicateRule {
        name: String,
        first: String,
        second: String,
    },

    #[error("`{list}` references undefined rule `{name}` in `{source_name}`")]
    DanglingReference {
        list: &'static str,
        name: String,
        source_name: String,
    },

    #[error("rule `{name}` is listed under both hard_fail and soft_fail")]
    ConflictingEnforcement { name: String },

    #[error("policy package mismatch: `{first}` vs `{second}` in `{source_name}`")]
    PackageMismatch {
        first: String,
        second: String,
        source_name: String,
    },

    #[error("rule `{name}` defines no evaluation (one of `check`, `clauses`, `for_each`)")]
    MissingBody { name: String },

    #[error("rule `{name}`: exactly one of `check`, `clauses`, `for_each` may be set")]
    AmbiguousBody { name: String },

    #[error("rule `{name}`: clause has neither `when` nor `unless` conditions")]
    EmptyClause { name: String },

    #[error("rule `{name}`: malformed orb reference `{reference}` (expected name@version)")]
    MalformedOrbRef { name: String, reference: String },

    #[error("rule `{name}`: unknown enforcement `{value}` (expected hard_fail|soft_fail)")]
    UnknownEnforcement { name: String, value: String },

    #[error(
        "rule `{name}`: unknown selector `{value}` (expected docker_images|job_names|orb_names)"
    )]
    UnknownSelector { name: String, value: String },
}
