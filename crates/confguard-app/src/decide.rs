//! The `decide` use case: evaluate a config document against a policy set.

use anyhow::Context;
use confguard_audit::AuditLog;
use confguard_doc::parse_document;
use confguard_domain::{evaluate, EvalOptions};
use confguard_policy::{resolve_policies, PolicySource};
use confguard_types::{AuditMetadata, AuditRecord, Decision, Status};
use tracing::{debug, info};

/// Input for the decide use case.
#[derive(Clone, Debug)]
pub struct DecideInput<'a> {
    /// Owner/organization identifier recorded in the audit trail.
    pub owner_id: &'a str,
    /// Config document contents (YAML or JSON).
    pub config_text: &'a str,
    /// Bundled rule files, in bundle order.
    pub policies: &'a [PolicySource],
    pub project_id: Option<String>,
    pub branch: Option<String>,
    pub options: EvalOptions,
}

/// Output from the decide use case.
#[derive(Clone, Debug)]
pub struct DecideOutput {
    pub decision: Decision,
    /// Ready-to-append audit record for the decision.
    pub record: AuditRecord,
}

/// Run the decide use case: parse the document, load policies, evaluate, and
/// build the audit record. Load failures surface here, before evaluation; the
/// caller persists the record afterwards if a log is configured.
pub fn run_decide(input: DecideInput<'_>) -> anyhow::Result<DecideOutput> {
    let doc = parse_document(input.config_text).context("parse config document")?;
    let policies = resolve_policies(input.policies).context("load policies")?;
    debug!(
        package = %policies.package,
        rules = policies.rules.len(),
        "policies loaded"
    );

    let decision = evaluate(&policies, &doc, &input.options);
    info!(
        status = ?decision.status,
        hard = decision.hard_failures.len(),
        soft = decision.soft_failures.len(),
        errors = decision.errors.len(),
        "decision computed"
    );

    let record = AuditRecord::new(
        AuditMetadata {
            owner_id: input.owner_id.to_string(),
            project_id: input.project_id.clone(),
            branch: input.branch.clone(),
        },
        decision.clone(),
        doc.to_json(),
    );

    Ok(DecideOutput { decision, record })
}

/// Append the audit record for a fully-completed decision.
pub fn persist_decision(log: &dyn AuditLog, record: &AuditRecord) -> anyhow::Result<()> {
    log.append(record).context("append audit record")
}

/// Map status to exit code: 0 = pass or soft fail, 2 = hard fail (blocks).
pub fn status_exit_code(status: Status) -> i32 {
    match status {
        Status::Pass => 0,
        Status::SoftFail => 0,
        Status::HardFail => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: &str = r#"
package: org.compliance
rules:
  - name: use_official_docker_image
    for_each:
      select: docker_images
      where: { not_prefixed_by: ["circleci/", "cimg/"] }
      reason: "{image} is not an approved Docker image"
enable: [use_official_docker_image]
hard_fail: [use_official_docker_image]
"#;

    fn input<'a>(config_text: &'a str, policies: &'a [PolicySource]) -> DecideInput<'a> {
        DecideInput {
            owner_id: "org-1",
            config_text,
            policies,
            project_id: Some("proj-1".to_string()),
            branch: Some("main".to_string()),
            options: EvalOptions::default(),
        }
    }

    #[test]
    fn hard_failure_blocks_and_is_itemized() {
        let policies = [PolicySource::new("policy.yaml", POLICY)];
        let config = r#"{ "workflows": [{"jobs": ["build"]}],
            "jobs": {"build": {"docker": [{"image":"circleci/node"},{"image":"evil/bad"}]}} }"#;

        let output = run_decide(input(config, &policies)).expect("decide");
        assert_eq!(output.decision.status, Status::HardFail);
        assert_eq!(output.decision.hard_failures.len(), 1);
        assert_eq!(
            output.decision.hard_failures[0].reason,
            "evil/bad is not an approved Docker image"
        );
        assert_eq!(status_exit_code(output.decision.status), 2);

        // The record carries the decision and the input document.
        assert_eq!(output.record.decision, output.decision);
        assert_eq!(output.record.metadata.owner_id, "org-1");
        assert_eq!(output.record.input["jobs"]["build"]["docker"][1]["image"], "evil/bad");
    }

    #[test]
    fn clean_config_passes() {
        let policies = [PolicySource::new("policy.yaml", POLICY)];
        let config = r#"{ "jobs": {"build": {"docker": [{"image":"cimg/node:18"}]}} }"#;

        let output = run_decide(input(config, &policies)).expect("decide");
        assert_eq!(output.decision, confguard_types::Decision::pass());
        assert_eq!(status_exit_code(output.decision.status), 0);
    }

    #[test]
    fn malformed_document_fails_before_evaluation() {
        let policies = [PolicySource::new("policy.yaml", POLICY)];
        let err = run_decide(input("jobs: [unclosed", &policies)).expect_err("should fail");
        assert!(err.to_string().contains("parse config document"));
    }

    #[test]
    fn broken_policy_fails_before_evaluation() {
        let policies = [PolicySource::new(
            "policy.yaml",
            "rules:\n  - name: ghost_ref\n    check: { when: [{ field_absent: x }], reason: r }\nenable: [missing]\n",
        )];
        let err = run_decide(input("{}", &policies)).expect_err("should fail");
        let chain = format!("{err:#}");
        assert!(chain.contains("load policies"));
        assert!(chain.contains("missing"));
    }
}
