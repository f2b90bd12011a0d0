//! Policy management collaborator: the interface a management layer drives
//! and a directory-backed implementation.

use anyhow::Context;
use camino::Utf8PathBuf;
use confguard_policy::{resolve_policies, PolicySource};
use serde::Serialize;
use std::fs;
use tracing::info;

/// Suffix marking a stored policy as inactive.
const DISABLED_SUFFIX: &str = ".disabled";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PolicySummary {
    pub id: String,
    pub name: String,
    pub active: bool,
}

/// Storage owned by the management layer. The decision engine only consumes
/// the active policy set; it never writes here.
pub trait PolicyStore: Send + Sync {
    fn create(&self, name: &str, content: &str) -> anyhow::Result<PolicySummary>;
    fn list(&self, active_only: bool) -> anyhow::Result<Vec<PolicySummary>>;
    fn get(&self, id: &str) -> anyhow::Result<String>;
    fn update(&self, id: &str, content: &str) -> anyhow::Result<PolicySummary>;
    fn delete(&self, id: &str) -> anyhow::Result<()>;
}

/// Directory-backed store: one rule file per policy, id = file stem. A
/// `.disabled` suffix marks a policy inactive.
pub struct DirPolicyStore {
    dir: Utf8PathBuf,
}

impl DirPolicyStore {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        DirPolicyStore { dir: dir.into() }
    }

    fn active_path(&self, id: &str) -> Utf8PathBuf {
        self.dir.join(format!("{id}.yaml"))
    }

    fn find(&self, id: &str) -> anyhow::Result<Utf8PathBuf> {
        let active = self.active_path(id);
        if active.is_file() {
            return Ok(active);
        }
        let disabled = self.dir.join(format!("{id}.yaml{DISABLED_SUFFIX}"));
        if disabled.is_file() {
            return Ok(disabled);
        }
        anyhow::bail!("no such policy: {id}")
    }

    /// Reject content that would not load as a policy set.
    fn validate(name: &str, content: &str) -> anyhow::Result<()> {
        resolve_policies(&[PolicySource::new(name, content)])
            .map(|_| ())
            .with_context(|| format!("validate policy {name}"))
    }
}

impl PolicyStore for DirPolicyStore {
    fn create(&self, name: &str, content: &str) -> anyhow::Result<PolicySummary> {
        Self::validate(name, content)?;
        let path = self.active_path(name);
        if path.exists() {
            anyhow::bail!("policy already exists: {name}");
        }
        fs::create_dir_all(&self.dir).with_context(|| format!("create store: {}", self.dir))?;
        fs::write(&path, content).with_context(|| format!("write policy: {path}"))?;
        info!(policy = name, "policy created");
        Ok(PolicySummary {
            id: name.to_string(),
            name: name.to_string(),
            active: true,
        })
    }

    fn list(&self, active_only: bool) -> anyhow::Result<Vec<PolicySummary>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut summaries = Vec::new();
        for entry in self
            .dir
            .read_dir_utf8()
            .with_context(|| format!("read store: {}", self.dir))?
        {
            let entry = entry.with_context(|| format!("read store: {}", self.dir))?;
            let file_name = entry.file_name().to_string();
            let (stem, active) = match file_name.strip_suffix(DISABLED_SUFFIX) {
                Some(base) => (base.strip_suffix(".yaml"), false),
                None => (file_name.strip_suffix(".yaml"), true),
            };
            let Some(stem) = stem else { continue };
            if active_only && !active {
                continue;
            }
            summaries.push(PolicySummary {
                id: stem.to_string(),
                name: stem.to_string(),
                active,
            });
        }
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }

    fn get(&self, id: &str) -> anyhow::Result<String> {
        let path = self.find(id)?;
        fs::read_to_string(&path).with_context(|| format!("read policy: {path}"))
    }

    fn update(&self, id: &str, content: &str) -> anyhow::Result<PolicySummary> {
        let path = self.find(id)?;
        Self::validate(id, content)?;
        fs::write(&path, content).with_context(|| format!("write policy: {path}"))?;
        info!(policy = id, "policy updated");
        Ok(PolicySummary {
            id: id.to_string(),
            name: id.to_string(),
            active: !path.as_str().ends_with(DISABLED_SUFFIX),
        })
    }

    fn delete(&self, id: &str) -> anyhow::Result<()> {
        let path = self.find(id)?;
        fs::remove_file(&path).with_context(|| format!("delete policy: {path}"))?;
        info!(policy = id, "policy deleted");
        Ok(())
    }
}
