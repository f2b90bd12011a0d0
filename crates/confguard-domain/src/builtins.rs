//! Built-in helper predicates over a pipeline configuration document.
//!
//! [`Builtins`] is constructed once per decision request and handed into every
//! rule evaluation; it is the only way rule logic sees the document. All
//! predicates are pure and total: they never mutate the document and never
//! raise, they only answer.

use crate::model::OrbRef;
use confguard_doc::{project, ConfigValue};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Read-only helper service derived from one configuration document.
pub struct Builtins<'a> {
    doc: &'a ConfigValue,
    jobs: Vec<String>,
    workflow_jobs: BTreeSet<String>,
    orbs: BTreeMap<String, String>,
}

impl<'a> Builtins<'a> {
    pub fn new(doc: &'a ConfigValue) -> Self {
        Builtins {
            doc,
            jobs: declared_jobs(doc),
            workflow_jobs: workflow_job_refs(doc),
            orbs: orb_table(doc),
        }
    }

    pub fn document(&self) -> &'a ConfigValue {
        self.doc
    }

    /// Names of all declared jobs, in declaration order.
    pub fn jobs(&self) -> &[String] {
        &self.jobs
    }

    /// Orb name to version string, one entry per distinct orb reference.
    pub fn orbs(&self) -> &BTreeMap<String, String> {
        &self.orbs
    }

    /// True iff every name is declared under `jobs` and referenced by at
    /// least one workflow's job list. Declared-but-unused does not count.
    pub fn require_jobs<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().all(|name| {
            let name = name.as_ref();
            self.jobs.iter().any(|j| j == name) && self.workflow_jobs.contains(name)
        })
    }

    /// True iff every name is present as an orb, at any version.
    pub fn require_orbs<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names
            .iter()
            .all(|name| self.orbs.contains_key(name.as_ref()))
    }

    /// True iff every reference is present at exactly the given version.
    /// Exact string match; no semver range logic.
    pub fn require_orbs_version(&self, refs: &[OrbRef]) -> bool {
        refs.iter()
            .all(|orb| self.orbs.get(&orb.name) == Some(&orb.version))
    }

    /// True iff none of the names is present as an orb (the ban holds).
    pub fn ban_orbs<S: AsRef<str>>(&self, names: &[S]) -> bool {
        !names
            .iter()
            .any(|name| self.orbs.contains_key(name.as_ref()))
    }

    /// True iff none of the exact (name, version) pairs is present.
    pub fn ban_orbs_version(&self, refs: &[OrbRef]) -> bool {
        !refs
            .iter()
            .any(|orb| self.orbs.get(&orb.name) == Some(&orb.version))
    }

    /// All docker images across job definitions, in document order, first
    /// occurrence only.
    pub fn docker_images(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        let Some(jobs) = project(self.doc, "jobs").and_then(ConfigValue::as_map) else {
            return out;
        };
        for (_name, job) in jobs.iter() {
            let Some(docker) = project(job, "docker").and_then(ConfigValue::as_seq) else {
                continue;
            };
            for entry in docker {
                let Some(image) = project(entry, "image").and_then(ConfigValue::as_str) else {
                    continue;
                };
                if seen.insert(image.to_string()) {
                    out.push(image.to_string());
                }
            }
        }
        out
    }
}

fn declared_jobs(doc: &ConfigValue) -> Vec<String> {
    match project(doc, "jobs").and_then(ConfigValue::as_map) {
        Some(jobs) => jobs.keys().map(str::to_string).collect(),
        None => Vec::new(),
    }
}

/// Job names referenced by any workflow's `jobs` list. Entries are plain
/// strings or single-key mappings carrying per-workflow configuration;
/// `workflows` itself may be a named mapping or a sequence.
fn workflow_job_refs(doc: &ConfigValue) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let Some(workflows) = project(doc, "workflows") else {
        return out;
    };
    let entries: Vec<&ConfigValue> = match workflows {
        ConfigValue::Map(map) => map.iter().map(|(_, v)| v).collect(),
        ConfigValue::Seq(items) => items.iter().collect(),
        _ => return out,
    };
    for workflow in entries {
        let Some(jobs) = project(workflow, "jobs").and_then(ConfigValue::as_seq) else {
            continue;
        };
        for entry in jobs {
            match entry {
                ConfigValue::String(name) => {
                    out.insert(name.clone());
                }
                ConfigValue::Map(map) => {
                    for (name, _) in map.iter() {
                        out.insert(name.to_string());
                    }
                }
                _ => {}
            }
        }
    }
    out
}

/// Orb name -> version, parsed from `orbs:` values shaped `registry/name@ver`.
/// Inline orb definitions (mapping values) carry no external reference and are
/// skipped. A duplicate name with a different version keeps the last
/// declaration and warns.
fn orb_table(doc: &ConfigValue) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    let Some(orbs) = project(doc, "orbs").and_then(ConfigValue::as_map) else {
        return out;
    };
    for (_alias, value) in orbs.iter() {
        let Some(reference) = value.as_str() else {
            continue;
        };
        let Some(orb) = OrbRef::parse(reference) else {
            continue;
        };
        if let Some(previous) = out.insert(orb.name.clone(), orb.version.clone()) {
            if previous != orb.version {
                warn!(
                    orb = %orb.name,
                    previous = %previous,
                    kept = %orb.version,
                    "duplicate orb reference, keeping last declaration"
                );
            }
        }
    }
    out
}
