//! Policy source loading: a single rule file or a directory bundle.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use confguard_policy::PolicySource;
use std::fs;
use tracing::debug;

/// Load a policy source from disk.
///
/// A file loads as a one-element bundle. A directory bundles its top-level
/// regular files only (non-recursive), sorted by path so the bundle order is
/// independent of filesystem enumeration order.
pub fn load_policy_source(path: &Utf8Path) -> anyhow::Result<Vec<PolicySource>> {
    let meta = fs::metadata(path).with_context(|| format!("read policy source: {path}"))?;

    if meta.is_file() {
        let content =
            fs::read_to_string(path).with_context(|| format!("read policy file: {path}"))?;
        return Ok(vec![PolicySource::new(path.as_str(), content)]);
    }

    let mut files: Vec<Utf8PathBuf> = Vec::new();
    for entry in path
        .read_dir_utf8()
        .with_context(|| format!("read policy directory: {path}"))?
    {
        let entry = entry.with_context(|| format!("read policy directory: {path}"))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat policy file: {}", entry.path()))?;
        if file_type.is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    debug!(bundle = %path, files = files.len(), "policy bundle discovered");

    files
        .into_iter()
        .map(|file| {
            let content =
                fs::read_to_string(&file).with_context(|| format!("read policy file: {file}"))?;
            Ok(PolicySource::new(file.as_str(), content))
        })
        .collect()
}
