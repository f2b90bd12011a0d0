//! Serialization helpers for decision output.

use anyhow::Context;
use camino::Utf8Path;
use confguard_types::Decision;

pub fn serialize_decision(decision: &Decision, pretty: bool) -> anyhow::Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(decision)
    } else {
        serde_json::to_string(decision)
    }
    .context("serialize decision")?;
    Ok(text)
}

pub fn write_text(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory: {parent}"))?;
    }
    std::fs::write(path, text).with_context(|| format!("write output: {path}"))?;
    Ok(())
}
