//! The `logs` use case: filtered audit log retrieval.

use anyhow::Context;
use confguard_audit::{AuditLog, LogFilter};
use confguard_types::AuditRecord;
use tracing::debug;

/// Query the audit log. Records come back in the store's documented order
/// (append order, oldest first).
pub fn run_logs(log: &dyn AuditLog, filter: &LogFilter) -> anyhow::Result<Vec<AuditRecord>> {
    let records = log.query(filter).context("query audit log")?;
    debug!(records = records.len(), "audit query complete");
    Ok(records)
}

/// Render records as a JSON array.
pub fn render_records(records: &[AuditRecord], pretty: bool) -> anyhow::Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(records)
    } else {
        serde_json::to_string(records)
    }
    .context("serialize audit records")?;
    Ok(text)
}
