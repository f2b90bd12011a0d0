use crate::filter::LogFilter;
use confguard_types::AuditRecord;
use thiserror::Error;

/// Collaborator failures. Surfaced to the caller as a distinct kind, never
/// conflated with a policy HARD_FAIL.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit log I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit record serialization: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("malformed audit record at line {line}: {err}")]
    Malformed {
        line: usize,
        #[source]
        err: serde_json::Error,
    },
}

/// Durable decision log.
///
/// `append` must be atomic with respect to a completed decision: either the
/// whole record lands or nothing does. `query` returns records in append
/// order, oldest first.
pub trait AuditLog: Send + Sync {
    fn append(&self, record: &AuditRecord) -> Result<(), AuditError>;
    fn query(&self, filter: &LogFilter) -> Result<Vec<AuditRecord>, AuditError>;
}
