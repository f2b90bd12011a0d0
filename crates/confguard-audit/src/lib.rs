//! Audit log collaborator: the interface the decision engine appends to and
//! the query surface the `logs` use case reads from, plus a JSONL file store.

#![forbid(unsafe_code)]

mod filter;
mod jsonl;
mod store;

pub use filter::LogFilter;
pub use jsonl::JsonlAuditLog;
pub use store::{AuditError, AuditLog};
