//! Use case orchestration for confguard.
//!
//! This crate provides the application layer: use cases that coordinate the
//! doc, policy, domain, and audit layers. It is intentionally thin and is the
//! only place (besides the CLI) where filesystem I/O happens — strictly
//! before and strictly after the pure evaluation core runs.
//!
//! The CLI crate depends on this; it only handles argument parsing and
//! output.

#![forbid(unsafe_code)]

mod decide;
mod logs;
mod render;
mod source;
mod store;

pub use decide::{persist_decision, run_decide, status_exit_code, DecideInput, DecideOutput};
pub use logs::{render_records, run_logs};
pub use render::{serialize_decision, write_text};
pub use source::load_policy_source;
pub use store::{DirPolicyStore, PolicyStore, PolicySummary};
