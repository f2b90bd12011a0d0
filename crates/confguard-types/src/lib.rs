//! Stable DTOs used across the confguard workspace.
//!
//! This crate is intentionally boring:
//! - the decision artifact emitted for every evaluation request
//! - the audit record wrapping a decision for durable logging
//! - stable schema identifiers

#![forbid(unsafe_code)]

pub mod audit;
pub mod decision;

pub use audit::{AuditMetadata, AuditRecord, SCHEMA_AUDIT_V1};
pub use decision::{Decision, RuleError, Status, Violation, SCHEMA_DECISION_V1};
