use crate::decision::Decision;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use time::OffsetDateTime;
use uuid::Uuid;

/// Stable schema identifier for persisted audit records.
pub const SCHEMA_AUDIT_V1: &str = "confguard.audit.v1";

/// Request metadata captured alongside every decision.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AuditMetadata {
    pub owner_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// A persisted decision: the artifact plus the input document and request
/// metadata, for later retrieval and filtering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AuditRecord {
    pub schema: String,

    #[schemars(with = "String")]
    pub id: Uuid,

    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    pub metadata: AuditMetadata,
    pub decision: Decision,

    /// The evaluated configuration document, as JSON.
    pub input: JsonValue,
}

impl AuditRecord {
    pub fn new(metadata: AuditMetadata, decision: Decision, input: JsonValue) -> Self {
        AuditRecord {
            schema: SCHEMA_AUDIT_V1.to_string(),
            id: Uuid::new_v4(),
            created_at: OffsetDateTime::now_utc(),
            metadata,
            decision,
            input,
        }
    }
}
