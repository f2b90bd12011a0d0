use confguard_types::AuditRecord;
use time::OffsetDateTime;

/// Audit query filters. All optional; set filters combine with logical AND.
///
/// Time bounds are exclusive: `after` keeps records strictly newer, `before`
/// strictly older.
#[derive(Clone, Debug, Default)]
pub struct LogFilter {
    pub after: Option<OffsetDateTime>,
    pub before: Option<OffsetDateTime>,
    pub branch: Option<String>,
    pub project_id: Option<String>,
}

impl LogFilter {
    pub fn matches(&self, record: &AuditRecord) -> bool {
        if let Some(after) = self.after {
            if record.created_at <= after {
                return false;
            }
        }
        if let Some(before) = self.before {
            if record.created_at >= before {
                return false;
            }
        }
        if let Some(branch) = &self.branch {
            if record.metadata.branch.as_deref() != Some(branch.as_str()) {
                return false;
            }
        }
        if let Some(project_id) = &self.project_id {
            if record.metadata.project_id.as_deref() != Some(project_id.as_str()) {
                return false;
            }
        }
        true
    }
}
