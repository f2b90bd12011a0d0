use crate::filter::LogFilter;
use crate::store::{AuditError, AuditLog};
use camino::{Utf8Path, Utf8PathBuf};
use confguard_types::AuditRecord;
use std::fs::{self, OpenOptions};
use std::io::Write;

/// File-backed audit log: one JSON record per line, append-only.
///
/// A record is serialized fully before the file is touched and written with a
/// single `write_all`, so a failed or cancelled request never leaves a partial
/// decision behind. Query order is append order, oldest first.
pub struct JsonlAuditLog {
    path: Utf8PathBuf,
}

impl JsonlAuditLog {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        JsonlAuditLog { path: path.into() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl AuditLog for JsonlAuditLog {
    fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    fn query(&self, filter: &LogFilter) -> Result<Vec<AuditRecord>, AuditError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path)?;
        let mut out = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: AuditRecord =
                serde_json::from_str(line).map_err(|err| AuditError::Malformed {
                    line: index + 1,
                    err,
                })?;
            if filter.matches(&record) {
                out.push(record);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confguard_types::{AuditMetadata, Decision};
    use serde_json::json;

    fn log_in(dir: &tempfile::TempDir) -> JsonlAuditLog {
        let path = Utf8PathBuf::from_path_buf(dir.path().join("decisions.jsonl"))
            .expect("utf8 temp path");
        JsonlAuditLog::new(path)
    }

    fn record(branch: &str) -> AuditRecord {
        AuditRecord::new(
            AuditMetadata {
                owner_id: "org-1".to_string(),
                project_id: Some("proj-1".to_string()),
                branch: Some(branch.to_string()),
            },
            Decision::pass(),
            json!({"version": 2.1}),
        )
    }

    #[test]
    fn append_then_query_round_trips_in_order() {
        let dir = tempfile::tempdir().expect("temp dir");
        let log = log_in(&dir);

        let first = record("main");
        let second = record("develop");
        log.append(&first).expect("append");
        log.append(&second).expect("append");

        let all = log.query(&LogFilter::default()).expect("query");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[1].id, second.id);
    }

    #[test]
    fn branch_filter_applies() {
        let dir = tempfile::tempdir().expect("temp dir");
        let log = log_in(&dir);
        log.append(&record("main")).expect("append");
        log.append(&record("develop")).expect("append");

        let filter = LogFilter {
            branch: Some("develop".to_string()),
            ..LogFilter::default()
        };
        let hits = log.query(&filter).expect("query");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].metadata.branch.as_deref(), Some("develop"));
    }

    #[test]
    fn querying_a_missing_log_is_empty_not_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let log = log_in(&dir);
        assert!(log.query(&LogFilter::default()).expect("query").is_empty());
    }

    #[test]
    fn corrupt_lines_are_reported_with_their_line_number() {
        let dir = tempfile::tempdir().expect("temp dir");
        let log = log_in(&dir);
        log.append(&record("main")).expect("append");
        fs::write(
            log.path(),
            format!(
                "{}\nnot json\n",
                serde_json::to_string(&record("main")).expect("serialize")
            ),
        )
        .expect("write");

        let err = log.query(&LogFilter::default()).expect_err("should fail");
        assert!(matches!(err, AuditError::Malformed { line: 2, .. }));
    }

    #[test]
    fn append_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("nested/dir/log.jsonl"))
            .expect("utf8 temp path");
        let log = JsonlAuditLog::new(path);
        log.append(&record("main")).expect("append");
        assert_eq!(log.query(&LogFilter::default()).expect("query").len(), 1);
    }
}
