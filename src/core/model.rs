// ReportScope - core/model.rs
//
// Log-side data model shared by the log sources, the fetch coordinator,
// export and the UI. Pure data definitions with no I/O.

use crate::core::severity::{Severity, SeverityName};
use crate::core::tree::ReportKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A log line exactly as a log source delivers it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLog {
    pub message: String,
    pub severity: String,
    pub parent_id: Option<String>,
}

/// One displayable diagnostic line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub message: String,
    pub severity: SeverityName,
    /// Tree node this line belongs to; clicking the row reveals that node.
    pub parent_id: Option<String>,
}

impl Log {
    /// Severity names outside the taxonomy map to UNKNOWN.
    pub fn from_raw(raw: RawLog) -> Self {
        Self {
            severity: SeverityName::parse(&raw.severity).unwrap_or_default(),
            message: raw.message,
            parent_id: raw.parent_id,
        }
    }

    pub fn severity_record(&self) -> &'static Severity {
        self.severity.record()
    }
}

/// Everything a log source needs to answer one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRequest {
    pub report_id: String,
    pub kind: ReportKind,
    /// Never empty: an empty selection short-circuits before any request.
    pub severities: BTreeSet<SeverityName>,
    pub text_filter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_maps_severity_names() {
        let log = Log::from_raw(RawLog {
            message: "Line overloaded".to_string(),
            severity: "warn".to_string(),
            parent_id: Some("lf".to_string()),
        });
        assert_eq!(log.severity, SeverityName::Warn);
        assert_eq!(log.severity_record().level, 4);
    }

    #[test]
    fn test_from_raw_unknown_severity_defaults() {
        let log = Log::from_raw(RawLog {
            message: "?".to_string(),
            severity: "NOTICE".to_string(),
            parent_id: None,
        });
        assert_eq!(log.severity, SeverityName::Unknown);
    }

    #[test]
    fn test_raw_log_deserialises_camel_case() {
        let raw: RawLog =
            serde_json::from_str(r#"{"message":"m","severity":"ERROR","parentId":"p"}"#).unwrap();
        assert_eq!(raw.parent_id.as_deref(), Some("p"));
    }
}
