// ReportScope - core/report.rs
//
// Report payload ingestion. Every accepted input shape (single object or
// array, severities as list or as object, missing/null children, string or
// numeric ids) is normalised into the canonical `Report` before any tree
// logic runs.

use crate::core::severity::SeverityName;
use crate::util::constants::GLOBAL_REPORT_LABEL;
use crate::util::error::ReportError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Canonical report
// =============================================================================

/// One node of a computation report, as produced by the backend.
///
/// Immutable once built; the viewer never mutates a `Report`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub message: String,

    /// Stable identifier. Absent on pure log lines.
    pub id: Option<String>,

    pub parent_id: Option<String>,

    /// Severities carried directly by this node, deduplicated and in
    /// taxonomy order. Descendants are not included.
    pub severities: Vec<SeverityName>,

    pub sub_reports: Vec<Report>,
}

impl Report {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_severities(mut self, severities: &[SeverityName]) -> Self {
        self.severities = normalise_severities(severities.iter().copied());
        self
    }

    pub fn with_sub_reports(mut self, sub_reports: Vec<Report>) -> Self {
        self.sub_reports = sub_reports;
        self
    }

    /// A pure log line: no identity and nothing below it. These belong in
    /// the log list, never in the tree.
    pub fn is_log_leaf(&self) -> bool {
        self.id.is_none() && self.sub_reports.is_empty()
    }

    /// Every severity present anywhere in this report, in taxonomy order.
    /// A log line without any recognised severity counts as UNKNOWN.
    pub fn all_severities(&self) -> Vec<SeverityName> {
        let mut seen = [false; 7];
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            for severity in &node.severities {
                seen[*severity as usize] = true;
            }
            if node.is_log_leaf() && node.severities.is_empty() {
                seen[SeverityName::Unknown as usize] = true;
            }
            stack.extend(node.sub_reports.iter());
        }
        SeverityName::all()
            .iter()
            .copied()
            .filter(|name| seen[*name as usize])
            .collect()
    }
}

fn normalise_severities<I: IntoIterator<Item = SeverityName>>(names: I) -> Vec<SeverityName> {
    let mut list: Vec<SeverityName> = names.into_iter().collect();
    list.sort();
    list.dedup();
    list
}

// =============================================================================
// Wire shapes
// =============================================================================

/// Top-level payload: either one report or several independent ones.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReportPayload {
    Many(Vec<RawReport>),
    One(Box<RawReport>),
}

/// Lenient wire representation of a report node. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawReport {
    pub message: Option<String>,
    pub id: Option<RawId>,
    pub parent_id: Option<RawId>,
    pub severities: Option<RawSeverities>,
    pub sub_reports: Option<Vec<RawReport>>,
}

/// Identifiers arrive as strings or, in older payloads, as numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Severities arrive as a list of names, an object keyed by name, or a
/// single name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawSeverities {
    List(Vec<String>),
    Keyed(BTreeMap<String, serde_json::Value>),
    Single(String),
}

impl RawSeverities {
    fn into_names(self) -> Vec<SeverityName> {
        let labels: Vec<String> = match self {
            RawSeverities::List(list) => list,
            RawSeverities::Keyed(map) => map.into_keys().collect(),
            RawSeverities::Single(name) => vec![name],
        };
        normalise_severities(labels.iter().filter_map(|label| {
            let parsed = SeverityName::parse(label);
            if parsed.is_none() {
                tracing::debug!(severity = %label, "Ignoring unrecognised severity name");
            }
            parsed
        }))
    }
}

impl From<RawReport> for Report {
    fn from(raw: RawReport) -> Self {
        Report {
            message: raw.message.unwrap_or_default(),
            id: raw.id.map(RawId::into_string),
            parent_id: raw.parent_id.map(RawId::into_string),
            severities: raw
                .severities
                .map(RawSeverities::into_names)
                .unwrap_or_default(),
            sub_reports: raw
                .sub_reports
                .unwrap_or_default()
                .into_iter()
                .map(Report::from)
                .collect(),
        }
    }
}

// =============================================================================
// Normalisation
// =============================================================================

/// Reduce any payload shape to a single canonical report.
///
/// An array is always wrapped under a synthetic root labelled
/// [`GLOBAL_REPORT_LABEL`], even when it holds a single report, so the
/// "global" fetch route is used consistently for merged payloads.
pub fn normalize(payload: ReportPayload) -> Report {
    match payload {
        ReportPayload::One(raw) => Report::from(*raw),
        ReportPayload::Many(raws) => merge_under_global_root(raws.into_iter().map(Report::from)),
    }
}

/// Wrap independent top-level reports under the synthetic global root.
pub fn merge_under_global_root<I: IntoIterator<Item = Report>>(reports: I) -> Report {
    let sub_reports: Vec<Report> = reports.into_iter().collect();
    tracing::debug!(
        reports = sub_reports.len(),
        "Merging top-level reports under global root"
    );
    Report::new(GLOBAL_REPORT_LABEL).with_sub_reports(sub_reports)
}

/// Parse and normalise a report payload from JSON text.
pub fn parse_report_json(text: &str) -> Result<Report, ReportError> {
    let payload: ReportPayload =
        serde_json::from_str(text).map_err(|source| ReportError::Json { source })?;
    Ok(normalize(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_report_is_kept_as_root() {
        let report = parse_report_json(
            r#"{"message":"Root","id":"r","severities":["INFO"],"subReports":[]}"#,
        )
        .unwrap();
        assert_eq!(report.message, "Root");
        assert_eq!(report.id.as_deref(), Some("r"));
        assert_eq!(report.severities, vec![SeverityName::Info]);
    }

    #[test]
    fn test_array_is_merged_under_global_root() {
        let report = parse_report_json(
            r#"[{"message":"Load flow","id":"lf"},{"message":"Security","id":"sa"}]"#,
        )
        .unwrap();
        assert_eq!(report.message, GLOBAL_REPORT_LABEL);
        assert!(report.id.is_none());
        assert_eq!(report.sub_reports.len(), 2);
        assert_eq!(report.sub_reports[1].id.as_deref(), Some("sa"));
    }

    #[test]
    fn test_missing_and_null_fields_default_to_empty() {
        let report =
            parse_report_json(r#"{"message":null,"subReports":null,"severities":null}"#).unwrap();
        assert_eq!(report.message, "");
        assert!(report.sub_reports.is_empty());
        assert!(report.severities.is_empty());
        assert!(report.is_log_leaf());
    }

    #[test]
    fn test_keyed_severities_and_numeric_ids() {
        let report = parse_report_json(
            r#"{"message":"n","id":42,"severities":{"WARN":{"level":4},"ERROR":{},"LOUD":{}}}"#,
        )
        .unwrap();
        assert_eq!(report.id.as_deref(), Some("42"));
        assert_eq!(
            report.severities,
            vec![SeverityName::Warn, SeverityName::Error]
        );
    }

    #[test]
    fn test_unknown_severity_names_are_dropped() {
        let report =
            parse_report_json(r#"{"message":"n","severities":["info","NOPE","INFO"]}"#).unwrap();
        assert_eq!(report.severities, vec![SeverityName::Info]);
    }

    #[test]
    fn test_non_report_json_is_an_error() {
        assert!(matches!(
            parse_report_json("42"),
            Err(ReportError::Json { .. })
        ));
        assert!(matches!(
            parse_report_json("{not json"),
            Err(ReportError::Json { .. })
        ));
    }

    #[test]
    fn test_all_severities_covers_descendants() {
        let report = Report::new("root")
            .with_severities(&[SeverityName::Info])
            .with_sub_reports(vec![Report::new("a").with_sub_reports(vec![
                Report::new("leaf").with_severities(&[SeverityName::Fatal]),
            ])]);
        assert_eq!(
            report.all_severities(),
            vec![SeverityName::Info, SeverityName::Fatal]
        );
    }

    #[test]
    fn test_log_line_without_severity_counts_as_unknown() {
        let report = Report::new("root")
            .with_id("root")
            .with_sub_reports(vec![Report::new("bare line")]);
        assert_eq!(report.all_severities(), vec![SeverityName::Unknown]);
    }
}
