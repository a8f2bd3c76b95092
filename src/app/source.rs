// ReportScope - app/source.rs
//
// The log source seam. A `LogSource` answers "which log lines belong to this
// report, at these severities, matching this text". Implementations run on
// the fetch worker thread, so they must be Send + Sync.
//
// `PayloadLogSource` answers from the report payload that was loaded into
// the viewer: the pure log leaves dropped from the tree are the log lines.

use crate::core::filter::LogFilter;
use crate::core::model::{Log, LogRequest, RawLog};
use crate::core::report::Report;
use crate::core::severity::highest_severity;
use crate::core::tree::{ReportKind, ReportTree};
use crate::util::error::FetchError;
use std::collections::HashMap;
use std::ops::Range;

pub trait LogSource: Send + Sync {
    fn fetch_logs(&self, request: &LogRequest) -> Result<Vec<RawLog>, FetchError>;
}

/// Serves logs straight from a loaded report.
///
/// Logs are stored in payload order. Every subtree owns a contiguous range,
/// so a node request is a slice plus filtering.
#[derive(Debug, Clone, Default)]
pub struct PayloadLogSource {
    logs: Vec<Log>,
    subtree_ranges: HashMap<String, Range<usize>>,
}

impl PayloadLogSource {
    /// `tree` must be the result of mapping `report`; the two are walked in
    /// lockstep to attribute each log line to its owning tree node.
    pub fn new(report: &Report, tree: &ReportTree) -> Self {
        let mut source = Self::default();
        source.collect(report, tree);
        tracing::debug!(
            logs = source.logs.len(),
            nodes = source.subtree_ranges.len(),
            "Payload log source built"
        );
        source
    }

    fn collect(&mut self, report: &Report, tree: &ReportTree) {
        let start = self.logs.len();
        let mut mapped_children = tree.sub_reports.iter();
        for child in &report.sub_reports {
            if child.is_log_leaf() {
                self.logs.push(Log {
                    message: child.message.clone(),
                    severity: highest_severity(child.severities.iter().copied()).name,
                    parent_id: Some(tree.id.clone()),
                });
            } else if let Some(mapped) = mapped_children.next() {
                self.collect(child, mapped);
            }
        }
        self.subtree_ranges
            .insert(tree.id.clone(), start..self.logs.len());
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}

impl LogSource for PayloadLogSource {
    fn fetch_logs(&self, request: &LogRequest) -> Result<Vec<RawLog>, FetchError> {
        let range = match request.kind {
            ReportKind::Global => 0..self.logs.len(),
            ReportKind::Node => self
                .subtree_ranges
                .get(&request.report_id)
                .cloned()
                .ok_or_else(|| FetchError::UnknownReport {
                    report_id: request.report_id.clone(),
                })?,
        };

        let filter = LogFilter::new(request.severities.clone(), request.text_filter.as_deref());
        Ok(self.logs[range]
            .iter()
            .filter(|log| filter.matches(&log.message, log.severity))
            .map(|log| RawLog {
                message: log.message.clone(),
                severity: log.severity.as_str().to_string(),
                parent_id: log.parent_id.clone(),
            })
            .collect())
    }
}
