// ReportScope - core/tree.rs
//
// Report -> ReportTree mapping with severity aggregation, plus the id index
// used for O(1) ancestor walks. Core layer: pure logic, no I/O or UI.
//
// Aggregation runs before pure log leaves are dropped, so a node's highest
// severity still reflects log lines that only appear in the log list.

use crate::core::report::Report;
use crate::core::severity::{highest_severity, Severity, SeverityName};
use crate::util::constants::GLOBAL_REPORT_LABEL;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Tree types
// =============================================================================

/// How logs for a node are requested from the log source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Synthetic root merging several independent reports.
    Global,
    #[default]
    Node,
}

/// Severity-aggregated, leaf-filtered tree derived from a [`Report`].
/// Read-only once built.
#[derive(Debug, Clone)]
pub struct ReportTree {
    /// Source id, or a generated one that is unique within this tree.
    pub id: String,
    pub message: String,
    pub parent_id: Option<String>,
    /// Own severities, or the union of the children's when the source
    /// node carried none.
    pub severities: Vec<SeverityName>,
    pub highest_severity: &'static Severity,
    pub kind: ReportKind,
    pub sub_reports: Vec<ReportTree>,
}

impl ReportTree {
    /// True when no child survived leaf filtering.
    pub fn is_leaf(&self) -> bool {
        self.sub_reports.is_empty()
    }

    /// Pre-order traversal yielding each node with its depth and parent.
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder {
            stack: vec![TreeVisit {
                node: self,
                parent: None,
                depth: 0,
            }],
        }
    }

    pub fn node_count(&self) -> usize {
        self.pre_order().count()
    }

    /// Find a node by id (linear; use [`ReportIndex`] for repeated lookups).
    pub fn find(&self, id: &str) -> Option<&ReportTree> {
        self.pre_order().map(|v| v.node).find(|node| node.id == id)
    }
}

/// One step of a pre-order traversal.
#[derive(Debug, Clone, Copy)]
pub struct TreeVisit<'a> {
    pub node: &'a ReportTree,
    pub parent: Option<&'a ReportTree>,
    pub depth: usize,
}

/// Iterative pre-order traversal; deep trees do not grow the call stack.
pub struct PreOrder<'a> {
    stack: Vec<TreeVisit<'a>>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = TreeVisit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let visit = self.stack.pop()?;
        // Push children in reverse so the first child is visited next.
        for child in visit.node.sub_reports.iter().rev() {
            self.stack.push(TreeVisit {
                node: child,
                parent: Some(visit.node),
                depth: visit.depth + 1,
            });
        }
        Some(visit)
    }
}

// =============================================================================
// Mapping
// =============================================================================

/// Map a canonical report into a `ReportTree`.
///
/// Post-order: children are mapped first, pure log leaves contribute their
/// severities and are then dropped. A root whose message is the reserved
/// global label is tagged [`ReportKind::Global`].
pub fn map_report_to_tree(report: &Report) -> ReportTree {
    let mut root = map_node(report);
    if root.message == GLOBAL_REPORT_LABEL {
        root.kind = ReportKind::Global;
    }
    tracing::debug!(
        root = %root.id,
        kind = ?root.kind,
        highest = %root.highest_severity.name,
        "Report mapped to tree"
    );
    root
}

fn map_node(report: &Report) -> ReportTree {
    let mut child_severities: Vec<SeverityName> = Vec::new();
    let mut child_highest = SeverityName::Unknown;
    let mut sub_reports = Vec::with_capacity(report.sub_reports.len());

    for child in &report.sub_reports {
        if child.is_log_leaf() {
            child_severities.extend_from_slice(&child.severities);
            child_highest = child_highest.max(highest_severity(child.severities.iter().copied()).name);
        } else {
            let mapped = map_node(child);
            child_severities.extend_from_slice(&mapped.severities);
            child_highest = child_highest.max(mapped.highest_severity.name);
            sub_reports.push(mapped);
        }
    }

    let severities = if report.severities.is_empty() {
        child_severities.sort();
        child_severities.dedup();
        child_severities
    } else {
        report.severities.clone()
    };

    let own_highest = highest_severity(severities.iter().copied()).name;

    ReportTree {
        id: report.id.clone().unwrap_or_else(generate_report_id),
        message: report.message.clone(),
        parent_id: report.parent_id.clone(),
        severities,
        highest_severity: own_highest.max(child_highest).record(),
        kind: ReportKind::Node,
        sub_reports,
    }
}

fn generate_report_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// Id index
// =============================================================================

/// Index entry for one tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Structural parent in the mapped tree (`None` for the root).
    pub parent: Option<String>,
    pub depth: usize,
    pub kind: ReportKind,
}

/// id -> node metadata, built by a single pre-order traversal.
///
/// Owned next to the tree it indexes and rebuilt whenever that tree changes.
#[derive(Debug, Clone, Default)]
pub struct ReportIndex {
    entries: HashMap<String, IndexEntry>,
    root_id: String,
}

impl ReportIndex {
    pub fn build(tree: &ReportTree) -> Self {
        let mut entries = HashMap::new();
        for visit in tree.pre_order() {
            let entry = IndexEntry {
                parent: visit.parent.map(|p| p.id.clone()),
                depth: visit.depth,
                kind: visit.node.kind,
            };
            if entries.insert(visit.node.id.clone(), entry).is_some() {
                tracing::warn!(id = %visit.node.id, "Duplicate report id; last occurrence wins");
            }
        }
        Self {
            entries,
            root_id: tree.id.clone(),
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn get(&self, id: &str) -> Option<&IndexEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn kind_of(&self, id: &str) -> Option<ReportKind> {
        self.entries.get(id).map(|e| e.kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ancestors of `id`, nearest parent first, ending at the root.
    ///
    /// Empty for the root and for ids not in the index. The walk is bounded
    /// by the index size so duplicated ids can never loop forever.
    pub fn ancestors(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut current = self.entries.get(id).and_then(|e| e.parent.as_deref());
        while let Some(parent) = current {
            if out.len() >= self.entries.len() {
                tracing::warn!(id, "Ancestor walk exceeded index size; stopping");
                break;
            }
            out.push(parent.to_string());
            current = self.entries.get(parent).and_then(|e| e.parent.as_deref());
        }
        out
    }
}
