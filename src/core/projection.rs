// ReportScope - core/projection.rs
//
// Flattens the expanded part of a ReportTree into the linear row list that
// the virtualized tree panel renders. Rows have a fixed height so the
// visible window and the scroll offset of any row are O(1) to compute.

use crate::core::severity::Severity;
use crate::core::tree::{ReportKind, ReportTree};
use std::collections::HashSet;
use std::ops::Range;

/// One rendered line of the tree panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub id: String,
    pub label: String,
    pub depth: usize,
    pub is_leaf: bool,
    pub severity: &'static Severity,
    /// Has children that are currently hidden.
    pub collapsed: bool,
    pub is_selected: bool,
    pub kind: ReportKind,
}

/// Pre-order projection of every node reachable through expanded nodes.
///
/// Collapsed nodes are emitted; their subtree is not.
pub fn project(
    tree: &ReportTree,
    expanded: &HashSet<String>,
    selected: Option<&str>,
) -> Vec<ReportRow> {
    let mut rows = Vec::new();
    let mut stack: Vec<(&ReportTree, usize)> = vec![(tree, 0)];

    while let Some((node, depth)) = stack.pop() {
        let is_expanded = expanded.contains(&node.id);
        rows.push(ReportRow {
            id: node.id.clone(),
            label: node.message.clone(),
            depth,
            is_leaf: node.is_leaf(),
            severity: node.highest_severity,
            collapsed: !node.is_leaf() && !is_expanded,
            is_selected: selected == Some(node.id.as_str()),
            kind: node.kind,
        });
        if is_expanded {
            for child in node.sub_reports.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }
    rows
}

/// Position of the row with `id`, if it is currently projected.
pub fn row_index_of(rows: &[ReportRow], id: &str) -> Option<usize> {
    rows.iter().position(|row| row.id == id)
}

// =============================================================================
// Fixed-height row window
// =============================================================================

/// Scroll geometry for a list of fixed-height rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowWindow {
    pub row_height: f32,
}

impl RowWindow {
    pub fn new(row_height: f32) -> Self {
        Self {
            row_height: row_height.max(1.0),
        }
    }

    /// Rows intersecting the viewport `[offset, offset + viewport_height)`.
    pub fn visible_range(&self, offset: f32, viewport_height: f32, total: usize) -> Range<usize> {
        let first = ((offset.max(0.0) / self.row_height).floor() as usize).min(total);
        let visible = (viewport_height.max(0.0) / self.row_height).ceil() as usize + 1;
        first..(first + visible).min(total)
    }

    /// Scroll offset that places row `index` in the middle of the viewport,
    /// clamped to the scrollable extent.
    pub fn centered_offset(&self, index: usize, viewport_height: f32, total: usize) -> f32 {
        let content = total as f32 * self.row_height;
        let max_offset = (content - viewport_height).max(0.0);
        let row_centre = (index as f32 + 0.5) * self.row_height;
        (row_centre - viewport_height / 2.0).clamp(0.0, max_offset)
    }
}

// =============================================================================
// One-shot scroll lock
// =============================================================================

/// Delivers a scroll-into-view request exactly once per arm.
///
/// Re-renders while the same target stays highlighted do not scroll again;
/// only a new `arm` call does.
#[derive(Debug, Clone, Default)]
pub struct ScrollLock {
    pending: Option<String>,
}

impl ScrollLock {
    pub fn arm(&mut self, id: impl Into<String>) {
        self.pending = Some(id.into());
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Row index to scroll to, consumed on success.
    ///
    /// If the target is not among `rows` yet the lock stays armed so the
    /// next projection can satisfy it.
    pub fn take(&mut self, rows: &[ReportRow]) -> Option<usize> {
        let index = row_index_of(rows, self.pending.as_deref()?)?;
        self.pending = None;
        Some(index)
    }
}
