// ReportScope - core/filter.rs
//
// Severity checklist state and the log filter applied by local log sources.
// Severity and text filters are AND-combined.
// Core layer: pure logic, no I/O or UI dependencies.

use crate::core::severity::{default_severity_filter, SeverityName};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// Severity checklist
// =============================================================================

/// Checkbox state for each severity available in the loaded report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeverityChecklist {
    entries: BTreeMap<SeverityName, bool>,
}

impl SeverityChecklist {
    /// Taxonomy defaults for `available`.
    pub fn defaults(available: &[SeverityName]) -> Self {
        Self {
            entries: default_severity_filter(available),
        }
    }

    /// A previously saved selection, restricted to `available`.
    pub fn from_saved(available: &[SeverityName], saved: &[SeverityName]) -> Self {
        Self {
            entries: available
                .iter()
                .map(|name| (*name, saved.contains(name)))
                .collect(),
        }
    }

    /// Check or uncheck `name`. Returns true if the state changed.
    /// Names not in the checklist are ignored.
    pub fn set(&mut self, name: SeverityName, checked: bool) -> bool {
        match self.entries.get_mut(&name) {
            Some(current) if *current != checked => {
                *current = checked;
                true
            }
            _ => false,
        }
    }

    pub fn is_checked(&self, name: SeverityName) -> bool {
        self.entries.get(&name).copied().unwrap_or(false)
    }

    /// Checked names in taxonomy order.
    pub fn selected(&self) -> BTreeSet<SeverityName> {
        self.entries
            .iter()
            .filter(|(_, checked)| **checked)
            .map(|(name, _)| *name)
            .collect()
    }

    /// All names in the checklist with their state, in taxonomy order.
    pub fn iter(&self) -> impl Iterator<Item = (SeverityName, bool)> + '_ {
        self.entries.iter().map(|(name, checked)| (*name, *checked))
    }

    pub fn available(&self) -> Vec<SeverityName> {
        self.entries.keys().copied().collect()
    }
}

// =============================================================================
// Log filter
// =============================================================================

/// Severity set and case-insensitive text filter for log lines.
///
/// Unlike the checklist UI, an empty severity set matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub severities: BTreeSet<SeverityName>,
    /// Lower-cased substring. Empty = no text filter.
    pub text: String,
}

impl LogFilter {
    pub fn new(severities: BTreeSet<SeverityName>, text: Option<&str>) -> Self {
        Self {
            severities,
            text: text.unwrap_or_default().to_lowercase(),
        }
    }

    pub fn matches(&self, message: &str, severity: SeverityName) -> bool {
        if !self.severities.contains(&severity) {
            return false;
        }
        self.text.is_empty() || message.to_lowercase().contains(&self.text)
    }
}
