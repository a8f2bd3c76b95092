// ReportScope - core/severity.rs
//
// Fixed severity taxonomy shared by the tree, the log list and the filter
// checklist. Pure data and pure functions; unknown names are ignored, never
// reported as errors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Severity names
// =============================================================================

/// Closed set of severity names, declared in level order so the derived
/// `Ord` matches `Severity::level`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeverityName {
    #[default]
    Unknown,
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl SeverityName {
    /// Returns all variants in taxonomy order (lowest level first).
    pub fn all() -> &'static [SeverityName] {
        &[
            SeverityName::Unknown,
            SeverityName::Trace,
            SeverityName::Debug,
            SeverityName::Info,
            SeverityName::Warn,
            SeverityName::Error,
            SeverityName::Fatal,
        ]
    }

    /// Wire spelling, as found in report payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityName::Unknown => "UNKNOWN",
            SeverityName::Trace => "TRACE",
            SeverityName::Debug => "DEBUG",
            SeverityName::Info => "INFO",
            SeverityName::Warn => "WARN",
            SeverityName::Error => "ERROR",
            SeverityName::Fatal => "FATAL",
        }
    }

    /// Parse a wire name, ignoring case and surrounding whitespace.
    /// Returns `None` for names outside the taxonomy.
    pub fn parse(raw: &str) -> Option<SeverityName> {
        let raw = raw.trim();
        SeverityName::all()
            .iter()
            .copied()
            .find(|name| name.as_str().eq_ignore_ascii_case(raw))
    }

    /// The taxonomy record for this name.
    pub fn record(self) -> &'static Severity {
        &SEVERITIES[self as usize]
    }

    pub fn level(self) -> u8 {
        self.record().level
    }
}

impl std::fmt::Display for SeverityName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Taxonomy records
// =============================================================================

/// One taxonomy entry. Exactly one record exists per `SeverityName`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Severity {
    pub name: SeverityName,
    pub level: u8,
    /// Display colour token, resolved to a concrete colour by the UI theme.
    pub colour: &'static str,
    pub displayed_by_default: bool,
}

/// The taxonomy, indexed by `SeverityName as usize`.
pub const SEVERITIES: [Severity; 7] = [
    Severity {
        name: SeverityName::Unknown,
        level: 0,
        colour: "cadetblue",
        displayed_by_default: false,
    },
    Severity {
        name: SeverityName::Trace,
        level: 1,
        colour: "sienna",
        displayed_by_default: false,
    },
    Severity {
        name: SeverityName::Debug,
        level: 2,
        colour: "mediumseagreen",
        displayed_by_default: false,
    },
    Severity {
        name: SeverityName::Info,
        level: 3,
        colour: "cornflowerblue",
        displayed_by_default: true,
    },
    Severity {
        name: SeverityName::Warn,
        level: 4,
        colour: "orange",
        displayed_by_default: true,
    },
    Severity {
        name: SeverityName::Error,
        level: 5,
        colour: "crimson",
        displayed_by_default: true,
    },
    Severity {
        name: SeverityName::Fatal,
        level: 6,
        colour: "mediumorchid",
        displayed_by_default: true,
    },
];

// =============================================================================
// Default filters and aggregation
// =============================================================================

/// Subset of `available` that is displayed by default, in taxonomy order
/// and without duplicates.
pub fn default_severity_list(available: &[SeverityName]) -> Vec<SeverityName> {
    let mut list: Vec<SeverityName> = available
        .iter()
        .copied()
        .filter(|name| name.record().displayed_by_default)
        .collect();
    list.sort();
    list.dedup();
    list
}

/// Initial (and reset) state of the severity checklist: every available
/// name mapped to its default visibility.
pub fn default_severity_filter(available: &[SeverityName]) -> BTreeMap<SeverityName, bool> {
    available
        .iter()
        .map(|name| (*name, name.record().displayed_by_default))
        .collect()
}

/// The record with the highest level among `names`, or UNKNOWN when empty.
pub fn highest_severity<I>(names: I) -> &'static Severity
where
    I: IntoIterator<Item = SeverityName>,
{
    names
        .into_iter()
        .max()
        .unwrap_or(SeverityName::Unknown)
        .record()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_strictly_increasing_in_taxonomy_order() {
        for pair in SEVERITIES.windows(2) {
            assert!(pair[0].level < pair[1].level);
            assert!(pair[0].name < pair[1].name);
        }
        for (idx, name) in SeverityName::all().iter().enumerate() {
            assert_eq!(name.record().name, *name);
            assert_eq!(name.level() as usize, idx);
        }
    }

    #[test]
    fn test_default_visibility_flags() {
        let shown: Vec<_> = SEVERITIES
            .iter()
            .filter(|s| s.displayed_by_default)
            .map(|s| s.name)
            .collect();
        assert_eq!(
            shown,
            vec![
                SeverityName::Info,
                SeverityName::Warn,
                SeverityName::Error,
                SeverityName::Fatal
            ]
        );
    }

    #[test]
    fn test_default_severity_filter_for_visible_slice() {
        let filter = default_severity_filter(&[
            SeverityName::Info,
            SeverityName::Warn,
            SeverityName::Error,
        ]);
        assert_eq!(filter.len(), 3);
        assert!(filter.values().all(|shown| *shown));
    }

    #[test]
    fn test_default_severity_filter_hides_debug() {
        let filter = default_severity_filter(&[SeverityName::Debug, SeverityName::Error]);
        assert_eq!(filter.get(&SeverityName::Debug), Some(&false));
        assert_eq!(filter.get(&SeverityName::Error), Some(&true));
    }

    #[test]
    fn test_default_severity_list_is_in_taxonomy_order() {
        let list = default_severity_list(&[
            SeverityName::Fatal,
            SeverityName::Trace,
            SeverityName::Info,
            SeverityName::Info,
        ]);
        assert_eq!(list, vec![SeverityName::Info, SeverityName::Fatal]);
    }

    #[test]
    fn test_highest_severity_picks_max_level() {
        let highest = highest_severity([SeverityName::Warn, SeverityName::Error, SeverityName::Info]);
        assert_eq!(highest.name, SeverityName::Error);
    }

    #[test]
    fn test_highest_severity_empty_is_unknown() {
        assert_eq!(highest_severity([]).name, SeverityName::Unknown);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(SeverityName::parse(" error "), Some(SeverityName::Error));
        assert_eq!(SeverityName::parse("Fatal"), Some(SeverityName::Fatal));
        assert_eq!(SeverityName::parse("critical"), None);
    }
}
