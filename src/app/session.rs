// ReportScope - app/session.rs
//
// Session persistence: the severity checklist chosen for each report type and
// the last opened report, kept between application restarts.
//
// - Saved atomically (write temp, rename final) so a crash during save never
//   corrupts the previous good session.
// - Load errors are discarded; a corrupt or incompatible session starts fresh.
// - Logs and tree state are NOT persisted. The report is re-read on restore.

use crate::core::severity::SeverityName;
use crate::util::constants::SESSION_FILE_NAME;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Version stamp. Mismatches silently discard the session.
pub const SESSION_VERSION: u32 = 1;

// =============================================================================
// On-disk data structures
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    pub version: u32,

    /// Report opened last; reopened at startup when no path is given.
    #[serde(default)]
    pub last_report: Option<PathBuf>,

    /// Checked severities keyed by report type (e.g. "study", "security").
    /// A stored empty list means "nothing checked", not "no preference".
    #[serde(default)]
    pub severity_filters: BTreeMap<String, Vec<SeverityName>>,
}

impl SessionData {
    pub fn new() -> Self {
        Self {
            version: SESSION_VERSION,
            ..Default::default()
        }
    }

    pub fn severity_filter(&self, report_type: &str) -> Option<&[SeverityName]> {
        self.severity_filters.get(report_type).map(Vec::as_slice)
    }

    pub fn set_severity_filter<I>(&mut self, report_type: &str, checked: I)
    where
        I: IntoIterator<Item = SeverityName>,
    {
        self.severity_filters
            .insert(report_type.to_string(), checked.into_iter().collect());
    }
}

// =============================================================================
// I/O helpers
// =============================================================================

pub fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE_NAME)
}

/// Save `data` to `path` atomically (write temp, rename).
///
/// Returns a descriptive error string; callers log it and carry on.
pub fn save(data: &SessionData, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            format!(
                "cannot create session directory '{}': {e}",
                parent.display()
            )
        })?;
    }

    let json = serde_json::to_string_pretty(data)
        .map_err(|e| format!("failed to serialise session: {e}"))?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json.as_bytes())
        .map_err(|e| format!("failed to write session temp file '{}': {e}", tmp.display()))?;

    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        format!("failed to finalise session file '{}': {e}", path.display())
    })?;

    tracing::debug!(path = %path.display(), "Session saved");
    Ok(())
}

/// Load a session from `path`. `None` means "start fresh".
pub fn load(path: &Path) -> Option<SessionData> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(path = %path.display(), error = %e, "Cannot read session file");
            }
        })
        .ok()?;

    let data: SessionData = serde_json::from_str(&content)
        .map_err(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Session file is malformed, starting fresh"
            );
        })
        .ok()?;

    if data.version != SESSION_VERSION {
        tracing::warn!(
            found = data.version,
            expected = SESSION_VERSION,
            "Session file version mismatch, starting fresh"
        );
        return None;
    }

    tracing::info!(
        path = %path.display(),
        report_types = data.severity_filters.len(),
        "Session file loaded"
    );
    Some(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_data() -> SessionData {
        let mut data = SessionData::new();
        data.last_report = Some(PathBuf::from("/tmp/study.json"));
        data.set_severity_filter("study", [SeverityName::Warn, SeverityName::Error]);
        data.set_severity_filter("security", []);
        data
    }

    #[test]
    fn test_session_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = session_path(dir.path());
        save(&sample_data(), &path).expect("save should succeed");

        let loaded = load(&path).expect("load should return Some after valid save");
        assert_eq!(loaded.version, SESSION_VERSION);
        assert_eq!(loaded.last_report, Some(PathBuf::from("/tmp/study.json")));
        assert_eq!(
            loaded.severity_filter("study"),
            Some(&[SeverityName::Warn, SeverityName::Error][..])
        );
        // Explicitly empty is remembered, distinct from unknown.
        assert_eq!(loaded.severity_filter("security"), Some(&[][..]));
        assert_eq!(loaded.severity_filter("other"), None);
    }

    #[test]
    fn test_session_load_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(load(&dir.path().join("nonexistent.json")).is_none());
    }

    #[test]
    fn test_session_load_malformed_json_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not valid json {{{{").unwrap();
        assert!(load(&path).is_none());
    }

    #[test]
    fn test_session_load_wrong_version_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let mut data = sample_data();
        data.version = 99;
        save(&data, &path).unwrap();
        assert!(load(&path).is_none());
    }

    #[test]
    fn test_session_save_overwrites_leftover_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        save(&sample_data(), &path).unwrap();
        std::fs::write(path.with_extension("json.tmp"), b"garbage").unwrap();

        let mut updated = sample_data();
        updated.set_severity_filter("study", [SeverityName::Fatal]);
        save(&updated, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.severity_filter("study"), Some(&[SeverityName::Fatal][..]));
        assert!(!path.with_extension("json.tmp").exists());
    }
}
