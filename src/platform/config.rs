// ReportScope - platform/config.rs
//
// Platform directory resolution and config.toml loading with startup
// validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for ReportScope configuration and data.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/reportscope/)
    pub config_dir: PathBuf,

    /// Data directory; holds session.json.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths, falling back to the current
    /// directory if they cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();
            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );
            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
                data_dir: PathBuf::from("."),
            }
        }
    }

    /// Both config and data under one directory (`--config-dir`).
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            config_dir: dir.to_path_buf(),
            data_dir: dir.to_path_buf(),
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml. Unknown keys are ignored.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub viewer: ViewerSection,
    pub ui: UiSection,
    pub logging: LoggingSection,
}

/// `[viewer]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ViewerSection {
    /// Search and text-filter debounce in ms.
    pub search_debounce_ms: Option<u64>,
    /// "on-change" or "always".
    pub reselect_policy: Option<String>,
    /// "keep" or "clear".
    pub fetch_failure: Option<String>,
    /// Key under which the severity filter is persisted.
    pub report_type: Option<String>,
}

/// `[ui]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// "dark" or "light".
    pub theme: Option<String>,
    pub font_size: Option<f32>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
    /// Log file path (empty = stderr only).
    pub file: Option<String>,
}

/// Validated application configuration.
///
/// Invalid values produce warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Viewer --
    pub search_debounce_ms: u64,
    /// Re-clicking the selected report resets its filters.
    pub reset_on_reselect: bool,
    /// A failed log fetch empties the log table.
    pub clear_logs_on_failure: bool,
    pub report_type: String,

    // -- UI --
    pub dark_mode: bool,
    pub font_size: f32,

    // -- Logging --
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: constants::DEFAULT_SEARCH_DEBOUNCE_MS,
            reset_on_reselect: false,
            clear_logs_on_failure: false,
            report_type: constants::DEFAULT_REPORT_TYPE.to_string(),
            dark_mode: true,
            font_size: constants::DEFAULT_FONT_SIZE,
            log_level: None,
            log_file: None,
        }
    }
}

/// Load and validate `config.toml` from `config_dir`.
///
/// Returns the validated config and a list of non-fatal warnings. A missing
/// file yields defaults with no warnings; an unreadable or unparseable one
/// yields defaults with a warning.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(source) => {
            let err = ConfigError::Io {
                path: config_path.clone(),
                source,
            };
            tracing::warn!(error = %err, "Using default configuration");
            warnings.push(format!("{err}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(source) => {
            let err = ConfigError::TomlParse {
                path: config_path.clone(),
                source,
            };
            tracing::warn!(error = %err, "Using default configuration");
            warnings.push(format!("{err}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");
    let config = validate(raw, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }
    (config, warnings)
}

/// Validate every field, accumulating one warning per rejected value.
pub fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();
    let mut reject = |field: &str, value: String, expected: String| {
        let err = ConfigError::ValueOutOfRange {
            field: field.to_string(),
            value,
            expected,
        };
        warnings.push(format!("{err}. Using default."));
    };

    // -- Viewer: search_debounce_ms --
    if let Some(ms) = raw.viewer.search_debounce_ms {
        if (constants::MIN_SEARCH_DEBOUNCE_MS..=constants::MAX_SEARCH_DEBOUNCE_MS).contains(&ms) {
            config.search_debounce_ms = ms;
        } else {
            reject(
                "viewer.search_debounce_ms",
                ms.to_string(),
                format!(
                    "{}-{}",
                    constants::MIN_SEARCH_DEBOUNCE_MS,
                    constants::MAX_SEARCH_DEBOUNCE_MS
                ),
            );
        }
    }

    // -- Viewer: reselect_policy --
    if let Some(ref policy) = raw.viewer.reselect_policy {
        match policy.to_lowercase().as_str() {
            "on-change" => config.reset_on_reselect = false,
            "always" => config.reset_on_reselect = true,
            other => reject(
                "viewer.reselect_policy",
                other.to_string(),
                "\"on-change\" or \"always\"".to_string(),
            ),
        }
    }

    // -- Viewer: fetch_failure --
    if let Some(ref policy) = raw.viewer.fetch_failure {
        match policy.to_lowercase().as_str() {
            "keep" => config.clear_logs_on_failure = false,
            "clear" => config.clear_logs_on_failure = true,
            other => reject(
                "viewer.fetch_failure",
                other.to_string(),
                "\"keep\" or \"clear\"".to_string(),
            ),
        }
    }

    // -- Viewer: report_type --
    if let Some(ref report_type) = raw.viewer.report_type {
        let trimmed = report_type.trim();
        if trimmed.is_empty() {
            reject(
                "viewer.report_type",
                report_type.clone(),
                "a non-empty name".to_string(),
            );
        } else {
            config.report_type = trimmed.to_string();
        }
    }

    // -- UI: theme --
    if let Some(ref theme) = raw.ui.theme {
        match theme.to_lowercase().as_str() {
            "dark" => config.dark_mode = true,
            "light" => config.dark_mode = false,
            other => reject(
                "ui.theme",
                other.to_string(),
                "\"dark\" or \"light\"".to_string(),
            ),
        }
    }

    // -- UI: font_size --
    if let Some(size) = raw.ui.font_size {
        if (constants::MIN_FONT_SIZE..=constants::MAX_FONT_SIZE).contains(&size) {
            config.font_size = size;
        } else {
            reject(
                "ui.font_size",
                size.to_string(),
                format!("{}-{}", constants::MIN_FONT_SIZE, constants::MAX_FONT_SIZE),
            );
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            reject(
                "logging.level",
                level.clone(),
                valid.join(", "),
            );
        }
    }

    // -- Logging: file --
    if let Some(ref file) = raw.logging.file {
        if !file.is_empty() {
            config.log_file = Some(file.clone());
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) {
        std::fs::write(dir.path().join(constants::CONFIG_FILE_NAME), content).unwrap();
    }

    #[test]
    fn test_missing_config_yields_defaults_without_warnings() {
        let dir = TempDir::new().unwrap();
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_valid_config_is_applied() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            r#"
[viewer]
search_debounce_ms = 150
reselect_policy = "always"
fetch_failure = "clear"
report_type = "security"

[ui]
theme = "light"
font_size = 16.0

[logging]
level = "DEBUG"
file = "/tmp/reportscope.log"
"#,
        );
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.search_debounce_ms, 150);
        assert!(config.reset_on_reselect);
        assert!(config.clear_logs_on_failure);
        assert_eq!(config.report_type, "security");
        assert!(!config.dark_mode);
        assert_eq!(config.font_size, 16.0);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_file.as_deref(), Some("/tmp/reportscope.log"));
    }

    #[test]
    fn test_invalid_values_fall_back_with_one_warning_each() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            r#"
[viewer]
search_debounce_ms = 1
reselect_policy = "sometimes"

[ui]
font_size = 99.0
"#,
        );
        let (config, warnings) = load_config(dir.path());
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("viewer.search_debounce_ms"));
        assert_eq!(config.search_debounce_ms, constants::DEFAULT_SEARCH_DEBOUNCE_MS);
        assert!(!config.reset_on_reselect);
        assert_eq!(config.font_size, constants::DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_unparseable_config_warns_and_uses_defaults() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "[viewer\nsearch_debounce_ms = ");
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("parse error"));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "[future]\nflag = true\n[viewer]\nreport_type = \"study\"\n");
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty());
        assert_eq!(config.report_type, "study");
    }
}
