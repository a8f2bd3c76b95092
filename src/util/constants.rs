// ReportScope - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "ReportScope";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "ReportScope";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Report ingestion
// =============================================================================

/// Message carried by the synthetic root that merges several top-level
/// reports into one tree. A mapped root with this message is a "global"
/// report and its logs are requested through the global fetch route.
pub const GLOBAL_REPORT_LABEL: &str = "Logs";

/// Report type used when neither the CLI nor config.toml names one.
/// Only used to key the persisted severity filter and route fetches.
pub const DEFAULT_REPORT_TYPE: &str = "study";

/// Maximum size of a report JSON file accepted from disk.
pub const MAX_REPORT_FILE_SIZE: u64 = 256 * 1024 * 1024; // 256 MB

// =============================================================================
// Search & filter input
// =============================================================================

/// Debounce delay in milliseconds for search and text filter input.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

/// Minimum user-configurable debounce delay (ms).
pub const MIN_SEARCH_DEBOUNCE_MS: u64 = 50;

/// Maximum user-configurable debounce delay (ms).
pub const MAX_SEARCH_DEBOUNCE_MS: u64 = 5_000;

// =============================================================================
// Notifications
// =============================================================================

/// Maximum number of user-visible notifications kept at once.
/// Oldest notifications are dropped first.
pub const MAX_NOTIFICATIONS: usize = 50;

/// Number of notifications shown in the status area.
pub const VISIBLE_NOTIFICATIONS: usize = 3;

// =============================================================================
// Export
// =============================================================================

/// Maximum number of logs that can be exported in a single operation.
pub const MAX_EXPORT_LOGS: usize = 5_000_000;

// =============================================================================
// UI defaults
// =============================================================================

/// Default UI body font size in points.
pub const DEFAULT_FONT_SIZE: f32 = 14.5;

/// Minimum user-configurable UI font size (points).
pub const MIN_FONT_SIZE: f32 = 10.0;

/// Maximum user-configurable UI font size (points).
pub const MAX_FONT_SIZE: f32 = 24.0;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Session persistence file name (stored in the platform data directory).
pub const SESSION_FILE_NAME: &str = "session.json";
