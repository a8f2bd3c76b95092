// ReportScope - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading and logging initialisation
// 3. Session restore
// 4. eframe GUI launch

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export the library modules so `gui.rs` can use `crate::app::...` etc.
pub use reportscope::app;
pub use reportscope::core;
pub use reportscope::platform;
pub use reportscope::ui;
pub use reportscope::util;

use app::state::{FetchFailurePolicy, ReselectPolicy, ViewerSettings};
use clap::Parser;
use platform::config::{AppConfig, PlatformPaths};
use std::path::PathBuf;
use std::time::Duration;

/// ReportScope - hierarchical report and log viewer.
///
/// Opens a study report (JSON) as a severity-aggregated tree with a
/// filterable, searchable log table for the selected node.
#[derive(Parser, Debug)]
#[command(name = "ReportScope", version, about)]
struct Cli {
    /// Report JSON file to open (the last report is reopened if omitted).
    report: Option<PathBuf>,

    /// Report type under which the severity filter is persisted.
    #[arg(short = 't', long = "report-type")]
    report_type: Option<String>,

    /// Directory holding config.toml and session.json.
    #[arg(short = 'c', long = "config-dir")]
    config_dir: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn viewer_settings(config: &AppConfig, report_type: Option<String>) -> ViewerSettings {
    ViewerSettings {
        search_debounce: Duration::from_millis(config.search_debounce_ms),
        reselect_policy: if config.reset_on_reselect {
            ReselectPolicy::Always
        } else {
            ReselectPolicy::OnChange
        },
        fetch_failure: if config.clear_logs_on_failure {
            FetchFailurePolicy::Clear
        } else {
            FetchFailurePolicy::KeepPrevious
        },
        report_type: report_type.unwrap_or_else(|| config.report_type.clone()),
    }
}

fn main() {
    let cli = Cli::parse();

    let paths = match cli.config_dir.as_deref() {
        Some(dir) => PlatformPaths::in_dir(dir),
        None => PlatformPaths::resolve(),
    };
    let (config, warnings) = platform::config::load_config(&paths.config_dir);

    util::logging::init(
        cli.debug,
        config.log_level.as_deref(),
        config.log_file.as_deref(),
    );
    for warning in &warnings {
        tracing::warn!(warning = %warning, "Configuration warning");
    }

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config_dir = %paths.config_dir.display(),
        "ReportScope starting"
    );

    let settings = viewer_settings(&config, cli.report_type.clone());
    let session_path = app::session::session_path(&paths.data_dir);
    let session = app::session::load(&session_path).unwrap_or_else(app::session::SessionData::new);
    let initial_report = cli.report.clone().or_else(|| session.last_report.clone());

    let dark_mode = config.dark_mode;
    let font_size = config.font_size;
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION
            ))
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |cc| {
            ui::theme::apply(&cc.egui_ctx, dark_mode, font_size);
            let mut app = gui::ReportScopeApp::new(settings, session, session_path, dark_mode)
                .with_warnings(&warnings);
            if let Some(path) = initial_report {
                app.open_report(&path, &cc.egui_ctx);
            }
            Ok(Box::new(app))
        }),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch ReportScope GUI: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override_wins_over_configured_report_type() {
        let config = AppConfig {
            report_type: "security".to_string(),
            reset_on_reselect: true,
            ..AppConfig::default()
        };
        let settings = viewer_settings(&config, Some("study".to_string()));
        assert_eq!(settings.report_type, "study");
        assert_eq!(settings.reselect_policy, ReselectPolicy::Always);
        assert_eq!(settings.fetch_failure, FetchFailurePolicy::KeepPrevious);
    }
}
