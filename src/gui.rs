// ReportScope - gui.rs
//
// Top-level eframe::App implementation.
// Wires the panels to the report viewer and owns the session.

use crate::app::session::{self, SessionData};
use crate::app::state::{ReportViewer, SelectionChange, ViewerSettings};
use crate::core::export;
use crate::platform;
use crate::ui;
use crate::util::constants::APP_NAME;
use crate::util::error::Result;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
enum ExportFormat {
    Csv,
    Json,
}

fn write_export(viewer: &ReportViewer, format: ExportFormat, dest: &Path) -> Result<usize> {
    let file = platform::fs::create_export_file(dest)?;
    let count = match format {
        ExportFormat::Csv => export::export_csv(viewer.logs(), file, dest)?,
        ExportFormat::Json => export::export_json(viewer.logs(), file, dest)?,
    };
    Ok(count)
}

/// The ReportScope application.
pub struct ReportScopeApp {
    viewer: Option<ReportViewer>,
    report_path: Option<PathBuf>,
    settings: ViewerSettings,
    session: SessionData,
    session_path: PathBuf,
    status_message: String,
    dark_mode: bool,
    show_about: bool,
}

impl ReportScopeApp {
    pub fn new(
        settings: ViewerSettings,
        session: SessionData,
        session_path: PathBuf,
        dark_mode: bool,
    ) -> Self {
        Self {
            viewer: None,
            report_path: None,
            settings,
            session,
            session_path,
            status_message: "Ready. Open a report via File \u{2192} Open Report.".to_string(),
            dark_mode,
            show_about: false,
        }
    }

    /// Show startup warnings (e.g. config validation) in the status bar.
    pub fn with_warnings(mut self, warnings: &[String]) -> Self {
        if let Some(first) = warnings.first() {
            self.status_message = if warnings.len() == 1 {
                first.clone()
            } else {
                format!("{first} (+{} more warnings)", warnings.len() - 1)
            };
        }
        self
    }

    /// Load a report file and replace the current viewer.
    ///
    /// A failure keeps the current viewer and reports the error in the
    /// status bar.
    pub fn open_report(&mut self, path: &Path, ctx: &egui::Context) {
        let report = match platform::fs::read_report_file(path) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot open report");
                self.status_message = format!("Cannot open report: {e}");
                return;
            }
        };

        let saved = self.session.severity_filter(&self.settings.report_type);
        let mut viewer = ReportViewer::from_report(&report, self.settings.clone(), saved);

        // Highlight changes come from log-row clicks; repaint right away.
        let repaint_ctx = ctx.clone();
        viewer
            .highlight_mut()
            .subscribe(Box::new(move |_| repaint_ctx.request_repaint()));
        viewer.set_selection_listener(Box::new(|change: &SelectionChange| {
            tracing::info!(id = %change.id, kind = ?change.kind, "Report selection changed");
        }));

        self.status_message = format!(
            "Loaded '{}': {} report nodes.",
            path.display(),
            viewer.index().len()
        );
        self.viewer = Some(viewer);
        self.report_path = Some(path.to_path_buf());
        self.session.last_report = Some(path.to_path_buf());
        self.save_session();
    }

    fn export(&mut self, format: ExportFormat) {
        let Some(viewer) = self.viewer.as_ref() else {
            return;
        };
        let (label, extension) = match format {
            ExportFormat::Csv => ("CSV", "csv"),
            ExportFormat::Json => ("JSON", "json"),
        };
        let Some(dest) = rfd::FileDialog::new()
            .add_filter(label, &[extension])
            .set_file_name(format!("logs.{extension}"))
            .save_file()
        else {
            return;
        };

        self.status_message = match write_export(viewer, format, &dest) {
            Ok(n) => format!("Exported {n} logs to {label}."),
            Err(e) => {
                tracing::warn!(error = %e, "Export failed");
                format!("{label} export failed: {e}")
            }
        };
    }

    fn save_session(&self) {
        if let Err(e) = session::save(&self.session, &self.session_path) {
            tracing::warn!(error = %e, "Failed to save session");
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open Report\u{2026}").clicked() {
                    ui.close_menu();
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Report", &["json"])
                        .pick_file()
                    {
                        self.open_report(&path, ctx);
                    }
                }
                let reload = self.report_path.clone();
                ui.add_enabled_ui(reload.is_some(), |ui| {
                    if ui.button("Reload").clicked() {
                        ui.close_menu();
                        if let Some(path) = reload {
                            self.open_report(&path, ctx);
                        }
                    }
                });
                ui.separator();

                let has_logs = self.viewer.as_ref().is_some_and(|v| !v.logs().is_empty());
                ui.add_enabled_ui(has_logs, |ui| {
                    ui.menu_button("Export", |ui| {
                        if ui.button("Export CSV\u{2026}").clicked() {
                            ui.close_menu();
                            self.export(ExportFormat::Csv);
                        }
                        if ui.button("Export JSON\u{2026}").clicked() {
                            ui.close_menu();
                            self.export(ExportFormat::Json);
                        }
                    });
                });
                ui.separator();
                if ui.button("Exit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });
            ui.menu_button("View", |ui| {
                if ui.checkbox(&mut self.dark_mode, "Dark mode").changed() {
                    ctx.set_visuals(if self.dark_mode {
                        egui::Visuals::dark()
                    } else {
                        egui::Visuals::light()
                    });
                }
                if ui.button("About").clicked() {
                    self.show_about = true;
                    ui.close_menu();
                }
            });
        });
    }
}

impl eframe::App for ReportScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        if let Some(viewer) = self.viewer.as_mut() {
            if viewer.tick(now) {
                ctx.request_repaint();
            }
            if let Some((report_type, checked)) = viewer.take_filter_to_persist() {
                self.session.set_severity_filter(&report_type, checked);
                if let Err(e) = session::save(&self.session, &self.session_path) {
                    tracing::warn!(error = %e, "Failed to save session");
                }
            }
            if let Some(wait) = viewer.next_wakeup(now) {
                ctx.request_repaint_after(wait);
            }
        }

        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::O)) {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("Report", &["json"])
                .pick_file()
            {
                self.open_report(&path, ctx);
            }
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.menu_bar(ctx, ui);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui::panels::status::render(ui, &self.status_message, self.viewer.as_mut());
        });

        let dark_mode = self.dark_mode;
        match self.viewer.as_mut() {
            Some(viewer) => {
                egui::SidePanel::left("report_tree_panel")
                    .default_width(ui::theme::SIDEBAR_WIDTH)
                    .resizable(true)
                    .show(ctx, |ui| {
                        ui::panels::tree::render(ui, viewer, dark_mode);
                    });
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui::panels::filters::render(ui, viewer);
                    ui.separator();
                    ui::panels::logs::render(ui, viewer, dark_mode);
                });
            }
            None => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.centered_and_justified(|ui| {
                        ui.label(format!(
                            "{APP_NAME}\n\nOpen a report via File \u{2192} Open Report (Ctrl+O)."
                        ));
                    });
                });
            }
        }

        ui::panels::about::render(ctx, &mut self.show_about);
    }

    /// Save the session so the next launch can restore it.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.save_session();
    }
}
