// ReportScope - ui/panels/logs.rs
//
// Log table for the selected report: log search bar and a virtual-scrolling
// list (`ScrollArea::show_rows`). Clicking a row reveals and highlights the
// tree node the log belongs to.

use crate::app::state::ReportViewer;
use crate::core::projection::RowWindow;
use crate::core::search::SearchDirection;
use crate::ui::theme;
use egui::text::{LayoutJob, TextFormat};
use std::time::Instant;

/// Render the log table (central area).
pub fn render(ui: &mut egui::Ui, viewer: &mut ReportViewer, dark_mode: bool) {
    search_bar(ui, viewer);
    ui.separator();

    let total = viewer.logs().len();
    if total == 0 {
        ui.centered_and_justified(|ui| {
            if viewer.is_loading() {
                ui.spinner();
            } else if viewer.checklist().selected().is_empty() {
                ui.label("No severity selected.");
            } else {
                ui.label("No logs match the current filters.");
            }
        });
        return;
    }

    let window = RowWindow::new(theme::ROW_HEIGHT);
    let mut area = egui::ScrollArea::vertical()
        .id_salt("log_table")
        .auto_shrink([false; 2]);
    if let Some(index) = viewer.take_log_scroll_target() {
        area = area.vertical_scroll_offset(window.centered_offset(
            index,
            ui.available_height(),
            total,
        ));
    }

    let current_match = viewer.log_search().current_target();
    let body_colour = theme::row_text_colour(dark_mode);
    let mut clicked: Option<usize> = None;

    area.show_rows(ui, window.row_height, total, |ui, row_range| {
        for index in row_range {
            let Some(log) = viewer.logs().get(index) else {
                continue;
            };

            let tint = if current_match == Some(index) {
                Some(theme::CURRENT_MATCH_BG)
            } else if viewer.log_search().is_match(index) {
                Some(theme::MATCH_BG)
            } else {
                None
            };
            if let Some(colour) = tint {
                let rect = egui::Rect::from_min_size(
                    ui.cursor().min,
                    egui::vec2(ui.available_width(), window.row_height),
                );
                ui.painter().rect_filled(rect, 0.0, colour);
            }

            let font = egui::FontId::monospace(12.0);
            let mut job = LayoutJob::default();
            job.append(
                &format!("[{:<5}] ", log.severity.as_str()),
                0.0,
                TextFormat {
                    font_id: font.clone(),
                    color: theme::severity_colour(log.severity_record()),
                    ..Default::default()
                },
            );
            job.append(
                log.message.lines().next().unwrap_or(&log.message),
                0.0,
                TextFormat {
                    font_id: font,
                    color: body_colour,
                    ..Default::default()
                },
            );

            let response = ui.selectable_label(false, job);
            if response.clicked() {
                clicked = Some(index);
            }
            response.on_hover_ui(|ui| {
                ui.label(&log.message);
                if let Some(parent) = &log.parent_id {
                    ui.label(egui::RichText::new(parent).monospace().small().weak());
                }
            });
        }
    });

    if let Some(index) = clicked {
        viewer.on_log_row_clicked(index);
    }
}

fn search_bar(ui: &mut egui::Ui, viewer: &mut ReportViewer) {
    ui.horizontal(|ui| {
        let mut query = viewer.log_query().to_string();
        let response = ui.add(
            egui::TextEdit::singleline(&mut query)
                .hint_text("Search logs")
                .desired_width(240.0),
        );
        if response.changed() {
            viewer.set_log_search_term(&query, Instant::now());
        }
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            viewer.run_log_search();
        }
        if ui.small_button("\u{25b2}").on_hover_text("Previous match").clicked() {
            viewer.step_log_search(SearchDirection::Previous);
        }
        if ui.small_button("\u{25bc}").on_hover_text("Next match").clicked() {
            viewer.step_log_search(SearchDirection::Next);
        }
        ui.label(
            egui::RichText::new(viewer.log_search().position_label())
                .small()
                .weak(),
        );

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(format!("{} logs", viewer.logs().len()));
            if viewer.is_loading() {
                ui.spinner();
            }
        });
    });
}
