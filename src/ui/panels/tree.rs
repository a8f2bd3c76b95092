// ReportScope - ui/panels/tree.rs
//
// Report tree sidebar: search bar plus a virtualized row list.
//
// Rows have a fixed height, so only the rows inside the viewport are laid
// out (`RowWindow::visible_range`). Clicks are collected during rendering and
// applied afterwards so the viewer is not mutated while its rows are borrowed.

use crate::app::state::ReportViewer;
use crate::core::projection::{ReportRow, RowWindow};
use crate::core::search::SearchDirection;
use crate::ui::theme;
use std::time::Instant;

enum TreeAction {
    Select(String),
    Toggle(String),
}

/// Render the tree sidebar.
pub fn render(ui: &mut egui::Ui, viewer: &mut ReportViewer, dark_mode: bool) {
    search_bar(ui, viewer);
    ui.separator();

    let window = RowWindow::new(theme::ROW_HEIGHT);
    let total = viewer.rows().len();
    let viewport_height = ui.available_height();

    let mut area = egui::ScrollArea::vertical()
        .id_salt("report_tree")
        .auto_shrink([false; 2]);
    if let Some(index) = viewer.take_tree_scroll_target() {
        area = area.vertical_scroll_offset(window.centered_offset(index, viewport_height, total));
    }

    let mut action: Option<TreeAction> = None;
    let current_match = viewer.tree_search().current_target();

    area.show_viewport(ui, |ui, viewport| {
        ui.set_height(window.row_height * total as f32);
        let origin = ui.max_rect().min;
        let width = ui.available_width();

        for index in window.visible_range(viewport.min.y, viewport.height(), total) {
            let Some(row) = viewer.rows().get(index) else {
                continue;
            };
            let rect = egui::Rect::from_min_size(
                egui::pos2(origin.x, origin.y + index as f32 * window.row_height),
                egui::vec2(width, window.row_height),
            );

            let background = if current_match == Some(index) {
                Some(theme::CURRENT_MATCH_BG)
            } else if viewer.tree_search().is_match(index) {
                Some(theme::MATCH_BG)
            } else if viewer.is_highlighted(&row.id) {
                Some(theme::HIGHLIGHT_BG)
            } else {
                None
            };
            if let Some(colour) = background {
                ui.painter().rect_filled(rect, 0.0, colour);
            }

            ui.allocate_new_ui(egui::UiBuilder::new().max_rect(rect), |ui| {
                if let Some(a) = render_row(ui, row, dark_mode) {
                    action = Some(a);
                }
            });
        }
    });

    match action {
        Some(TreeAction::Select(id)) => {
            viewer.select_report(&id);
        }
        Some(TreeAction::Toggle(id)) => {
            viewer.toggle(&id);
        }
        None => {}
    }
}

fn render_row(ui: &mut egui::Ui, row: &ReportRow, dark_mode: bool) -> Option<TreeAction> {
    let mut action = None;
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 4.0;
        ui.add_space(row.depth as f32 * theme::INDENT_WIDTH);

        // Expand/collapse affordance; a label click only selects.
        if row.is_leaf {
            ui.add_space(theme::INDENT_WIDTH);
        } else {
            let glyph = if row.collapsed { "\u{25b6}" } else { "\u{25bc}" };
            let toggle = ui.add(
                egui::Button::new(egui::RichText::new(glyph).size(9.0))
                    .frame(false)
                    .min_size(egui::vec2(theme::INDENT_WIDTH, theme::ROW_HEIGHT)),
            );
            if toggle.clicked() {
                action = Some(TreeAction::Toggle(row.id.clone()));
            }
        }

        let (dot, _) = ui.allocate_exact_size(
            egui::vec2(theme::SEVERITY_DOT_RADIUS * 2.0, theme::ROW_HEIGHT),
            egui::Sense::hover(),
        );
        ui.painter().circle_filled(
            dot.center(),
            theme::SEVERITY_DOT_RADIUS,
            theme::severity_colour(row.severity),
        );

        let label = egui::RichText::new(&row.label).color(theme::row_text_colour(dark_mode));
        let response = ui
            .selectable_label(row.is_selected, label)
            .on_hover_text(format!("{} \u{00b7} {}", row.severity.name, row.id));
        if response.clicked() {
            action = Some(TreeAction::Select(row.id.clone()));
        }
    });
    action
}

fn search_bar(ui: &mut egui::Ui, viewer: &mut ReportViewer) {
    ui.horizontal(|ui| {
        let mut query = viewer.tree_query().to_string();
        let response = ui.add(
            egui::TextEdit::singleline(&mut query)
                .hint_text("Search reports")
                .desired_width(ui.available_width() - 110.0),
        );
        if response.changed() {
            viewer.set_tree_search_term(&query, Instant::now());
        }
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            viewer.run_tree_search();
        }

        if ui.small_button("\u{25b2}").on_hover_text("Previous match").clicked() {
            viewer.step_tree_search(SearchDirection::Previous);
        }
        if ui.small_button("\u{25bc}").on_hover_text("Next match").clicked() {
            viewer.step_tree_search(SearchDirection::Next);
        }
        ui.label(
            egui::RichText::new(viewer.tree_search().position_label())
                .small()
                .weak(),
        );
    });
}
