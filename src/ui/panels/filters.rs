// ReportScope - ui/panels/filters.rs
//
// Filter bar above the log table: one checkbox per severity present in the
// report, quick select buttons, and the debounced text filter.

use crate::app::state::ReportViewer;
use crate::ui::theme;
use std::time::Instant;

/// Render the filter bar.
pub fn render(ui: &mut egui::Ui, viewer: &mut ReportViewer) {
    ui.horizontal_wrapped(|ui| {
        ui.label("Severity:");

        let entries: Vec<_> = viewer.checklist().iter().collect();
        if entries.is_empty() {
            ui.label(egui::RichText::new("none in report").weak());
        }
        for (name, checked) in entries {
            let mut value = checked;
            let text = egui::RichText::new(name.as_str())
                .color(theme::severity_colour(name.record()));
            if ui.checkbox(&mut value, text).changed() {
                viewer.set_severity(name, value);
            }
        }

        ui.separator();
        if ui.small_button("All").clicked() {
            viewer.set_all_severities(true);
        }
        if ui.small_button("None").clicked() {
            viewer.set_all_severities(false);
        }
        if ui
            .small_button("Reset")
            .on_hover_text("Default severities, no text filter")
            .clicked()
        {
            viewer.reset_filters();
        }

        ui.separator();
        let mut text = viewer.text_query().to_string();
        let response = ui.add(
            egui::TextEdit::singleline(&mut text)
                .hint_text("Filter messages")
                .desired_width(200.0),
        );
        if response.changed() {
            viewer.set_text_filter(&text, Instant::now());
        }
    });
}
