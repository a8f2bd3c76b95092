// ReportScope - ui/panels/status.rs
//
// Status bar: the shell's status message on the left, the most recent viewer
// notifications on the right.

use crate::app::state::{NotificationLevel, ReportViewer};
use crate::ui::theme;
use crate::util::constants::VISIBLE_NOTIFICATIONS;

/// Render the status bar contents.
pub fn render(ui: &mut egui::Ui, status: &str, viewer: Option<&mut ReportViewer>) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(status).small());

        let Some(viewer) = viewer else {
            return;
        };

        ui.separator();
        ui.label(
            egui::RichText::new(format!(
                "{} nodes \u{00b7} selected {}",
                viewer.index().len(),
                viewer.selected()
            ))
            .small()
            .weak(),
        );

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let mut clear = false;
            if viewer.notifications().next().is_some()
                && ui.small_button("\u{2715}").on_hover_text("Dismiss").clicked()
            {
                clear = true;
            }
            for note in viewer.notifications().rev().take(VISIBLE_NOTIFICATIONS) {
                let colour = match note.level {
                    NotificationLevel::Error => theme::STATUS_ERROR,
                    NotificationLevel::Warning => theme::STATUS_WARNING,
                    NotificationLevel::Info => ui.visuals().text_color(),
                };
                ui.label(egui::RichText::new(&note.message).small().color(colour));
            }
            if clear {
                viewer.clear_notifications();
            }
        });
    });
}
