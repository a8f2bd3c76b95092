// ReportScope - ui/panels/about.rs
//
// About dialog: centred, non-resizable, non-collapsible window.

use crate::util::constants::{APP_NAME, APP_VERSION};

/// Render the About dialog while `open` is true.
pub fn render(ctx: &egui::Context, open: &mut bool) {
    if !*open {
        return;
    }

    egui::Window::new(format!("About {APP_NAME}"))
        .open(open)
        .collapsible(false)
        .resizable(false)
        .min_width(320.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.add_space(8.0);
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new(APP_NAME).size(26.0).strong());
                ui.add_space(4.0);
                ui.label(egui::RichText::new(format!("v{APP_VERSION}")).size(14.0).weak());
            });

            ui.add_space(10.0);
            ui.separator();
            ui.add_space(6.0);

            ui.vertical_centered(|ui| {
                ui.label("Hierarchical report and log viewer");
                ui.label("for power-grid study diagnostics.");
            });

            ui.add_space(8.0);
            ui.separator();
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("Built with Rust & egui").small().weak());
            });
            ui.add_space(6.0);
        });
}
