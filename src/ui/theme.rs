// ReportScope - ui/theme.rs
//
// Severity colour tokens, row tints and layout constants.
// No dependencies on app state or business logic.

use crate::core::severity::Severity;
use egui::Color32;

/// Resolve a severity colour token (CSS colour name) to a colour.
/// Unknown tokens fall back to grey.
pub fn token_colour(token: &str) -> Color32 {
    match token.to_ascii_lowercase().as_str() {
        "cadetblue" => Color32::from_rgb(95, 158, 160),
        "sienna" => Color32::from_rgb(160, 82, 45),
        "mediumseagreen" => Color32::from_rgb(60, 179, 113),
        "cornflowerblue" => Color32::from_rgb(100, 149, 237),
        "orange" => Color32::from_rgb(255, 165, 0),
        "crimson" => Color32::from_rgb(220, 20, 60),
        "mediumorchid" => Color32::from_rgb(186, 85, 211),
        _ => Color32::GRAY,
    }
}

pub fn severity_colour(severity: &Severity) -> Color32 {
    token_colour(severity.colour)
}

/// Foreground for row text: near-white in dark mode, near-black in light.
pub fn row_text_colour(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(229, 231, 235)
    } else {
        Color32::from_rgb(17, 24, 39)
    }
}

/// Tree node revealed by a log-row click.
pub const HIGHLIGHT_BG: Color32 = Color32::from_rgba_premultiplied(251, 191, 36, 40);
/// Any search match.
pub const MATCH_BG: Color32 = Color32::from_rgba_premultiplied(59, 130, 246, 25);
/// The search match the cursor is on.
pub const CURRENT_MATCH_BG: Color32 = Color32::from_rgba_premultiplied(59, 130, 246, 70);

pub const STATUS_ERROR: Color32 = Color32::from_rgb(220, 38, 38);
pub const STATUS_WARNING: Color32 = Color32::from_rgb(217, 119, 6);

/// Layout constants.
pub const SIDEBAR_WIDTH: f32 = 320.0;
pub const ROW_HEIGHT: f32 = 20.0;
pub const INDENT_WIDTH: f32 = 14.0;
pub const SEVERITY_DOT_RADIUS: f32 = 4.0;

/// Apply dark/light visuals and the body font size.
pub fn apply(ctx: &egui::Context, dark_mode: bool, font_size: f32) {
    ctx.set_visuals(if dark_mode {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    });
    ctx.style_mut(|style| {
        for (text_style, font) in style.text_styles.iter_mut() {
            match text_style {
                egui::TextStyle::Body | egui::TextStyle::Button | egui::TextStyle::Monospace => {
                    font.size = font_size;
                }
                egui::TextStyle::Small => font.size = font_size * 0.8,
                _ => {}
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::severity::SEVERITIES;

    #[test]
    fn test_every_severity_token_resolves() {
        for severity in &SEVERITIES {
            assert_ne!(severity_colour(severity), Color32::GRAY, "{}", severity.colour);
        }
        assert_eq!(token_colour("not-a-colour"), Color32::GRAY);
    }
}
