//! Status bar UI rendering
//!
//! Bottom bar with memory usage, session summary and the cursor readout.

use eframe::egui;
use egui::RichText;

use eegscope::ViewMode;

use crate::app::AppState;
use crate::ui::signal_panel::hover_label;
use crate::utils::{format_memory_mb, format_time_ms, format_time_scale, get_current_memory_mb};

/// Renders the status panel at the bottom of the window
///
/// # Arguments
/// * `ui` - The egui UI context for drawing
/// * `state` - Reference to application state
pub fn render_status_bar(ui: &mut egui::Ui, state: &AppState) {
    ui.horizontal(|ui| {
        let memory_text = format_memory_mb(get_current_memory_mb());
        ui.label(RichText::new(&memory_text).strong());

        if state.session.is_empty() {
            ui.label(RichText::new("| No recording loaded").strong());
            return;
        }

        ui.label(RichText::new("|").strong());
        let recordings = state.session.recordings();
        let longest = recordings
            .iter()
            .map(|r| r.window().duration_ms())
            .fold(0.0, f64::max);
        ui.label(
            RichText::new(format!(
                "Recordings: {} | Longest: {} | Window: {}",
                recordings.len(),
                format_time_ms(longest),
                format_time_scale(state.session.time_scale_ms())
            ))
            .strong(),
        );

        ui.label(RichText::new("|").strong());
        let position = match state.session.view_mode() {
            ViewMode::Paged => format!(
                "Page {} / {}",
                state.session.current_page(),
                state.session.total_page_nb()
            ),
            ViewMode::EventFocused => {
                let index = state.session.browsable_index();
                match state.session.focused_index().and_then(|i| index.get(i)) {
                    Some(entry) => format!(
                        "Event {} / {} | code {} at {} ({})",
                        state.session.focused_index().map(|i| i + 1).unwrap_or(0),
                        index.len(),
                        entry.code,
                        format_time_ms(entry.time_ms),
                        entry.recording
                    ),
                    None => "No browsable event".to_string(),
                }
            }
        };
        ui.label(RichText::new(position).strong());

        if let Some(cursor) = hover_label(state) {
            ui.label(RichText::new("|").strong());
            ui.label(RichText::new(cursor).strong().color(egui::Color32::YELLOW));
        }
    });
}
