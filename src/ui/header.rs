//! Header panel UI rendering
//!
//! File and project controls, the shared time scale, page navigation and the
//! paged / event-focused toggle.

use eframe::egui;
use egui::Color32;
use std::path::PathBuf;

use eegscope::{StepDirection, ViewMode};

use crate::app::AppState;
use crate::utils::format_time_scale;

/// Time scales offered in the selector, in milliseconds.
pub const TIME_SCALE_PRESETS: [u64; 9] = [
    1_000, 2_000, 5_000, 10_000, 15_000, 20_000, 30_000, 60_000, 120_000,
];

/// Result of user interaction with the header panel
pub enum HeaderInteraction {
    OpenFileRequested(PathBuf),
    OpenVirtualRecordingRequested,
    OpenProjectRequested(PathBuf),
    SaveProjectRequested(PathBuf),
    TimeScaleSelected(u64),
    PageStep(StepDirection),
    PageRequested(usize),
    ViewModeToggled,
    EventStep(StepDirection),
}

/// Renders the application header.
///
/// # Returns
/// * `Option<HeaderInteraction>` - User interaction result
pub fn render_header(ui: &mut egui::Ui, state: &mut AppState) -> Option<HeaderInteraction> {
    let mut interaction = None;

    ui.horizontal(|ui| {
        if ui.button("📁 Open Recording").clicked() {
            let dialog = file_dialog(state)
                .add_filter("EEG Recordings", &["eegj", "jsonl", "br"]);
            if let Some(path) = dialog.pick_file() {
                interaction = Some(HeaderInteraction::OpenFileRequested(path));
            }
        }

        if ui.button("🔮 Virtual Recording").clicked() {
            interaction = Some(HeaderInteraction::OpenVirtualRecordingRequested);
        }

        ui.separator();

        if ui.button("📂 Open Project").clicked() {
            if let Some(path) = file_dialog(state).add_filter("Projects", &["eegp", "json"]).pick_file() {
                interaction = Some(HeaderInteraction::OpenProjectRequested(path));
            }
        }

        if ui.button("💾 Save Project").clicked() {
            let mut dialog = file_dialog(state).add_filter("Projects", &["eegp", "json"]);
            if let Some(current) = state.project_path.as_ref().and_then(|p| p.file_name()) {
                dialog = dialog.set_file_name(current.to_string_lossy());
            }
            if let Some(path) = dialog.save_file() {
                interaction = Some(HeaderInteraction::SaveProjectRequested(path));
            }
        }

        if state.session.is_empty() {
            return;
        }

        ui.separator();

        let current_scale = state.session.time_scale_ms();
        let mut selected_scale = current_scale;
        egui::ComboBox::from_id_salt("time_scale_selector")
            .selected_text(format_time_scale(current_scale))
            .show_ui(ui, |ui| {
                for preset in TIME_SCALE_PRESETS {
                    ui.selectable_value(&mut selected_scale, preset, format_time_scale(preset));
                }
            });
        if selected_scale != current_scale {
            interaction = Some(HeaderInteraction::TimeScaleSelected(selected_scale));
        }

        ui.separator();

        match state.session.view_mode() {
            ViewMode::Paged => {
                if ui.button("◀").on_hover_text("Previous page (PageUp)").clicked() {
                    interaction = Some(HeaderInteraction::PageStep(StepDirection::Previous));
                }
                let total = state.session.total_page_nb();
                let mut page = state.session.current_page();
                let response = ui.add(
                    egui::DragValue::new(&mut page)
                        .range(1..=total)
                        .prefix("Page "),
                );
                ui.label(format!("/ {}", total));
                if response.changed() {
                    interaction = Some(HeaderInteraction::PageRequested(page));
                }
                if ui.button("▶").on_hover_text("Next page (PageDown)").clicked() {
                    interaction = Some(HeaderInteraction::PageStep(StepDirection::Next));
                }
            }
            ViewMode::EventFocused => {
                if ui.button("◀").on_hover_text("Previous event (Left)").clicked() {
                    interaction = Some(HeaderInteraction::EventStep(StepDirection::Previous));
                }
                let total = state.session.browsable_index().len();
                let current = state.session.focused_index().map(|i| i + 1).unwrap_or(0);
                ui.label(format!("Event {} / {}", current, total));
                if ui.button("▶").on_hover_text("Next event (Right)").clicked() {
                    interaction = Some(HeaderInteraction::EventStep(StepDirection::Next));
                }
            }
        }

        let mut event_mode = state.session.view_mode() == ViewMode::EventFocused;
        if ui
            .checkbox(&mut event_mode, "Event focus")
            .on_hover_text("Center every recording on browsable events (E)")
            .changed()
        {
            interaction = Some(HeaderInteraction::ViewModeToggled);
        }
    });

    if let Some(err) = &state.error_message {
        ui.colored_label(Color32::RED, err);
    }

    interaction
}

fn file_dialog(state: &AppState) -> rfd::FileDialog {
    let dialog = rfd::FileDialog::new();
    match state.settings.dialog_directory() {
        Some(dir) => dialog.set_directory(dir),
        None => dialog,
    }
}
