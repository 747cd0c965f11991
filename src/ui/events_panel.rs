//! Events panel UI rendering
//!
//! Right side panel editing the active event track of the selected recording:
//! track choice, per-code table (count, visibility, browsability, selection),
//! delete / recode of the ticked codes and event file import and export.

use eframe::egui;
use egui::{Color32, RichText, ScrollArea};
use std::path::PathBuf;

use eegscope::RecordingId;

use crate::app::AppState;
use crate::presentation::color_mapping;

/// Result of user interaction with the events panel
pub enum EventsPanelInteraction {
    RecordingSelected(RecordingId),
    TrackSelected { recording: RecordingId, index: usize },
    CodeVisibilityChanged { recording: RecordingId, code: i32, visible: bool },
    CodeBrowsabilityChanged { recording: RecordingId, code: i32, browsable: bool },
    DeleteSelectedCodes,
    RecodeSelectedCodes,
    OpenEventFileRequested { recording: RecordingId, path: PathBuf },
    SaveEventsRequested { recording: RecordingId, path: PathBuf },
}

pub fn render_events_panel(ui: &mut egui::Ui, state: &mut AppState) -> Option<EventsPanelInteraction> {
    let mut interaction = None;

    ui.heading("Events");

    let Some(edited) = state.edited_recording() else {
        ui.label("No recording loaded");
        return None;
    };

    let recording_label = |id: RecordingId| -> String {
        state
            .session
            .recording(id)
            .and_then(|r| r.path())
            .and_then(|p| p.file_name())
            .map(|n| format!("{} {}", id, n.to_string_lossy()))
            .unwrap_or_else(|| format!("{} virtual", id))
    };

    let mut selected = edited;
    egui::ComboBox::from_id_salt("events_recording_selector")
        .selected_text(recording_label(edited))
        .width(ui.available_width())
        .show_ui(ui, |ui| {
            for recording in state.session.recordings() {
                ui.selectable_value(&mut selected, recording.id(), recording_label(recording.id()));
            }
        });
    if selected != edited {
        interaction = Some(EventsPanelInteraction::RecordingSelected(selected));
    }

    let Some(recording) = state.session.recording(edited) else {
        return interaction;
    };

    ui.horizontal(|ui| {
        if ui.button("📂 Load events").clicked() {
            if let Some(path) = event_file_dialog(state).pick_file() {
                interaction = Some(EventsPanelInteraction::OpenEventFileRequested { recording: edited, path });
            }
        }
        if recording.active_track().is_some() && ui.button("💾 Save events").clicked() {
            let mut dialog = event_file_dialog(state);
            if let Some(name) = recording
                .active_track()
                .and_then(|t| t.source_path())
                .and_then(|p| p.file_name())
            {
                dialog = dialog.set_file_name(name.to_string_lossy());
            }
            if let Some(path) = dialog.save_file() {
                interaction = Some(EventsPanelInteraction::SaveEventsRequested { recording: edited, path });
            }
        }
    });

    if recording.tracks().len() > 1 {
        let active = recording.active_track_index().unwrap_or(0);
        let mut chosen = active;
        egui::ComboBox::from_id_salt("events_track_selector")
            .selected_text(track_label(recording.tracks(), active))
            .show_ui(ui, |ui| {
                for index in 0..recording.tracks().len() {
                    ui.selectable_value(&mut chosen, index, track_label(recording.tracks(), index));
                }
            });
        if chosen != active {
            interaction = Some(EventsPanelInteraction::TrackSelected { recording: edited, index: chosen });
        }
    }

    let Some(track) = recording.active_track() else {
        ui.label("No event file attached");
        ui.label(RichText::new("Ctrl+click a trace to add an event").weak());
        return interaction;
    };

    ui.separator();
    ui.label(format!("{} events, {} codes", track.len(), track.code_states().len()));

    let counts = track.code_counts();
    ScrollArea::vertical()
        .id_salt("events_code_table")
        .max_height(ui.available_height() - 120.0)
        .show(ui, |ui| {
            egui::Grid::new("events_code_grid")
                .num_columns(5)
                .striped(true)
                .show(ui, |ui| {
                    ui.label(RichText::new("Code").strong());
                    ui.label(RichText::new("Count").strong());
                    ui.label(RichText::new("Show").strong());
                    ui.label(RichText::new("Browse").strong());
                    ui.label(RichText::new("Sel").strong());
                    ui.end_row();

                    for code_state in track.code_states() {
                        let code = code_state.code;
                        ui.label(RichText::new(code.to_string()).color(color_mapping::event_code_color(code)));
                        ui.label(counts.get(&code).copied().unwrap_or(0).to_string());

                        let mut visible = code_state.visible;
                        if ui.checkbox(&mut visible, "").changed() {
                            interaction = Some(EventsPanelInteraction::CodeVisibilityChanged {
                                recording: edited,
                                code,
                                visible,
                            });
                        }
                        let mut browsable = code_state.browsable;
                        if ui.checkbox(&mut browsable, "").changed() {
                            interaction = Some(EventsPanelInteraction::CodeBrowsabilityChanged {
                                recording: edited,
                                code,
                                browsable,
                            });
                        }
                        let mut ticked = state.selection.is_code_selected(code);
                        if ui.checkbox(&mut ticked, "").changed() {
                            state.selection.toggle_code(code);
                        }
                        ui.end_row();
                    }
                });
        });

    ui.separator();

    let any_selected = !state.selection.selected_codes().is_empty();
    ui.horizontal(|ui| {
        ui.label("New event code:");
        ui.add(egui::TextEdit::singleline(state.layout.new_event_code_text_mut()).desired_width(60.0));
    });
    ui.horizontal(|ui| {
        ui.label("Recode to:");
        ui.add(egui::TextEdit::singleline(state.layout.recode_target_text_mut()).desired_width(60.0));
        if ui.add_enabled(any_selected, egui::Button::new("Recode")).clicked() {
            interaction = Some(EventsPanelInteraction::RecodeSelectedCodes);
        }
    });
    if ui
        .add_enabled(any_selected, egui::Button::new(RichText::new("🗑 Delete selected codes").color(Color32::LIGHT_RED)))
        .clicked()
    {
        interaction = Some(EventsPanelInteraction::DeleteSelectedCodes);
    }

    interaction
}

fn track_label(tracks: &[eegscope::EventTrack], index: usize) -> String {
    tracks
        .get(index)
        .and_then(|t| t.source_path())
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("Track {}", index + 1))
}

fn event_file_dialog(state: &AppState) -> rfd::FileDialog {
    let dialog = rfd::FileDialog::new().add_filter("Event files", &["evt", "txt"]);
    match state.settings.dialog_directory() {
        Some(dir) => dialog.set_directory(dir),
        None => dialog,
    }
}
