//! Channels panel UI rendering
//!
//! Left side panel: per-recording channel list with display toggle and
//! amplitude bound, plus the overlay group editor.

use eframe::egui;
use egui::{RichText, ScrollArea};

use eegscope::{ChannelRef, RecordingId};

use crate::app::AppState;

/// Result of user interaction with the channels panel
pub enum ChannelsPanelInteraction {
    DisplayedChanged { recording: RecordingId, channel: usize, displayed: bool },
    AmplitudeChanged { recording: RecordingId, channel: usize, amplitude_max: f64 },
    AllDisplayed { recording: RecordingId, displayed: bool },
    CreateOverlayRequested,
    AddToOverlay(ChannelRef),
    RemoveOverlay(String),
}

pub fn render_channels_panel(ui: &mut egui::Ui, state: &mut AppState) -> Option<ChannelsPanelInteraction> {
    let mut interaction = None;

    ui.heading("Channels");

    if state.session.is_empty() {
        ui.label("No recording loaded");
        return None;
    }

    let can_add = state.selection.overlay_target().is_some();

    ScrollArea::vertical()
        .id_salt("channels_scroll_area")
        .max_height(ui.available_height() - 160.0)
        .show(ui, |ui| {
            for recording in state.session.recordings() {
                let id = recording.id();
                let title = recording
                    .path()
                    .and_then(|p| p.file_name())
                    .map(|n| format!("{} {}", id, n.to_string_lossy()))
                    .unwrap_or_else(|| format!("{} virtual", id));

                egui::CollapsingHeader::new(title)
                    .id_salt(("channels_of", id.raw()))
                    .default_open(true)
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            if ui.small_button("All").clicked() {
                                interaction = Some(ChannelsPanelInteraction::AllDisplayed { recording: id, displayed: true });
                            }
                            if ui.small_button("None").clicked() {
                                interaction = Some(ChannelsPanelInteraction::AllDisplayed { recording: id, displayed: false });
                            }
                        });

                        for (channel, entry) in recording.channels().channels().iter().enumerate() {
                            ui.horizontal(|ui| {
                                let mut displayed = entry.displayed;
                                if ui.checkbox(&mut displayed, &entry.label).changed() {
                                    interaction = Some(ChannelsPanelInteraction::DisplayedChanged {
                                        recording: id,
                                        channel,
                                        displayed,
                                    });
                                }

                                let mut amplitude = entry.amplitude_max;
                                let response = ui.add(
                                    egui::DragValue::new(&mut amplitude)
                                        .range(0.001..=f64::MAX)
                                        .speed(entry.amplitude_max * 0.01)
                                        .prefix("±")
                                        .suffix(format!(" {}", entry.unit)),
                                );
                                if response.changed() {
                                    interaction = Some(ChannelsPanelInteraction::AmplitudeChanged {
                                        recording: id,
                                        channel,
                                        amplitude_max: amplitude,
                                    });
                                }

                                if ui
                                    .add_enabled(can_add, egui::Button::new("+").small())
                                    .on_hover_text("Add to overlay group")
                                    .clicked()
                                {
                                    interaction = Some(ChannelsPanelInteraction::AddToOverlay(ChannelRef {
                                        recording: id,
                                        channel,
                                    }));
                                }
                            });
                        }
                    });
            }
        });

    ui.separator();
    ui.label(RichText::new("Overlay groups").strong());

    ui.horizontal(|ui| {
        ui.add(egui::TextEdit::singleline(state.layout.overlay_name_text_mut()).hint_text("name").desired_width(100.0));
        if ui.button("Create").clicked() {
            interaction = Some(ChannelsPanelInteraction::CreateOverlayRequested);
        }
    });

    let mut target = state.selection.overlay_target().map(str::to_string);
    for group in state.session.overlays().groups() {
        ui.horizontal(|ui| {
            let is_target = target.as_deref() == Some(group.name.as_str());
            let label = format!("{} ({})", group.name, group.members.len());
            if ui.selectable_label(is_target, label).clicked() {
                target = Some(group.name.clone());
            }
            if ui.small_button("✕").clicked() {
                interaction = Some(ChannelsPanelInteraction::RemoveOverlay(group.name.clone()));
            }
        });
    }
    if target.as_deref() != state.selection.overlay_target() {
        state.selection.set_overlay_target(target);
    }

    interaction
}
