//! Signal panel UI rendering
//!
//! Central panel: one block per recording (title, time axis, displayed
//! channel rows with event markers) followed by the overlay groups. Every
//! block spans the same wall-clock width, so markers of different recordings
//! line up vertically.

use eframe::egui;
use egui::{RichText, ScrollArea};

use eegscope::{LoadedRecording, RecordingId, ViewMode};

use crate::app::AppState;
use crate::domain::viewport_operations;
use crate::io::AsyncLoader;
use crate::presentation::color_mapping;
use crate::rendering::{signal_renderer, time_axis_renderer};
use crate::utils::{format_memory_mb, format_time_ms, get_current_memory_mb};

const LABEL_WIDTH: f32 = 64.0;
/// Right-clicks closer than this to a marker toggle its accept state.
const MARKER_HIT_PIXELS: f32 = 4.0;

/// Result of signal panel interactions that need to be handled by the application.
pub enum SignalPanelInteraction {
    /// Ctrl+click on a trace
    AddEventRequested { recording: RecordingId, sample: u64 },
    /// Right-click on an event marker
    ToggleAcceptRequested { recording: RecordingId, event_index: usize },
    RecordingSelected(RecordingId),
    CloseRequested(RecordingId),
}

pub fn render_signal_panel(
    ui: &mut egui::Ui,
    ctx: &egui::Context,
    state: &mut AppState,
    loader: &AsyncLoader,
) -> Option<SignalPanelInteraction> {
    if loader.is_loading() {
        render_loading_indicator(ui);
        ctx.request_repaint_after(std::time::Duration::from_secs_f32(0.1));
        return None;
    }

    if state.session.is_empty() {
        ui.label("No recording loaded - open a recording or a project");
        return None;
    }

    let mut interaction = None;
    let mut hover: Option<f64> = None;

    let total_rows: usize = state
        .session
        .recordings()
        .iter()
        .map(|r| r.channels().displayed_indices().len().max(1))
        .sum::<usize>()
        + state.session.overlays().groups().len();
    let blocks = state.session.recordings().len() as f32;
    let chrome = blocks * (time_axis_renderer::AXIS_HEIGHT + 24.0);
    let row_height = ((ui.available_height() - chrome) / total_rows.max(1) as f32)
        .max(state.layout.min_row_height());

    let view: &AppState = state;
    ScrollArea::vertical()
        .id_salt("signal_scroll_area")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for recording in view.session.recordings() {
                let selected = view.selection.selected_recording() == Some(recording.id());
                if let Some(block_interaction) =
                    render_recording_block(ui, view, recording, selected, row_height, &mut hover)
                {
                    interaction = Some(block_interaction);
                }
                ui.add_space(6.0);
            }

            for group in view.session.overlays().groups() {
                render_overlay_row(ui, view, &group.name, &group.members, row_height);
            }
        });

    state.selection.set_hover(hover);

    interaction
}

fn render_recording_block(
    ui: &mut egui::Ui,
    state: &AppState,
    recording: &LoadedRecording,
    selected: bool,
    row_height: f32,
    hover: &mut Option<f64>,
) -> Option<SignalPanelInteraction> {
    let mut interaction = None;
    let id = recording.id();
    let window = recording.window();

    ui.horizontal(|ui| {
        let title = recording
            .path()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("Virtual recording {}", id));
        let text = RichText::new(format!("{}  ·  {} Hz", title, window.sampling_frequency_hz()));
        if ui.selectable_label(selected, text.strong()).clicked() {
            interaction = Some(SignalPanelInteraction::RecordingSelected(id));
        }
        if ui.small_button("✕").on_hover_text("Close recording").clicked() {
            interaction = Some(SignalPanelInteraction::CloseRequested(id));
        }
    });

    let page_ms = window.time_scale_ms() as f64;
    let (axis_row, _) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), time_axis_renderer::AXIS_HEIGHT),
        egui::Sense::hover(),
    );
    let axis_rect = trace_area(axis_row);
    time_axis_renderer::render_time_axis(ui, axis_rect, window.lower_ms(), page_ms);

    let displayed = recording.channels().displayed_indices();
    let block_height = row_height * displayed.len().max(1) as f32;
    let (block_rect, response) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), block_height),
        egui::Sense::click(),
    );
    let traces_rect = trace_area(block_rect);
    let painter = ui.painter_at(block_rect);
    painter.rect_filled(traces_rect, 0.0, color_mapping::background_color(state.settings.background_color));

    let trace_color = color_mapping::trace_color(state.settings.background_color);
    let range = window.lower_sample()..window.upper_sample();
    for (row, &channel) in displayed.iter().enumerate() {
        let Some(entry) = recording.channels().get(channel) else {
            continue;
        };
        let row_rect = egui::Rect::from_min_size(
            egui::pos2(traces_rect.left(), block_rect.top() + row as f32 * row_height),
            egui::vec2(traces_rect.width(), row_height),
        );
        painter.text(
            egui::pos2(block_rect.left() + 4.0, row_rect.center().y),
            egui::Align2::LEFT_CENTER,
            &entry.label,
            egui::FontId::monospace(11.0),
            ui.visuals().text_color(),
        );
        let samples = state.signals.channel_samples(id, channel, range.clone());
        signal_renderer::render_channel_trace(
            &painter,
            row_rect.shrink2(egui::vec2(0.0, 2.0)),
            samples,
            window.samples_per_page(),
            entry.amplitude_max,
            recording.data_offset(),
            trace_color,
        );
    }

    let events = recording.visible_events_in_view();
    let focused_sample = match window.view_mode() {
        ViewMode::EventFocused => window.focused_sample(),
        ViewMode::Paged => None,
    };
    signal_renderer::render_event_markers(&painter, traces_rect, window, &events, focused_sample);

    if let Some(pos) = response.hover_pos().filter(|p| traces_rect.contains(*p)) {
        signal_renderer::render_cursor(&painter, traces_rect, pos.x, trace_color);
        let pct = viewport_operations::x_to_pct(pos.x, traces_rect);
        let ms = window.lower_ms() + pct * page_ms / 100.0;
        *hover = Some(ms);
    }

    if let Some(pos) = response.interact_pointer_pos().filter(|p| traces_rect.contains(*p)) {
        let pct = viewport_operations::x_to_pct(pos.x, traces_rect);
        if response.clicked() && ui.input(|i| i.modifiers.command) {
            let last = window.sample_count().saturating_sub(1) as i64;
            let sample = window.relative_position_to_sample(pct).clamp(0, last) as u64;
            interaction = Some(SignalPanelInteraction::AddEventRequested { recording: id, sample });
        } else if response.secondary_clicked() {
            let hit = events.iter().find(|(_, e)| {
                let x = viewport_operations::pct_to_x(window.sample_to_relative_position(e.sample), traces_rect);
                (x - pos.x).abs() <= MARKER_HIT_PIXELS
            });
            if let Some((event_index, _)) = hit {
                interaction = Some(SignalPanelInteraction::ToggleAcceptRequested {
                    recording: id,
                    event_index: *event_index,
                });
            }
        } else if response.clicked() {
            interaction = Some(SignalPanelInteraction::RecordingSelected(id));
        }
    }

    interaction
}

/// Butterfly row: every member trace drawn over the others, each through its
/// own recording's window.
fn render_overlay_row(
    ui: &mut egui::Ui,
    state: &AppState,
    name: &str,
    members: &[eegscope::ChannelRef],
    row_height: f32,
) {
    let (row_rect, _) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), row_height * 2.0),
        egui::Sense::hover(),
    );
    let traces_rect = trace_area(row_rect);
    let painter = ui.painter_at(row_rect);
    painter.rect_filled(traces_rect, 0.0, color_mapping::background_color(state.settings.background_color));
    painter.text(
        egui::pos2(row_rect.left() + 4.0, row_rect.center().y),
        egui::Align2::LEFT_CENTER,
        name,
        egui::FontId::proportional(11.0),
        ui.visuals().strong_text_color(),
    );

    for (i, member) in members.iter().enumerate() {
        let Some(recording) = state.session.recording(member.recording) else {
            continue;
        };
        let Some(entry) = recording.channels().get(member.channel) else {
            continue;
        };
        let window = recording.window();
        let samples = state.signals.channel_samples(
            member.recording,
            member.channel,
            window.lower_sample()..window.upper_sample(),
        );
        signal_renderer::render_channel_trace(
            &painter,
            traces_rect,
            samples,
            window.samples_per_page(),
            entry.amplitude_max,
            recording.data_offset(),
            color_mapping::event_code_color(i as i32),
        );
    }
}

fn trace_area(rect: egui::Rect) -> egui::Rect {
    egui::Rect::from_min_max(egui::pos2(rect.left() + LABEL_WIDTH, rect.top()), rect.max)
}

fn render_loading_indicator(ui: &mut egui::Ui) {
    let center_pos = ui.available_rect_before_wrap().center();
    let color = ui.visuals().weak_text_color();

    ui.painter().text(
        center_pos,
        egui::Align2::CENTER_CENTER,
        "Loading...",
        egui::FontId::proportional(48.0),
        color,
    );
    ui.painter().text(
        egui::pos2(center_pos.x, center_pos.y + 60.0),
        egui::Align2::CENTER_CENTER,
        format_memory_mb(get_current_memory_mb()),
        egui::FontId::proportional(24.0),
        color,
    );
}

/// Hover readout shown in the status bar.
pub fn hover_label(state: &AppState) -> Option<String> {
    state.selection.hover_ms().map(|ms| format!("Cursor: {}", format_time_ms(ms)))
}
