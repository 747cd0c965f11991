//! Channel trace and event marker rendering
//!
//! Traces are drawn as a per-pixel min/max envelope so a page of several
//! hundred thousand samples costs one vertex pair per column.

use eframe::egui;
use egui::{Color32, Stroke};

use eegscope::{AcceptState, Event, RecordingWindow};

use crate::domain::viewport_operations;
use crate::presentation::color_mapping;

/// Draws one channel's samples for the current page.
///
/// `samples` covers `[lower, upper)` of the window. On a short last page it
/// is narrower than `samples_per_page` and only fills the left part of the row.
pub fn render_channel_trace(
    painter: &egui::Painter,
    row_rect: egui::Rect,
    samples: &[f32],
    samples_per_page: u64,
    amplitude_max: f64,
    offset: f64,
    color: Color32,
) {
    if samples.is_empty() || samples_per_page == 0 {
        return;
    }
    let fill = (samples.len() as f32 / samples_per_page as f32).min(1.0);
    let used_width = row_rect.width() * fill;
    let columns = used_width.max(1.0) as usize;
    let envelope = viewport_operations::min_max_columns(samples, columns);
    let step = used_width / envelope.len() as f32;

    let mut points = Vec::with_capacity(envelope.len() * 2);
    for (i, (lo, hi)) in envelope.iter().enumerate() {
        let x = row_rect.left() + (i as f32 + 0.5) * step;
        let y_hi = viewport_operations::amplitude_to_y(*hi, amplitude_max, offset, row_rect);
        let y_lo = viewport_operations::amplitude_to_y(*lo, amplitude_max, offset, row_rect);
        points.push(egui::pos2(x, y_hi));
        if y_lo != y_hi {
            points.push(egui::pos2(x, y_lo));
        }
    }
    painter.add(egui::Shape::line(points, Stroke::new(1.0, color)));
}

/// Draws vertical markers for in-view events with their code on top.
///
/// Events outside `[0, 100]` percent of the page are skipped.
pub fn render_event_markers(
    painter: &egui::Painter,
    rect: egui::Rect,
    window: &RecordingWindow,
    events: &[(usize, Event)],
    focused_sample: Option<u64>,
) {
    for (_, event) in events {
        let pct = window.sample_to_relative_position(event.sample);
        if !(0.0..=100.0).contains(&pct) {
            continue;
        }
        let x = viewport_operations::pct_to_x(pct, rect);
        let mut color = color_mapping::event_code_color(event.code);
        if event.accept == AcceptState::Rejected {
            color = color_mapping::rejected(color);
        }
        let width = if focused_sample == Some(event.sample) { 3.0 } else { 1.5 };

        painter.line_segment(
            [egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())],
            Stroke::new(width, color),
        );
        painter.text(
            egui::pos2(x + 2.0, rect.top() + 2.0),
            egui::Align2::LEFT_TOP,
            event.code.to_string(),
            egui::FontId::monospace(10.0),
            color,
        );
    }
}

/// Thin vertical cursor line at `x`.
pub fn render_cursor(painter: &egui::Painter, rect: egui::Rect, x: f32, color: Color32) {
    painter.line_segment(
        [egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())],
        Stroke::new(1.0, color.gamma_multiply(0.6)),
    );
}
