//! Time axis rendering
//!
//! Major and minor ticks with millisecond labels above each recording's traces.

use eframe::egui;
use crate::domain::viewport_operations;
use crate::utils::format_time_ms;

pub const AXIS_HEIGHT: f32 = 24.0;

/// Renders the time axis for the visible range `[start_ms, end_ms]`.
///
/// # Arguments
/// * `ui` - The egui UI context for drawing
/// * `axis_rect` - The rectangle to draw the axis in
/// * `start_ms` - Time at the left edge of the page
/// * `page_ms` - Width of a full page; the right edge of the rect
pub fn render_time_axis(ui: &mut egui::Ui, axis_rect: egui::Rect, start_ms: f64, page_ms: f64) {
    ui.painter()
        .rect_filled(axis_rect, 0.0, ui.visuals().extreme_bg_color);

    if page_ms <= 0.0 {
        return;
    }
    let end_ms = start_ms + page_ms;
    let tick_interval = viewport_operations::next_power_of_10((page_ms / 10.0) as f32) as f64;
    let mut tick_ms = (start_ms / tick_interval).ceil() * tick_interval;
    let to_x = |ms: f64| {
        viewport_operations::pct_to_x(100.0 * (ms - start_ms) / page_ms, axis_rect)
    };

    while tick_ms <= end_ms {
        let x = to_x(tick_ms);
        ui.painter().line_segment(
            [egui::pos2(x, axis_rect.top()), egui::pos2(x, axis_rect.top() + 8.0)],
            egui::Stroke::new(2.0, ui.visuals().text_color()),
        );
        ui.painter().text(
            egui::pos2(x, axis_rect.top() + 12.0),
            egui::Align2::CENTER_TOP,
            format_time_ms(tick_ms),
            egui::FontId::proportional(10.0),
            ui.visuals().text_color(),
        );

        for i in 1..5 {
            let minor_ms = tick_ms + tick_interval * i as f64 / 5.0;
            if minor_ms > end_ms {
                break;
            }
            let minor_x = to_x(minor_ms);
            ui.painter().line_segment(
                [egui::pos2(minor_x, axis_rect.top()), egui::pos2(minor_x, axis_rect.top() + 4.0)],
                egui::Stroke::new(1.0, ui.visuals().text_color().gamma_multiply(0.5)),
            );
        }

        tick_ms += tick_interval;
    }
}
