//! Colors for traces and event markers.
//!
//! Event codes map deterministically onto a fixed palette so the same code
//! keeps its color across recordings and sessions.

use egui::Color32;
use once_cell::sync::Lazy;

static EVENT_PALETTE: Lazy<Vec<Color32>> = Lazy::new(|| {
    vec![
        Color32::from_rgb(0xe6, 0x19, 0x4b),
        Color32::from_rgb(0x3c, 0xb4, 0x4b),
        Color32::from_rgb(0x43, 0x63, 0xd8),
        Color32::from_rgb(0xf5, 0x82, 0x31),
        Color32::from_rgb(0x91, 0x1e, 0xb4),
        Color32::from_rgb(0x42, 0xd4, 0xf4),
        Color32::from_rgb(0xf0, 0x32, 0xe6),
        Color32::from_rgb(0x9a, 0x63, 0x24),
    ]
});

/// Color for an event marker of `code`.
pub fn event_code_color(code: i32) -> Color32 {
    let index = code.rem_euclid(EVENT_PALETTE.len() as i32) as usize;
    EVENT_PALETTE[index]
}

pub fn background_color(rgb: [u8; 3]) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

/// Black or light gray, whichever reads better on `rgb`.
pub fn trace_color(rgb: [u8; 3]) -> Color32 {
    let luminance = 0.299 * rgb[0] as f32 + 0.587 * rgb[1] as f32 + 0.114 * rgb[2] as f32;
    if luminance > 128.0 {
        Color32::from_rgb(20, 20, 20)
    } else {
        Color32::from_rgb(220, 220, 220)
    }
}

/// Dimmed variant used for rejected events.
pub fn rejected(color: Color32) -> Color32 {
    color.gamma_multiply(0.35)
}
