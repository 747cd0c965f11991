//! Pure coordinate transformations between page positions and screen space.
//!
//! Horizontal positions come from `RecordingWindow::sample_to_relative_position`
//! as a percentage of the page width; these helpers only map that percentage
//! and signal amplitudes onto a canvas rectangle.

/// Maps a page percentage (0 = left edge, 100 = right edge) to an X coordinate.
pub fn pct_to_x(pct: f64, canvas_rect: egui::Rect) -> f32 {
    canvas_rect.left() + (pct / 100.0) as f32 * canvas_rect.width()
}

/// Inverse of [`pct_to_x`].
pub fn x_to_pct(x: f32, canvas_rect: egui::Rect) -> f64 {
    if canvas_rect.width() <= 0.0 {
        return 0.0;
    }
    100.0 * ((x - canvas_rect.left()) / canvas_rect.width()) as f64
}

/// Maps an amplitude to a Y coordinate inside a channel row.
///
/// `offset` is subtracted first; `amplitude_max` maps to the top edge and
/// `-amplitude_max` to the bottom. Values outside are clamped to the row.
pub fn amplitude_to_y(value: f32, amplitude_max: f64, offset: f64, row_rect: egui::Rect) -> f32 {
    let half = row_rect.height() / 2.0;
    let normalized = if amplitude_max > 0.0 {
        ((value as f64 - offset) / amplitude_max) as f32
    } else {
        0.0
    };
    (row_rect.center().y - normalized.clamp(-1.0, 1.0) * half).clamp(row_rect.top(), row_rect.bottom())
}

/// Finds the next power of 10 that is greater than or equal to the given value.
/// Used for the spacing of time axis ticks.
pub fn next_power_of_10(value: f32) -> i64 {
    if value <= 0.0 {
        return 1;
    }
    let log_value = value.log10().ceil();
    10_i64.pow(log_value as u32)
}

/// Min/max envelope of `samples` split into `columns` buckets, one per pixel
/// column. Returns the samples unchanged as degenerate pairs when there are
/// fewer samples than columns.
pub fn min_max_columns(samples: &[f32], columns: usize) -> Vec<(f32, f32)> {
    if samples.is_empty() || columns == 0 {
        return Vec::new();
    }
    if samples.len() <= columns {
        return samples.iter().map(|&v| (v, v)).collect();
    }
    (0..columns)
        .map(|c| {
            let start = c * samples.len() / columns;
            let end = ((c + 1) * samples.len() / columns).max(start + 1);
            samples[start..end]
                .iter()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(100.0, 0.0), egui::vec2(400.0, 50.0))
    }

    #[test]
    fn test_pct_and_x_are_inverse() {
        assert_eq!(pct_to_x(0.0, rect()), 100.0);
        assert_eq!(pct_to_x(50.0, rect()), 300.0);
        assert_eq!(pct_to_x(100.0, rect()), 500.0);
        assert!((x_to_pct(300.0, rect()) - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_amplitude_mapping() {
        let r = rect();
        assert_eq!(amplitude_to_y(0.0, 100.0, 0.0, r), 25.0);
        assert_eq!(amplitude_to_y(100.0, 100.0, 0.0, r), 0.0);
        assert_eq!(amplitude_to_y(-500.0, 100.0, 0.0, r), 50.0);
        assert_eq!(amplitude_to_y(60.0, 100.0, 10.0, r), 12.5);
    }

    #[test]
    fn test_next_power_of_10() {
        assert_eq!(next_power_of_10(0.0), 1);
        assert_eq!(next_power_of_10(7.0), 10);
        assert_eq!(next_power_of_10(100.0), 100);
        assert_eq!(next_power_of_10(101.0), 1000);
    }

    #[test]
    fn test_min_max_columns() {
        let samples = [1.0, -1.0, 2.0, 0.0, 5.0, 4.0];
        assert_eq!(min_max_columns(&samples, 3), vec![(-1.0, 1.0), (0.0, 2.0), (4.0, 5.0)]);
        assert_eq!(min_max_columns(&samples[..2], 4), vec![(1.0, 1.0), (-1.0, -1.0)]);
        assert!(min_max_columns(&[], 4).is_empty());
    }
}
