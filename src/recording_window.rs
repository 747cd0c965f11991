//! Paging and event-focus windowing for a single recording.
//!
//! A [`RecordingWindow`] turns a recording's static properties (sample count,
//! sampling frequency) and the session's viewing parameters (time scale, page
//! or focused event) into a clamped sample range `[lower, upper)`, and converts
//! between sample indices, milliseconds and relative screen position (0-100%).

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::RecordingError;

/// Smallest time scale the viewer accepts, in milliseconds.
pub const MIN_TIME_SCALE_MS: u64 = 100;

/// Time scale given to the first recording of a session, in milliseconds.
pub const DEFAULT_TIME_SCALE_MS: u64 = 10_000;

/// How the visible range is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewMode {
    /// Fixed-width pages addressed by a 1-based page number.
    #[default]
    Paged,
    /// Window centered on a browsable event.
    EventFocused,
}

/// Direction for page or event stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Next,
    Previous,
}

/// Windowing state of one loaded recording.
///
/// Invariant: `0 <= lower_sample < upper_sample <= sample_count` after every
/// public operation. The first and last page may be shorter than
/// `samples_per_page`; nothing is padded.
#[derive(Debug, Clone)]
pub struct RecordingWindow {
    sample_count: u64,
    sampling_frequency_hz: f64,
    time_scale_ms: u64,
    samples_per_page: u64,
    view_mode: ViewMode,
    /// 1-based, meaningful in [`ViewMode::Paged`]
    current_page: usize,
    /// Sample the window is centered on, meaningful in [`ViewMode::EventFocused`]
    focused_sample: u64,
    lower_sample: u64,
    upper_sample: u64,
}

impl RecordingWindow {
    /// Creates a window on page 1 with the default time scale.
    ///
    /// Fails when the decoded tuple cannot describe a viewable recording:
    /// zero samples or a non-positive / non-finite sampling frequency.
    pub fn new(sample_count: u64, sampling_frequency_hz: f64) -> Result<Self, RecordingError> {
        if sample_count == 0 {
            return Err(RecordingError::Empty);
        }
        if !sampling_frequency_hz.is_finite() || sampling_frequency_hz <= 0.0 {
            return Err(RecordingError::InvalidSamplingFrequency(sampling_frequency_hz));
        }

        let mut window = Self {
            sample_count,
            sampling_frequency_hz,
            time_scale_ms: DEFAULT_TIME_SCALE_MS,
            samples_per_page: samples_for_ms(DEFAULT_TIME_SCALE_MS, sampling_frequency_hz),
            view_mode: ViewMode::Paged,
            current_page: 1,
            focused_sample: 0,
            lower_sample: 0,
            upper_sample: 0,
        };
        window.apply_page(1);
        Ok(window)
    }

    // ===== Queries =====

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    pub fn sampling_frequency_hz(&self) -> f64 {
        self.sampling_frequency_hz
    }

    pub fn time_scale_ms(&self) -> u64 {
        self.time_scale_ms
    }

    pub fn samples_per_page(&self) -> u64 {
        self.samples_per_page
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Current 1-based page number. Recomputed from the view start when
    /// returning to paged view.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn focused_sample(&self) -> Option<u64> {
        match self.view_mode {
            ViewMode::EventFocused => Some(self.focused_sample),
            ViewMode::Paged => None,
        }
    }

    /// First sample in view.
    pub fn lower_sample(&self) -> u64 {
        self.lower_sample
    }

    /// One past the last sample in view.
    pub fn upper_sample(&self) -> u64 {
        self.upper_sample
    }

    /// Total recording length in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.sample_count as f64 / self.sampling_frequency_hz * 1000.0
    }

    /// Start of the view in milliseconds from the beginning of the recording.
    pub fn lower_ms(&self) -> f64 {
        self.samples_to_milliseconds(self.lower_sample as i64)
    }

    /// Number of pages at the current time scale; at least 1.
    pub fn total_page_nb(&self) -> usize {
        self.sample_count.div_ceil(self.samples_per_page) as usize
    }

    pub fn is_in_view(&self, sample: u64) -> bool {
        sample >= self.lower_sample && sample < self.upper_sample
    }

    // ===== Time scale =====

    /// Sets the window width, clamped to `[minimum, recording duration]`.
    ///
    /// The page number is kept; the range is recomputed (and the page clamped
    /// if the recording now has fewer pages). In event focus the window is
    /// re-centered on the focused sample.
    pub fn set_time_scale(&mut self, ms: u64, minimum: u64) {
        let longest = (self.duration_ms().floor() as u64).max(minimum);
        let clamped = ms.clamp(minimum, longest);
        if clamped != ms {
            debug!("time scale {} ms clamped to {} ms", ms, clamped);
        }
        self.adopt_time_scale(clamped);
    }

    /// Applies a time scale that was already clamped at session level.
    ///
    /// Used by the coordinator so every recording shares the exact same
    /// wall-clock width even when some are shorter than one page.
    pub fn adopt_time_scale(&mut self, ms: u64) {
        self.time_scale_ms = ms.max(1);
        self.samples_per_page = samples_for_ms(self.time_scale_ms, self.sampling_frequency_hz);
        self.reanchor();
    }

    // ===== Paged view =====

    /// Jumps to page `n`, clamped to `[1, total_page_nb]`.
    ///
    /// Only valid in [`ViewMode::Paged`]; ignored otherwise.
    /// Returns whether the visible range changed.
    pub fn go_to_page(&mut self, n: usize) -> bool {
        if self.view_mode != ViewMode::Paged {
            debug!("go_to_page({}) ignored in event-focused view", n);
            return false;
        }
        let before = self.range();
        self.apply_page(n);
        before != self.range()
    }

    /// Moves one page forward or back. Saturates at the first and last page.
    pub fn step_page(&mut self, direction: StepDirection) -> bool {
        match direction {
            StepDirection::Next if self.current_page < self.total_page_nb() => {
                self.go_to_page(self.current_page + 1)
            }
            StepDirection::Previous if self.current_page > 1 => {
                self.go_to_page(self.current_page - 1)
            }
            _ => false,
        }
    }

    /// Switches to paged view, landing on the page containing the current
    /// view start rather than resetting to page 1.
    pub fn enter_paged_view(&mut self) {
        if self.view_mode == ViewMode::Paged {
            return;
        }
        self.view_mode = ViewMode::Paged;
        let page = (self.lower_sample / self.samples_per_page) as usize + 1;
        self.apply_page(page);
    }

    // ===== Event-focused view =====

    /// Switches to event focus centered on `sample`. The page is discarded.
    pub fn enter_event_view(&mut self, sample: u64) {
        self.view_mode = ViewMode::EventFocused;
        self.apply_focus(sample);
    }

    /// Centers the window on `sample`, clamped so it never starts before 0
    /// nor runs past the end of the recording.
    ///
    /// Only valid in [`ViewMode::EventFocused`]; ignored otherwise.
    /// Returns whether the visible range changed.
    pub fn focus_on_event(&mut self, sample: u64) -> bool {
        if self.view_mode != ViewMode::EventFocused {
            debug!("focus_on_event({}) ignored in paged view", sample);
            return false;
        }
        let before = self.range();
        self.apply_focus(sample);
        before != self.range()
    }

    // ===== Coordinate conversion =====

    /// Position of `sample` as a percentage of the page width.
    ///
    /// Values outside `[0, 100]` are out of view and must not be rendered.
    pub fn sample_to_relative_position(&self, sample: u64) -> f64 {
        100.0 * (sample as f64 - self.lower_sample as f64) / self.samples_per_page as f64
    }

    /// Inverse of [`Self::sample_to_relative_position`], rounded to the
    /// nearest sample. May be negative or past the end for out-of-view input.
    pub fn relative_position_to_sample(&self, pct: f64) -> i64 {
        (self.lower_sample as f64 + pct * self.samples_per_page as f64 / 100.0).round() as i64
    }

    pub fn milliseconds_to_samples(&self, ms: f64) -> i64 {
        (ms * self.sampling_frequency_hz / 1000.0).round() as i64
    }

    pub fn samples_to_milliseconds(&self, samples: i64) -> f64 {
        samples as f64 * 1000.0 / self.sampling_frequency_hz
    }

    // ===== Internals =====

    fn range(&self) -> (u64, u64) {
        (self.lower_sample, self.upper_sample)
    }

    fn reanchor(&mut self) {
        match self.view_mode {
            ViewMode::Paged => self.apply_page(self.current_page),
            ViewMode::EventFocused => self.apply_focus(self.focused_sample),
        }
    }

    fn apply_page(&mut self, n: usize) {
        let total = self.total_page_nb();
        let page = n.clamp(1, total);
        if page != n {
            debug!("page {} clamped to {} (of {})", n, page, total);
        }
        self.current_page = page;
        self.lower_sample = (page as u64 - 1) * self.samples_per_page;
        self.upper_sample = (self.lower_sample + self.samples_per_page).min(self.sample_count);
    }

    fn apply_focus(&mut self, sample: u64) {
        self.focused_sample = sample;
        let latest_start = self.sample_count.saturating_sub(self.samples_per_page);
        self.lower_sample = sample
            .saturating_sub(self.samples_per_page / 2)
            .min(latest_start);
        self.upper_sample = (self.lower_sample + self.samples_per_page).min(self.sample_count);
    }
}

/// `round(ms * fs / 1000)`, never less than one sample.
fn samples_for_ms(ms: u64, sampling_frequency_hz: f64) -> u64 {
    ((ms as f64 * sampling_frequency_hz / 1000.0).round() as u64).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn window(sample_count: u64, fs: f64, time_scale_ms: u64) -> RecordingWindow {
        let mut w = RecordingWindow::new(sample_count, fs).unwrap();
        w.set_time_scale(time_scale_ms, MIN_TIME_SCALE_MS);
        w
    }

    #[test]
    fn test_rejects_unusable_recordings() {
        assert_eq!(RecordingWindow::new(0, 1000.0).unwrap_err(), RecordingError::Empty);
        assert!(matches!(
            RecordingWindow::new(10, 0.0),
            Err(RecordingError::InvalidSamplingFrequency(_))
        ));
        assert!(RecordingWindow::new(10, f64::NAN).is_err());
    }

    #[test]
    fn test_ten_page_scenario() {
        let mut w = window(100_000, 1000.0, 10_000);
        assert_eq!(w.samples_per_page(), 10_000);
        assert_eq!(w.total_page_nb(), 10);

        w.go_to_page(1);
        assert_eq!((w.lower_sample(), w.upper_sample()), (0, 10_000));

        w.go_to_page(10);
        assert_eq!((w.lower_sample(), w.upper_sample()), (90_000, 100_000));

        assert!(!w.go_to_page(11));
        assert_eq!(w.current_page(), 10);
        assert_eq!((w.lower_sample(), w.upper_sample()), (90_000, 100_000));
    }

    #[test]
    fn test_pages_partition_recording() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let sample_count = rng.gen_range(1..50_000u64);
            let fs = [128.0, 250.0, 256.0, 500.0, 1000.0, 2048.0][rng.gen_range(0..6)];
            let scale = rng.gen_range(MIN_TIME_SCALE_MS..60_000);
            let mut w = window(sample_count, fs, scale);

            let mut expected_lower = 0;
            for page in 1..=w.total_page_nb() {
                w.go_to_page(page);
                assert_eq!(w.lower_sample(), expected_lower, "gap or overlap at page {page}");
                assert!(w.lower_sample() < w.upper_sample());
                assert!(w.upper_sample() - w.lower_sample() <= w.samples_per_page());
                if page < w.total_page_nb() {
                    assert_eq!(w.upper_sample() - w.lower_sample(), w.samples_per_page());
                }
                expected_lower = w.upper_sample();
            }
            assert_eq!(expected_lower, sample_count);
        }
    }

    #[test]
    fn test_short_recording_is_single_page() {
        let mut w = RecordingWindow::new(300, 100.0).unwrap();
        w.adopt_time_scale(10_000);
        assert_eq!(w.total_page_nb(), 1);
        assert_eq!((w.lower_sample(), w.upper_sample()), (0, 300));
    }

    #[test]
    fn test_set_time_scale_clamps_to_duration_and_minimum() {
        let mut w = RecordingWindow::new(5_000, 1000.0).unwrap();
        w.set_time_scale(60_000, MIN_TIME_SCALE_MS);
        assert_eq!(w.time_scale_ms(), 5_000);
        w.set_time_scale(10, MIN_TIME_SCALE_MS);
        assert_eq!(w.time_scale_ms(), MIN_TIME_SCALE_MS);
        assert_eq!(w.samples_per_page(), 100);
    }

    #[test]
    fn test_set_time_scale_keeps_page_number() {
        let mut w = window(100_000, 1000.0, 10_000);
        w.go_to_page(3);
        w.set_time_scale(5_000, MIN_TIME_SCALE_MS);
        assert_eq!(w.current_page(), 3);
        assert_eq!(w.lower_sample(), 10_000);

        // Fewer pages than the current page number: clamp to the last one.
        w.set_time_scale(50_000, MIN_TIME_SCALE_MS);
        assert_eq!(w.current_page(), 2);
        assert_eq!(w.upper_sample(), 100_000);
    }

    #[test]
    fn test_step_page_saturates() {
        let mut w = window(25_000, 1000.0, 10_000);
        assert!(!w.step_page(StepDirection::Previous));
        assert!(w.step_page(StepDirection::Next));
        assert!(w.step_page(StepDirection::Next));
        assert_eq!((w.lower_sample(), w.upper_sample()), (20_000, 25_000));
        assert!(!w.step_page(StepDirection::Next));
        assert_eq!(w.current_page(), 3);
    }

    #[test]
    fn test_focus_on_event_centers_and_clamps() {
        let mut w = window(100_000, 1000.0, 10_000);
        assert!(!w.focus_on_event(50_000), "focus is ignored in paged view");

        w.enter_event_view(50_000);
        assert_eq!((w.lower_sample(), w.upper_sample()), (45_000, 55_000));

        w.focus_on_event(1_000);
        assert_eq!(w.lower_sample(), 0);

        w.focus_on_event(99_000);
        assert_eq!((w.lower_sample(), w.upper_sample()), (90_000, 100_000));

        assert!(!w.go_to_page(2), "paging is ignored in event focus");
    }

    #[test]
    fn test_focus_on_recording_shorter_than_page() {
        let mut w = RecordingWindow::new(400, 100.0).unwrap();
        w.adopt_time_scale(10_000);
        w.enter_event_view(350);
        assert_eq!((w.lower_sample(), w.upper_sample()), (0, 400));
    }

    #[test]
    fn test_leaving_event_focus_lands_near_focus() {
        let mut w = window(100_000, 1000.0, 10_000);
        w.go_to_page(2);
        w.enter_event_view(73_000);
        w.enter_paged_view();
        assert_eq!(w.view_mode(), ViewMode::Paged);
        assert_eq!(w.current_page(), 7);
        assert_eq!(w.lower_sample(), 60_000);
    }

    #[test]
    fn test_time_scale_change_recenters_focus() {
        let mut w = window(100_000, 1000.0, 10_000);
        w.enter_event_view(50_000);
        w.set_time_scale(2_000, MIN_TIME_SCALE_MS);
        assert_eq!((w.lower_sample(), w.upper_sample()), (49_000, 51_000));
    }

    #[test]
    fn test_relative_position_round_trip() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut w = window(1_000_000, 512.0, 7_300);
        for _ in 0..50 {
            let page = rng.gen_range(1..=w.total_page_nb());
            w.go_to_page(page);
            for _ in 0..20 {
                let s = rng.gen_range(w.lower_sample()..w.upper_sample());
                let pct = w.sample_to_relative_position(s);
                assert!((0.0..=100.0).contains(&pct));
                let back = w.relative_position_to_sample(pct);
                assert!((back - s as i64).abs() <= 1, "{s} -> {pct} -> {back}");
            }
        }
    }

    #[test]
    fn test_out_of_view_positions() {
        let mut w = window(100_000, 1000.0, 10_000);
        w.go_to_page(2);
        assert!(w.sample_to_relative_position(5_000) < 0.0);
        assert!(w.sample_to_relative_position(25_000) > 100.0);
        assert_eq!(w.sample_to_relative_position(15_000), 50.0);
        assert!(!w.is_in_view(20_000));
    }

    #[test]
    fn test_millisecond_conversion() {
        let w = RecordingWindow::new(10_000, 256.0).unwrap();
        assert_eq!(w.milliseconds_to_samples(1000.0), 256);
        assert_eq!(w.milliseconds_to_samples(10.0), 3);
        assert_eq!(w.samples_to_milliseconds(512), 2000.0);
    }
}
