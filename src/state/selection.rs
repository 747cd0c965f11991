//! Selection and hover state.

use std::collections::BTreeSet;

use eegscope::RecordingId;

/// What the user has picked in the side panels, and where the pointer is.
///
/// Responsibilities:
/// - The recording whose events and channels the side panels edit
/// - Codes ticked in the events panel for delete/recode
/// - Time under the pointer, for the status bar readout
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    selected_recording: Option<RecordingId>,
    selected_codes: BTreeSet<i32>,
    overlay_target: Option<String>,
    hover_ms: Option<f64>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // ===== Queries =====

    pub fn selected_recording(&self) -> Option<RecordingId> {
        self.selected_recording
    }

    pub fn selected_codes(&self) -> &BTreeSet<i32> {
        &self.selected_codes
    }

    pub fn is_code_selected(&self, code: i32) -> bool {
        self.selected_codes.contains(&code)
    }

    pub fn overlay_target(&self) -> Option<&str> {
        self.overlay_target.as_deref()
    }

    pub fn hover_ms(&self) -> Option<f64> {
        self.hover_ms
    }

    // ===== Mutations =====

    /// Selecting another recording drops the code selection, which belonged
    /// to the previous recording's event track.
    pub fn select_recording(&mut self, id: Option<RecordingId>) {
        if self.selected_recording != id {
            self.selected_codes.clear();
        }
        self.selected_recording = id;
    }

    pub fn toggle_code(&mut self, code: i32) {
        if !self.selected_codes.remove(&code) {
            self.selected_codes.insert(code);
        }
    }

    pub fn clear_codes(&mut self) {
        self.selected_codes.clear();
    }

    pub fn set_overlay_target(&mut self, name: Option<String>) {
        self.overlay_target = name;
    }

    pub fn set_hover(&mut self, time_ms: Option<f64>) {
        self.hover_ms = time_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switching_recording_clears_codes() {
        let mut selection = SelectionState::new();
        let a = RecordingId::from_raw(1);
        selection.select_recording(Some(a));
        selection.toggle_code(3);
        selection.toggle_code(5);
        selection.toggle_code(3);
        assert_eq!(selection.selected_codes().iter().copied().collect::<Vec<_>>(), vec![5]);

        selection.select_recording(Some(a));
        assert!(selection.is_code_selected(5));
        selection.select_recording(Some(RecordingId::from_raw(2)));
        assert!(selection.selected_codes().is_empty());
    }
}
