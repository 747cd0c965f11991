//! Centralized application state for the viewer.
//!
//! Composes the viewing session from the library with the GUI-only state
//! components, each keeping its own invariants.

use std::path::PathBuf;

use eegscope::MultiRecordingCoordinator;

use crate::app::settings_coordinator::ViewerSettings;
use crate::state::{LayoutState, SelectionState, SignalState};

pub struct AppState {
    // ===== Viewing Session =====
    /// Loaded recordings, shared time scale, paging and event focus
    pub session: MultiRecordingCoordinator,

    /// Decoded samples, keyed by recording id
    pub signals: SignalState,

    // ===== GUI State Components =====
    pub selection: SelectionState,

    pub layout: LayoutState,

    pub settings: ViewerSettings,

    // ===== Top-Level State =====
    /// Project file the session was opened from or last saved to
    pub project_path: Option<PathBuf>,

    /// Current error message to display (if any)
    pub error_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_settings(ViewerSettings::default(), LayoutState::new())
    }

    /// Creates a state with preferences loaded from storage.
    pub fn with_settings(settings: ViewerSettings, layout: LayoutState) -> Self {
        Self {
            session: MultiRecordingCoordinator::new(),
            signals: SignalState::new(),
            selection: SelectionState::new(),
            layout,
            settings,
            project_path: None,
            error_message: None,
        }
    }

    /// Drops every recording, e.g. before opening a project.
    pub fn reset_session(&mut self) {
        self.session = MultiRecordingCoordinator::new();
        self.signals.clear();
        self.selection.clear();
        self.project_path = None;
        self.error_message = None;
    }

    /// Recording edited by the side panels: the selected one, else the first.
    pub fn edited_recording(&self) -> Option<eegscope::RecordingId> {
        self.selection
            .selected_recording()
            .filter(|id| self.session.recording(*id).is_some())
            .or_else(|| self.session.recordings().first().map(|r| r.id()))
    }
}
