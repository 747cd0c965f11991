//! Application-level coordination and workflow management.
//!
//! Turns panel interactions into session operations: file and project
//! loading, paging, event navigation and event editing. Errors end up in
//! `AppState::error_message`, never in a panic.

use std::path::{Path, PathBuf};

use log::{debug, info};

use eegscope::{
    decoder_for_path, write_event_file, AcceptState, ChannelRef, EventFileReader, EventTrack,
    ProjectFile, RecordingId, StepDirection, TextEventReader, ViewChange, ViewMode,
    DEFAULT_TIME_SCALE_MS,
};

use crate::app::AppState;
use crate::io::{AsyncLoader, LoadResult, LoadedFile};

/// Factor applied by one zoom step.
pub const ZOOM_STEP: f64 = 2.0;

/// Coordinates application-level operations and workflows.
pub struct ApplicationCoordinator;

impl ApplicationCoordinator {
    // ===== Loading =====

    /// Starts decoding a recording in the background.
    pub fn open_file(state: &mut AppState, loader: &mut AsyncLoader, path: PathBuf, ctx: &egui::Context) {
        state.settings.remember_directory_of(&path);
        state.error_message = None;
        loader.start_file_load(path, ctx);
    }

    /// Applies a finished background load. Called once per frame.
    /// Returns true if a load operation completed (success or error).
    pub fn check_loading_completion(state: &mut AppState, loader: &mut AsyncLoader) -> bool {
        match loader.check_completion() {
            LoadResult::Success { loaded, path } => {
                Self::install_recording(state, loaded, path);
                true
            }
            LoadResult::Error(error_msg) => {
                state.error_message = Some(format!("Error loading recording: {}", error_msg));
                true
            }
            LoadResult::None => false,
        }
    }

    /// Generates and opens a synthetic recording.
    pub fn open_virtual_recording(state: &mut AppState, loader: &mut AsyncLoader) {
        match loader.load_virtual_recording() {
            Ok(loaded) => Self::install_recording(state, loaded, None),
            Err(e) => {
                state.error_message = Some(format!("Error generating virtual recording: {}", e));
            }
        }
    }

    /// Hands a decoded recording to the session. An empty recording or one
    /// with an invalid rate is reported and not added.
    pub fn install_recording(state: &mut AppState, loaded: LoadedFile, path: Option<PathBuf>) {
        let first = state.session.is_empty();
        let id = match state.session.load_described(&loaded.source.info, path) {
            Ok(id) => id,
            Err(e) => {
                state.error_message = Some(format!("Recording unavailable: {}", e));
                return;
            }
        };

        if first && state.settings.initial_time_scale_ms != DEFAULT_TIME_SCALE_MS {
            state.session.set_global_time_scale(state.settings.initial_time_scale_ms);
        }
        if let Some(events) = loaded.events {
            let mut track = EventTrack::load(events);
            if let Some(event_path) = loaded.event_path {
                track = track.with_source_path(event_path);
            }
            state.session.attach_event_track(id, track);
        }

        state.signals.insert(id, loaded.source);
        state.selection.select_recording(Some(id));
        state.error_message = None;
    }

    pub fn unload_recording(state: &mut AppState, id: RecordingId) {
        if state.session.unload_recording(id) {
            state.signals.remove(id);
            if state.selection.selected_recording() == Some(id) {
                state.selection.select_recording(None);
            }
        }
    }

    // ===== Projects =====

    /// Replaces the session with a saved project. Recordings that fail to
    /// decode are skipped and listed in the error message.
    pub fn open_project(state: &mut AppState, path: &Path) {
        let project = match ProjectFile::load(path) {
            Ok(project) => project,
            Err(e) => {
                state.error_message = Some(format!("Error opening project: {:#}", e));
                return;
            }
        };

        state.reset_session();
        state.settings.remember_directory_of(path);
        state.settings.background_color = project.background_color;

        let report = project.restore(&mut state.session, decoder_for_path, &TextEventReader::new());
        for (id, source) in report.loaded {
            state.signals.insert(id, source);
        }
        state.project_path = Some(path.to_path_buf());

        if !report.skipped.is_empty() {
            let names: Vec<String> = report
                .skipped
                .iter()
                .map(|s| format!("{} ({})", s.path.display(), s.reason))
                .collect();
            state.error_message = Some(format!("Recording unavailable: {}", names.join(", ")));
        }
    }

    pub fn save_project(state: &mut AppState, path: &Path) {
        let project = ProjectFile::capture(&state.session, state.settings.background_color);
        match project.save(path) {
            Ok(()) => {
                state.project_path = Some(path.to_path_buf());
                state.settings.remember_directory_of(path);
            }
            Err(e) => state.error_message = Some(format!("Error saving project: {:#}", e)),
        }
    }

    // ===== Paging and navigation =====

    pub fn set_time_scale(state: &mut AppState, ms: u64) {
        state.session.set_global_time_scale(ms);
    }

    /// Multiplies the time scale by `factor`; > 1 zooms out.
    pub fn zoom(state: &mut AppState, factor: f64) {
        let ms = (state.session.time_scale_ms() as f64 * factor).round().max(1.0) as u64;
        state.session.set_global_time_scale(ms);
    }

    pub fn step_page(state: &mut AppState, direction: StepDirection) {
        state.session.step_page(direction);
    }

    pub fn goto_page(state: &mut AppState, page: usize) {
        state.session.goto_page(page);
    }

    pub fn toggle_view_mode(state: &mut AppState) {
        let target = match state.session.view_mode() {
            ViewMode::Paged => ViewMode::EventFocused,
            ViewMode::EventFocused => ViewMode::Paged,
        };
        if !state.session.set_view_mode(target) {
            state.error_message = Some("No browsable events to focus on".to_string());
        }
    }

    pub fn step_event(state: &mut AppState, direction: StepDirection) {
        state.session.step_event(direction);
    }

    // ===== Event editing =====

    /// Adds an event with the code typed in the events panel.
    pub fn add_event_at(state: &mut AppState, id: RecordingId, sample: u64) {
        let Some(code) = state.layout.new_event_code() else {
            state.error_message = Some("Enter a numeric event code first".to_string());
            return;
        };
        if state.session.add_event(id, sample, code, true, true).is_some() {
            debug!("added event code {} at sample {} to {}", code, sample, id);
        }
    }

    pub fn delete_selected_codes(state: &mut AppState) {
        let Some(id) = state.edited_recording() else {
            return;
        };
        let codes: Vec<i32> = state.selection.selected_codes().iter().copied().collect();
        let removed = state.session.delete_events_by_code(id, &codes);
        info!("deleted {} events with codes {:?} from {}", removed, codes, id);
        state.selection.clear_codes();
    }

    /// Recodes every ticked code to the target typed in the events panel.
    pub fn recode_selected_codes(state: &mut AppState) {
        let Some(id) = state.edited_recording() else {
            return;
        };
        let Some(target) = state.layout.recode_target() else {
            state.error_message = Some("Enter a numeric target code first".to_string());
            return;
        };
        let mapping: Vec<(i32, i32)> = state
            .selection
            .selected_codes()
            .iter()
            .map(|&code| (code, target))
            .collect();
        let recoded = state.session.recode_events_by_code(id, &mapping);
        info!("recoded {} events to {} in {}", recoded, target, id);
        state.selection.clear_codes();
    }

    pub fn set_code_visibility(state: &mut AppState, id: RecordingId, code: i32, visible: bool) {
        state.session.set_code_visibility(id, code, visible);
    }

    pub fn set_code_browsability(state: &mut AppState, id: RecordingId, code: i32, browsable: bool) {
        state.session.set_code_browsability(id, code, browsable);
    }

    /// Flips an event between accepted and rejected.
    pub fn toggle_accept(state: &mut AppState, id: RecordingId, event_index: usize) {
        let current = state
            .session
            .recording(id)
            .and_then(|r| r.active_track())
            .and_then(|t| t.get(event_index))
            .map(|e| e.accept);
        let next = match current {
            Some(AcceptState::Accepted) => AcceptState::Rejected,
            Some(AcceptState::Rejected) => AcceptState::Accepted,
            None => return,
        };
        state.session.accept_reject(id, event_index, next);
    }

    /// Writes the active event track to `path`.
    pub fn save_events(state: &mut AppState, id: RecordingId, path: &Path) {
        let Some(track) = state.session.recording(id).and_then(|r| r.active_track()) else {
            state.error_message = Some("Recording has no events to save".to_string());
            return;
        };
        match write_event_file(path, &track.to_raw()) {
            Ok(()) => info!("saved {} events to {}", track.len(), path.display()),
            Err(e) => state.error_message = Some(format!("Error saving events: {:#}", e)),
        }
    }

    pub fn select_event_track(state: &mut AppState, id: RecordingId, index: usize) {
        if state.session.set_active_track(id, index) {
            state.selection.clear_codes();
        }
    }

    /// Attaches an event file to a loaded recording and makes it active.
    pub fn open_event_file(state: &mut AppState, id: RecordingId, path: &Path) {
        let reader = TextEventReader::new();
        match reader.read_events(path) {
            Ok(raw) => {
                let track = EventTrack::load(raw).with_source_path(path.to_path_buf());
                if state.session.attach_event_track(id, track).is_some() {
                    state.settings.remember_directory_of(path);
                    state.selection.clear_codes();
                }
            }
            Err(e) => state.error_message = Some(format!("Error reading events: {}", e)),
        }
    }

    // ===== Channels and overlays =====

    pub fn set_channel_displayed(state: &mut AppState, id: RecordingId, channel: usize, displayed: bool) {
        if let Some(catalog) = state.session.channels_mut(id) {
            catalog.set_displayed(channel, displayed);
        }
    }

    pub fn set_all_channels_displayed(state: &mut AppState, id: RecordingId, displayed: bool) {
        if let Some(catalog) = state.session.channels_mut(id) {
            catalog.set_all_displayed(displayed);
        }
    }

    pub fn set_channel_amplitude(state: &mut AppState, id: RecordingId, channel: usize, amplitude_max: f64) {
        if let Some(catalog) = state.session.channels_mut(id) {
            catalog.set_amplitude_max(channel, amplitude_max);
        }
    }

    /// Creates an overlay group from the name typed in the channels panel and
    /// makes it the target of "add to overlay".
    pub fn create_overlay(state: &mut AppState) {
        let Some(name) = state.layout.take_overlay_name() else {
            return;
        };
        if state.session.overlays_mut().create(&name) {
            state.selection.set_overlay_target(Some(name));
        } else {
            state.error_message = Some(format!("Overlay group '{}' already exists", name));
        }
    }

    pub fn add_to_overlay(state: &mut AppState, member: ChannelRef) {
        let Some(name) = state.selection.overlay_target().map(str::to_string) else {
            state.error_message = Some("Create or pick an overlay group first".to_string());
            return;
        };
        state.session.overlays_mut().add_member(&name, member);
    }

    pub fn remove_overlay(state: &mut AppState, name: &str) {
        state.session.overlays_mut().remove(name);
        if state.selection.overlay_target() == Some(name) {
            state.selection.set_overlay_target(None);
        }
    }

    // ===== Change notifications =====

    /// Drains the session's change queue. Returns whether anything changed,
    /// so the caller can request a repaint.
    pub fn process_view_changes(state: &mut AppState) -> bool {
        let changes = state.session.drain_changes();
        for change in &changes {
            debug!("view change: {:?}", change);
            if *change == ViewChange::RecordingsChanged {
                let selected = state.selection.selected_recording();
                if selected.is_some_and(|id| state.session.recording(id).is_none()) {
                    state.selection.select_recording(None);
                }
            }
        }
        !changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eegscope::{RawEvent, VirtualRecordingReader};

    fn loaded(events: Vec<RawEvent>) -> LoadedFile {
        LoadedFile {
            source: VirtualRecordingReader::with_config(2, 60.0, 100.0, 5).generate().unwrap(),
            events: Some(events),
            event_path: None,
        }
    }

    fn state_with_recording(events: Vec<RawEvent>) -> (AppState, RecordingId) {
        let mut state = AppState::new();
        ApplicationCoordinator::install_recording(&mut state, loaded(events), None);
        let id = state.session.recordings()[0].id();
        (state, id)
    }

    #[test]
    fn test_install_selects_recording_and_keeps_samples() {
        let (state, id) = state_with_recording(vec![RawEvent::new(100, 1, 0)]);
        assert_eq!(state.selection.selected_recording(), Some(id));
        assert!(state.signals.get(id).is_some());
        assert_eq!(state.session.recording(id).unwrap().tracks().len(), 1);
    }

    #[test]
    fn test_empty_recording_is_reported() {
        let mut state = AppState::new();
        let empty = LoadedFile {
            source: VirtualRecordingReader::with_config(1, 0.0, 100.0, 1).generate().unwrap(),
            events: None,
            event_path: None,
        };
        ApplicationCoordinator::install_recording(&mut state, empty, None);
        assert!(state.session.is_empty());
        assert!(state.error_message.as_deref().is_some_and(|m| m.starts_with("Recording unavailable")));
    }

    #[test]
    fn test_initial_time_scale_setting_applies_to_first_recording() {
        let mut state = AppState::new();
        state.settings.initial_time_scale_ms = 5_000;
        ApplicationCoordinator::install_recording(&mut state, loaded(Vec::new()), None);
        assert_eq!(state.session.time_scale_ms(), 5_000);
    }

    #[test]
    fn test_toggle_view_mode_reports_missing_events() {
        let (mut state, _) = state_with_recording(Vec::new());
        ApplicationCoordinator::toggle_view_mode(&mut state);
        assert_eq!(state.session.view_mode(), ViewMode::Paged);
        assert!(state.error_message.is_some());
    }

    #[test]
    fn test_recode_and_delete_selected_codes() {
        let events = vec![
            RawEvent::new(100, 1, 0),
            RawEvent::new(200, 2, 0),
            RawEvent::new(300, 3, 0),
        ];
        let (mut state, id) = state_with_recording(events);
        state.selection.toggle_code(1);
        state.selection.toggle_code(2);
        *state.layout.recode_target_text_mut() = "7".to_string();
        ApplicationCoordinator::recode_selected_codes(&mut state);

        let counts = state.session.recording(id).unwrap().active_track().unwrap().code_counts();
        assert_eq!(counts.get(&7), Some(&2));
        assert!(state.selection.selected_codes().is_empty());

        state.selection.toggle_code(7);
        ApplicationCoordinator::delete_selected_codes(&mut state);
        assert_eq!(state.session.recording(id).unwrap().active_track().unwrap().len(), 1);
    }

    #[test]
    fn test_toggle_accept() {
        let (mut state, id) = state_with_recording(vec![RawEvent::new(100, 1, 0)]);
        ApplicationCoordinator::toggle_accept(&mut state, id, 0);
        let track = state.session.recording(id).unwrap().active_track().unwrap();
        assert_eq!(track.get(0).unwrap().accept, AcceptState::Rejected);
    }

    #[test]
    fn test_unload_clears_selection_and_samples() {
        let (mut state, id) = state_with_recording(Vec::new());
        ApplicationCoordinator::unload_recording(&mut state, id);
        assert!(state.signals.get(id).is_none());
        assert_eq!(state.selection.selected_recording(), None);
        assert!(ApplicationCoordinator::process_view_changes(&mut state));
        assert!(!ApplicationCoordinator::process_view_changes(&mut state));
    }

    #[test]
    fn test_open_missing_project_reports_error() {
        let mut state = AppState::new();
        ApplicationCoordinator::open_project(&mut state, Path::new("/definitely/not/here.eegp"));
        assert!(state.error_message.is_some());
    }

    #[test]
    fn test_zoom_steps_time_scale() {
        let (mut state, _) = state_with_recording(Vec::new());
        ApplicationCoordinator::zoom(&mut state, 1.0 / ZOOM_STEP);
        assert_eq!(state.session.time_scale_ms(), 5_000);
        ApplicationCoordinator::zoom(&mut state, 100.0);
        assert_eq!(state.session.time_scale_ms(), 60_000);
    }

    #[test]
    fn test_overlay_workflow() {
        let (mut state, id) = state_with_recording(Vec::new());
        let member = ChannelRef { recording: id, channel: 1 };

        ApplicationCoordinator::add_to_overlay(&mut state, member);
        assert!(state.error_message.is_some());

        *state.layout.overlay_name_text_mut() = "Frontal".to_string();
        ApplicationCoordinator::create_overlay(&mut state);
        assert_eq!(state.selection.overlay_target(), Some("Frontal"));
        ApplicationCoordinator::add_to_overlay(&mut state, member);
        assert_eq!(state.session.overlays().get("Frontal").unwrap().members, vec![member]);

        ApplicationCoordinator::remove_overlay(&mut state, "Frontal");
        assert!(state.session.overlays().groups().is_empty());
        assert_eq!(state.selection.overlay_target(), None);
    }

    #[test]
    fn test_channel_display_settings() {
        let (mut state, id) = state_with_recording(Vec::new());
        ApplicationCoordinator::set_channel_displayed(&mut state, id, 0, false);
        ApplicationCoordinator::set_channel_amplitude(&mut state, id, 1, 250.0);
        let channels = state.session.recording(id).unwrap().channels();
        assert_eq!(channels.displayed_indices(), vec![1]);
        assert_eq!(channels.get(1).unwrap().amplitude_max, 250.0);
    }
}
