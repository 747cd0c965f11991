//! Multi-recording session: shared time scale, shared view mode, merged
//! browsable-event navigation.
//!
//! The coordinator is the only writer of session-wide viewing state. Every
//! public mutation updates all [`RecordingWindow`]s before returning and queues
//! [`ViewChange`]s describing what moved, so a renderer that drains the queue
//! after each user action never sees a partially updated session.

use std::fmt;
use std::path::PathBuf;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::channel_catalog::ChannelCatalog;
use crate::error::RecordingError;
use crate::event_track::{AcceptState, Event, EventTrack};
use crate::overlay::OverlayGroups;
use crate::recording_window::{
    RecordingWindow, StepDirection, ViewMode, DEFAULT_TIME_SCALE_MS, MIN_TIME_SCALE_MS,
};
use crate::traits::RecordingInfo;

/// Session-unique handle of a loaded recording. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordingId(u64);

impl RecordingId {
    pub fn from_raw(raw: u64) -> Self {
        RecordingId(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What changed in the session since the queue was last drained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewChange {
    /// At least one recording's `[lower, upper)` moved.
    RangeChanged,
    TimeScaleChanged(u64),
    ViewModeChanged(ViewMode),
    /// A recording was loaded or unloaded.
    RecordingsChanged,
    /// Events or code states of a recording changed.
    EventsChanged(RecordingId),
}

/// One entry of the merged navigation sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrowsableEntry {
    /// Position on the shared timeline, from the recording's own sampling rate
    pub time_ms: f64,
    pub sample: u64,
    /// Index into the recording's active event track
    pub event_index: usize,
    pub recording: RecordingId,
    pub code: i32,
}

/// Browsable events of every loaded recording, ascending by time.
///
/// Remembers the (recording, active track, track revision) triples it was
/// built from, so a stale index is detected without explicit invalidation.
#[derive(Debug, Clone, Default)]
pub struct BrowsableEventIndex {
    entries: Vec<BrowsableEntry>,
    signature: Vec<(RecordingId, Option<usize>, u64)>,
}

impl BrowsableEventIndex {
    pub fn entries(&self) -> &[BrowsableEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BrowsableEntry> {
        self.entries.get(index)
    }

    /// Index of the first entry at or after `time_ms`.
    pub fn first_at_or_after(&self, time_ms: f64) -> Option<usize> {
        let i = self.entries.partition_point(|e| e.time_ms < time_ms);
        (i < self.entries.len()).then_some(i)
    }

    fn matches(&self, signature: &[(RecordingId, Option<usize>, u64)]) -> bool {
        self.signature == signature
    }
}

/// A recording owned by the coordinator.
#[derive(Debug, Clone)]
pub struct LoadedRecording {
    id: RecordingId,
    path: Option<PathBuf>,
    window: RecordingWindow,
    channels: ChannelCatalog,
    tracks: Vec<EventTrack>,
    active_track: Option<usize>,
    data_offset: f64,
}

impl LoadedRecording {
    pub fn id(&self) -> RecordingId {
        self.id
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    pub fn window(&self) -> &RecordingWindow {
        &self.window
    }

    pub fn channels(&self) -> &ChannelCatalog {
        &self.channels
    }

    pub fn tracks(&self) -> &[EventTrack] {
        &self.tracks
    }

    pub fn active_track_index(&self) -> Option<usize> {
        self.active_track
    }

    pub fn active_track(&self) -> Option<&EventTrack> {
        self.active_track.and_then(|i| self.tracks.get(i))
    }

    /// Vertical baseline shift applied by renderers, in the channel's unit.
    pub fn data_offset(&self) -> f64 {
        self.data_offset
    }

    /// Visible-code events of the active track inside the current window,
    /// with their track indices.
    pub fn visible_events_in_view(&self) -> Vec<(usize, Event)> {
        match self.active_track() {
            Some(track) => track
                .visible_events_in_range(self.window.lower_sample(), self.window.upper_sample())
                .map(|(i, e)| (i, *e))
                .collect(),
            None => Vec::new(),
        }
    }

    fn signature(&self) -> (RecordingId, Option<usize>, u64) {
        (
            self.id,
            self.active_track,
            self.active_track().map(EventTrack::revision).unwrap_or(0),
        )
    }

    fn active_track_mut(&mut self) -> Option<&mut EventTrack> {
        self.active_track.and_then(move |i| self.tracks.get_mut(i))
    }

    /// Sample of `time_ms` in this recording, clamped to its extent.
    fn sample_at_ms(&self, time_ms: f64) -> u64 {
        let last = self.window.sample_count().saturating_sub(1) as i64;
        self.window.milliseconds_to_samples(time_ms).clamp(0, last) as u64
    }
}

/// Owns every loaded recording and keeps them in step.
#[derive(Debug)]
pub struct MultiRecordingCoordinator {
    recordings: Vec<LoadedRecording>,
    next_id: u64,
    time_scale_ms: u64,
    current_page: usize,
    view_mode: ViewMode,
    focused_index: Option<usize>,
    focused_time_ms: Option<f64>,
    browsable: BrowsableEventIndex,
    overlays: OverlayGroups,
    changes: Vec<ViewChange>,
}

impl Default for MultiRecordingCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiRecordingCoordinator {
    pub fn new() -> Self {
        Self {
            recordings: Vec::new(),
            next_id: 1,
            time_scale_ms: DEFAULT_TIME_SCALE_MS,
            current_page: 1,
            view_mode: ViewMode::Paged,
            focused_index: None,
            focused_time_ms: None,
            browsable: BrowsableEventIndex::default(),
            overlays: OverlayGroups::new(),
            changes: Vec::new(),
        }
    }

    // ===== Queries =====

    pub fn recordings(&self) -> &[LoadedRecording] {
        &self.recordings
    }

    pub fn recording(&self, id: RecordingId) -> Option<&LoadedRecording> {
        self.recordings.iter().find(|r| r.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }

    pub fn time_scale_ms(&self) -> u64 {
        self.time_scale_ms
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Session page shared by every recording; 1 when nothing is loaded.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Largest page count across recordings.
    pub fn total_page_nb(&self) -> usize {
        self.recordings
            .iter()
            .map(|r| r.window.total_page_nb())
            .max()
            .unwrap_or(1)
    }

    /// Position in the browsable index, only set in event focus.
    pub fn focused_index(&self) -> Option<usize> {
        match self.view_mode {
            ViewMode::EventFocused => self.focused_index,
            ViewMode::Paged => None,
        }
    }

    /// Last built browsable index. May be stale; see [`Self::build_browsable_index`].
    pub fn browsable_index(&self) -> &BrowsableEventIndex {
        &self.browsable
    }

    pub fn overlays(&self) -> &OverlayGroups {
        &self.overlays
    }

    pub fn overlays_mut(&mut self) -> &mut OverlayGroups {
        &mut self.overlays
    }

    /// Visible in-view events of every recording, for simultaneous display.
    pub fn events_in_view(&self) -> Vec<(RecordingId, Vec<(usize, Event)>)> {
        self.recordings
            .iter()
            .map(|r| (r.id, r.visible_events_in_view()))
            .collect()
    }

    /// Takes all queued changes, oldest first.
    pub fn drain_changes(&mut self) -> Vec<ViewChange> {
        std::mem::take(&mut self.changes)
    }

    // ===== Loading =====

    /// Creates a window for a decoded recording, inheriting the session's time
    /// scale and view mode. The first recording resets the time scale to
    /// [`DEFAULT_TIME_SCALE_MS`].
    pub fn load_recording(
        &mut self,
        sample_count: u64,
        sampling_frequency_hz: f64,
    ) -> Result<RecordingId, RecordingError> {
        let mut window = RecordingWindow::new(sample_count, sampling_frequency_hz)?;

        if self.recordings.is_empty() {
            self.time_scale_ms = DEFAULT_TIME_SCALE_MS;
            self.current_page = 1;
            self.push_change(ViewChange::TimeScaleChanged(self.time_scale_ms));
        }
        window.adopt_time_scale(self.time_scale_ms);

        let id = RecordingId(self.next_id);
        self.next_id += 1;
        let mut recording = LoadedRecording {
            id,
            path: None,
            window,
            channels: ChannelCatalog::default(),
            tracks: Vec::new(),
            active_track: None,
            data_offset: 0.0,
        };

        match self.view_mode {
            ViewMode::Paged => {
                recording.window.go_to_page(self.current_page);
            }
            ViewMode::EventFocused => {
                let time_ms = self.focused_time_ms.unwrap_or(0.0);
                let sample = recording.sample_at_ms(time_ms);
                recording.window.enter_event_view(sample);
            }
        }

        info!(
            "loaded recording {}: {} samples at {} Hz",
            id, sample_count, sampling_frequency_hz
        );
        self.recordings.push(recording);
        self.push_change(ViewChange::RecordingsChanged);
        self.push_change(ViewChange::RangeChanged);
        Ok(id)
    }

    /// [`Self::load_recording`] from a decoder tuple, with its channel table.
    pub fn load_described(
        &mut self,
        info: &RecordingInfo,
        path: Option<PathBuf>,
    ) -> Result<RecordingId, RecordingError> {
        let id = self.load_recording(info.sample_count, info.sampling_frequency_hz)?;
        if let Some(recording) = self.recording_mut(id) {
            recording.channels = ChannelCatalog::from_descriptors(&info.channels);
            recording.path = path;
        }
        Ok(id)
    }

    /// Removes a recording. The time scale and session page are re-clamped
    /// to what remains, and event focus is left when nothing browsable remains.
    pub fn unload_recording(&mut self, id: RecordingId) -> bool {
        let Some(position) = self.recordings.iter().position(|r| r.id == id) else {
            return false;
        };
        self.recordings.remove(position);
        self.overlays.prune_recording(id);
        info!("unloaded recording {}", id);

        self.push_change(ViewChange::RecordingsChanged);
        self.set_global_time_scale(self.time_scale_ms);
        if self.sync_pages() {
            self.push_change(ViewChange::RangeChanged);
        }
        if self.view_mode == ViewMode::EventFocused {
            self.refresh_focus();
        }
        true
    }

    /// Adds an event track to a recording. The first track becomes active.
    /// Returns the track's index within the recording.
    pub fn attach_event_track(&mut self, id: RecordingId, track: EventTrack) -> Option<usize> {
        let recording = self.recording_mut(id)?;
        recording.tracks.push(track);
        let index = recording.tracks.len() - 1;
        if recording.active_track.is_none() {
            recording.active_track = Some(index);
        }
        self.after_event_mutation(id);
        Some(index)
    }

    pub fn set_active_track(&mut self, id: RecordingId, index: usize) -> bool {
        let Some(recording) = self.recording_mut(id) else {
            return false;
        };
        if index >= recording.tracks.len() {
            return false;
        }
        recording.active_track = Some(index);
        self.after_event_mutation(id);
        true
    }

    pub fn channels_mut(&mut self, id: RecordingId) -> Option<&mut ChannelCatalog> {
        self.recording_mut(id).map(|r| &mut r.channels)
    }

    pub fn set_data_offset(&mut self, id: RecordingId, offset: f64) -> bool {
        match self.recording_mut(id) {
            Some(recording) => {
                recording.data_offset = offset;
                true
            }
            None => false,
        }
    }

    // ===== Time scale and paging =====

    /// Sets the shared time scale, clamped to `[MIN_TIME_SCALE_MS, longest
    /// recording]`, on every recording. Each recording derives its own
    /// samples-per-page from its sampling frequency, so all windows cover the
    /// same wall-clock width.
    pub fn set_global_time_scale(&mut self, ms: u64) {
        let longest = self
            .recordings
            .iter()
            .map(|r| r.window.duration_ms().floor() as u64)
            .max()
            .unwrap_or(u64::MAX)
            .max(MIN_TIME_SCALE_MS);
        let clamped = ms.clamp(MIN_TIME_SCALE_MS, longest);
        if clamped != ms {
            debug!("global time scale {} ms clamped to {} ms", ms, clamped);
        }
        if clamped == self.time_scale_ms {
            return;
        }

        self.time_scale_ms = clamped;
        for recording in &mut self.recordings {
            recording.window.adopt_time_scale(clamped);
        }
        self.sync_pages();
        self.push_change(ViewChange::TimeScaleChanged(clamped));
        self.push_change(ViewChange::RangeChanged);
    }

    /// Sets the session page to `n`, clamped to `[1, total_page_nb]`, and moves
    /// every recording there (each clamped to its own page count).
    /// Ignored outside paged view.
    pub fn goto_page(&mut self, n: usize) -> bool {
        if self.view_mode != ViewMode::Paged {
            debug!("goto_page({}) ignored in event-focused view", n);
            return false;
        }
        let before = self.current_page;
        self.current_page = n;
        let moved = self.sync_pages();
        let changed = moved || before != self.current_page;
        if changed {
            self.push_change(ViewChange::RangeChanged);
        }
        changed
    }

    /// Steps the session page by one. Saturates at page 1 and at the largest
    /// page count. Ignored outside paged view.
    pub fn step_page(&mut self, direction: StepDirection) -> bool {
        if self.view_mode != ViewMode::Paged {
            return false;
        }
        let page = self.current_page;
        let target = match direction {
            StepDirection::Next if page < self.total_page_nb() => page + 1,
            StepDirection::Previous if page > 1 => page - 1,
            _ => return false,
        };
        self.goto_page(target)
    }

    // ===== Event navigation =====

    /// Returns the merged browsable index, rebuilding it if any recording,
    /// active track or browsable set changed since the last build.
    pub fn build_browsable_index(&mut self) -> &BrowsableEventIndex {
        let signature: Vec<_> = self.recordings.iter().map(LoadedRecording::signature).collect();
        if !self.browsable.matches(&signature) {
            let mut entries = Vec::new();
            for recording in &self.recordings {
                if let Some(track) = recording.active_track() {
                    for (event_index, event) in track.browsable_events() {
                        entries.push(BrowsableEntry {
                            time_ms: recording.window.samples_to_milliseconds(event.sample as i64),
                            sample: event.sample,
                            event_index,
                            recording: recording.id,
                            code: event.code,
                        });
                    }
                }
            }
            // Stable: ties keep recording order, then track order.
            entries.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));
            debug!("rebuilt browsable index: {} entries", entries.len());
            self.browsable = BrowsableEventIndex { entries, signature };
        }
        &self.browsable
    }

    /// Switches view mode.
    ///
    /// Entering event focus requires at least one browsable event and centers
    /// on the first one at or after the first recording's current view start.
    /// Leaving it puts each recording on the page containing its view start.
    /// Returns whether the mode changed.
    pub fn set_view_mode(&mut self, mode: ViewMode) -> bool {
        if mode == self.view_mode {
            return false;
        }
        match mode {
            ViewMode::EventFocused => {
                let start_ms = match self.recordings.first() {
                    Some(r) => r.window.lower_ms(),
                    None => {
                        debug!("event focus rejected: no recording loaded");
                        return false;
                    }
                };
                let index = self.build_browsable_index();
                if index.is_empty() {
                    debug!("event focus rejected: no browsable events");
                    return false;
                }
                let target = index.first_at_or_after(start_ms).unwrap_or(index.len() - 1);
                self.view_mode = ViewMode::EventFocused;
                self.focus_all(target);
            }
            ViewMode::Paged => self.leave_event_focus(),
        }
        self.push_change(ViewChange::ViewModeChanged(self.view_mode));
        true
    }

    /// Centers every recording on the `i`-th browsable event (clamped), each
    /// in its own sample domain. Only valid in event focus.
    pub fn focus_on_browsable_index(&mut self, i: usize) -> bool {
        if self.view_mode != ViewMode::EventFocused {
            debug!("focus_on_browsable_index({}) ignored in paged view", i);
            return false;
        }
        let len = self.build_browsable_index().len();
        if len == 0 {
            return false;
        }
        let target = i.min(len - 1);
        if target != i {
            debug!("browsable index {} clamped to {}", i, target);
        }
        self.focus_all(target);
        true
    }

    /// Moves to the next or previous browsable event. Saturates at both ends.
    pub fn step_event(&mut self, direction: StepDirection) -> bool {
        if self.view_mode != ViewMode::EventFocused {
            return false;
        }
        let len = self.build_browsable_index().len();
        let current = self.focused_index.unwrap_or(0);
        let target = match direction {
            StepDirection::Next if current + 1 < len => current + 1,
            StepDirection::Previous if current > 0 => current - 1,
            _ => return false,
        };
        self.focus_on_browsable_index(target)
    }

    // ===== Event editing =====

    /// Adds an event to the recording's active track, creating an empty track
    /// first if it has none. Returns the new event's index in the track.
    pub fn add_event(
        &mut self,
        id: RecordingId,
        sample: u64,
        code: i32,
        visible: bool,
        browsable: bool,
    ) -> Option<usize> {
        let recording = self.recording_mut(id)?;
        if recording.active_track.is_none() {
            recording.tracks.push(EventTrack::default());
            recording.active_track = Some(recording.tracks.len() - 1);
        }
        let index = recording
            .active_track_mut()?
            .add_event(sample, code, visible, browsable);
        self.after_event_mutation(id);
        Some(index)
    }

    pub fn delete_events_by_code(&mut self, id: RecordingId, codes: &[i32]) -> usize {
        let removed = match self.active_track_mut(id) {
            Some(track) => track.delete_events_by_code(codes),
            None => return 0,
        };
        self.after_event_mutation(id);
        removed
    }

    pub fn recode_events_by_code(&mut self, id: RecordingId, mapping: &[(i32, i32)]) -> usize {
        let recoded = match self.active_track_mut(id) {
            Some(track) => track.recode_events_by_code(mapping),
            None => return 0,
        };
        self.after_event_mutation(id);
        recoded
    }

    pub fn set_code_visibility(&mut self, id: RecordingId, code: i32, visible: bool) -> bool {
        let found = self
            .active_track_mut(id)
            .is_some_and(|track| track.set_code_visibility(code, visible));
        if found {
            self.push_change(ViewChange::EventsChanged(id));
        }
        found
    }

    pub fn set_code_browsability(&mut self, id: RecordingId, code: i32, browsable: bool) -> bool {
        let found = self
            .active_track_mut(id)
            .is_some_and(|track| track.set_code_browsability(code, browsable));
        if found {
            self.after_event_mutation(id);
        }
        found
    }

    pub fn accept_reject(&mut self, id: RecordingId, event_index: usize, state: AcceptState) -> bool {
        let found = self
            .active_track_mut(id)
            .is_some_and(|track| track.accept_reject(event_index, state));
        if found {
            self.push_change(ViewChange::EventsChanged(id));
        }
        found
    }

    // ===== Internals =====

    fn recording_mut(&mut self, id: RecordingId) -> Option<&mut LoadedRecording> {
        self.recordings.iter_mut().find(|r| r.id == id)
    }

    fn active_track_mut(&mut self, id: RecordingId) -> Option<&mut EventTrack> {
        self.recording_mut(id)?.active_track_mut()
    }

    fn after_event_mutation(&mut self, id: RecordingId) {
        self.push_change(ViewChange::EventsChanged(id));
        if self.view_mode == ViewMode::EventFocused {
            self.refresh_focus();
        }
    }

    /// Re-validates the focus after the browsable set changed: keeps the view
    /// on the first entry at or after the previously focused time, or leaves
    /// event focus when nothing browsable is left.
    fn refresh_focus(&mut self) {
        let previous_ms = self.focused_time_ms.unwrap_or(0.0);
        let index = self.build_browsable_index();
        if index.is_empty() {
            debug!("no browsable events left, reverting to paged view");
            self.leave_event_focus();
            self.push_change(ViewChange::ViewModeChanged(ViewMode::Paged));
            return;
        }
        let target = index.first_at_or_after(previous_ms).unwrap_or(index.len() - 1);
        self.focus_all(target);
    }

    fn focus_all(&mut self, i: usize) {
        let Some(entry) = self.browsable.get(i).copied() else {
            return;
        };
        for recording in &mut self.recordings {
            let sample = recording.sample_at_ms(entry.time_ms);
            match recording.window.view_mode() {
                ViewMode::EventFocused => {
                    recording.window.focus_on_event(sample);
                }
                ViewMode::Paged => recording.window.enter_event_view(sample),
            }
        }
        self.focused_index = Some(i);
        self.focused_time_ms = Some(entry.time_ms);
        self.push_change(ViewChange::RangeChanged);
    }

    /// Clamps the session page to the largest page count and puts every
    /// recording on it. Returns whether any visible range moved.
    fn sync_pages(&mut self) -> bool {
        self.current_page = self.current_page.clamp(1, self.total_page_nb());
        if self.view_mode != ViewMode::Paged {
            return false;
        }
        let page = self.current_page;
        let mut moved = false;
        for recording in &mut self.recordings {
            moved |= recording.window.go_to_page(page);
        }
        moved
    }

    fn leave_event_focus(&mut self) {
        for recording in &mut self.recordings {
            recording.window.enter_paged_view();
        }
        self.view_mode = ViewMode::Paged;
        if let Some(first) = self.recordings.first() {
            self.current_page = first.window.current_page();
        }
        self.sync_pages();
        self.focused_index = None;
        self.focused_time_ms = None;
        self.push_change(ViewChange::RangeChanged);
    }

    fn push_change(&mut self, change: ViewChange) {
        if self.changes.last() != Some(&change) {
            self.changes.push(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_track::RawEvent;

    fn track(items: &[(u64, i32)]) -> EventTrack {
        EventTrack::load(items.iter().map(|&(s, c)| RawEvent::new(s, c, 0)))
    }

    #[test]
    fn test_first_recording_gets_default_time_scale() {
        let mut session = MultiRecordingCoordinator::new();
        let id = session.load_recording(100_000, 1000.0).unwrap();
        assert_eq!(session.time_scale_ms(), DEFAULT_TIME_SCALE_MS);
        let window = session.recording(id).unwrap().window();
        assert_eq!(window.samples_per_page(), 10_000);
        assert_eq!(session.view_mode(), ViewMode::Paged);
    }

    #[test]
    fn test_unavailable_recording_is_not_added() {
        let mut session = MultiRecordingCoordinator::new();
        assert!(session.load_recording(0, 1000.0).is_err());
        assert!(session.is_empty());
        assert!(session.drain_changes().is_empty());
    }

    #[test]
    fn test_global_time_scale_keeps_wall_clock_width() {
        let mut session = MultiRecordingCoordinator::new();
        let a = session.load_recording(60_000, 500.0).unwrap();
        let b = session.load_recording(120_000, 1000.0).unwrap();
        session.set_global_time_scale(2_000);
        assert_eq!(session.recording(a).unwrap().window().samples_per_page(), 1_000);
        assert_eq!(session.recording(b).unwrap().window().samples_per_page(), 2_000);

        session.set_global_time_scale(4_000);
        assert_eq!(session.time_scale_ms(), 4_000);
        assert_eq!(session.recording(a).unwrap().window().samples_per_page(), 2_000);
        assert_eq!(session.recording(b).unwrap().window().samples_per_page(), 4_000);
    }

    #[test]
    fn test_global_time_scale_clamps_to_longest_recording() {
        let mut session = MultiRecordingCoordinator::new();
        let short = session.load_recording(5_000, 1000.0).unwrap();
        session.load_recording(30_000, 1000.0).unwrap();
        session.set_global_time_scale(1_000_000);
        assert_eq!(session.time_scale_ms(), 30_000);
        // The short recording shares the scale and shows as one short page.
        let w = session.recording(short).unwrap().window();
        assert_eq!(w.time_scale_ms(), 30_000);
        assert_eq!((w.lower_sample(), w.upper_sample()), (0, 5_000));

        session.set_global_time_scale(1);
        assert_eq!(session.time_scale_ms(), MIN_TIME_SCALE_MS);
    }

    #[test]
    fn test_pages_advance_together() {
        let mut session = MultiRecordingCoordinator::new();
        let a = session.load_recording(50_000, 500.0).unwrap();
        let b = session.load_recording(40_000, 1000.0).unwrap();
        assert!(session.step_page(StepDirection::Next));
        let wa = session.recording(a).unwrap().window();
        let wb = session.recording(b).unwrap().window();
        assert_eq!(wa.lower_ms(), 10_000.0);
        assert_eq!(wb.lower_ms(), 10_000.0);

        // b has 4 pages, a has 10: b stays on its last page while a keeps going.
        session.goto_page(4);
        assert!(session.step_page(StepDirection::Next));
        assert_eq!(session.current_page(), 5);
        assert_eq!(session.recording(a).unwrap().window().current_page(), 5);
        assert_eq!(session.recording(b).unwrap().window().current_page(), 4);
        assert_eq!(session.total_page_nb(), 10);
    }

    #[test]
    fn test_stepping_back_past_shorter_recording_stays_aligned() {
        let mut session = MultiRecordingCoordinator::new();
        let a = session.load_recording(100_000, 1000.0).unwrap();
        let b = session.load_recording(40_000, 1000.0).unwrap();
        session.goto_page(4);
        assert!(session.step_page(StepDirection::Next));
        assert!(session.step_page(StepDirection::Previous));

        assert_eq!(session.current_page(), 4);
        let wa = session.recording(a).unwrap().window();
        let wb = session.recording(b).unwrap().window();
        assert_eq!(wa.lower_ms(), 30_000.0);
        assert_eq!(wb.lower_ms(), 30_000.0);
    }

    #[test]
    fn test_session_page_does_not_depend_on_load_order() {
        let mut session = MultiRecordingCoordinator::new();
        session.load_recording(30_000, 1000.0).unwrap();
        session.load_recording(100_000, 1000.0).unwrap();
        session.goto_page(8);
        assert_eq!(session.current_page(), 8);
        session.goto_page(50);
        assert_eq!(session.current_page(), 10);
        assert!(!session.step_page(StepDirection::Next));
    }

    #[test]
    fn test_unloading_longest_recording_reclamps_time_scale() {
        let mut session = MultiRecordingCoordinator::new();
        let long = session.load_recording(120_000, 1000.0).unwrap();
        let short = session.load_recording(20_000, 1000.0).unwrap();
        session.set_global_time_scale(60_000);
        assert_eq!(session.time_scale_ms(), 60_000);
        session.goto_page(2);

        assert!(session.unload_recording(long));
        assert_eq!(session.time_scale_ms(), 20_000);
        assert_eq!(session.current_page(), 1);
        let w = session.recording(short).unwrap().window();
        assert_eq!(w.time_scale_ms(), 20_000);
        assert_eq!((w.lower_sample(), w.upper_sample()), (0, 20_000));
    }

    #[test]
    fn test_new_recording_joins_current_page() {
        let mut session = MultiRecordingCoordinator::new();
        session.load_recording(100_000, 1000.0).unwrap();
        session.goto_page(3);
        let b = session.load_recording(100_000, 500.0).unwrap();
        assert_eq!(session.recording(b).unwrap().window().current_page(), 3);
    }

    #[test]
    fn test_browsable_index_merges_in_milliseconds() {
        let mut session = MultiRecordingCoordinator::new();
        let a = session.load_recording(100_000, 500.0).unwrap();
        let b = session.load_recording(100_000, 1000.0).unwrap();
        // a: 1000 ms and 3000 ms; b: 2000 ms and 2500 ms
        session.attach_event_track(a, track(&[(500, 1), (1_500, 1)]));
        session.attach_event_track(b, track(&[(2_000, 2), (2_500, 3)]));
        session.set_code_browsability(b, 3, false);

        let index = session.build_browsable_index();
        let times: Vec<f64> = index.entries().iter().map(|e| e.time_ms).collect();
        assert_eq!(times, vec![1_000.0, 2_000.0, 3_000.0]);
        assert_eq!(index.get(1).unwrap().recording, b);
        assert_eq!(index.get(2).unwrap().event_index, 1);
    }

    #[test]
    fn test_event_focus_requires_browsable_events() {
        let mut session = MultiRecordingCoordinator::new();
        assert!(!session.set_view_mode(ViewMode::EventFocused));

        let id = session.load_recording(100_000, 1000.0).unwrap();
        assert!(!session.set_view_mode(ViewMode::EventFocused));

        session.attach_event_track(id, track(&[(50_000, 1)]));
        session.set_code_browsability(id, 1, false);
        assert!(!session.set_view_mode(ViewMode::EventFocused));
        assert_eq!(session.view_mode(), ViewMode::Paged);

        session.set_code_browsability(id, 1, true);
        assert!(session.set_view_mode(ViewMode::EventFocused));
        assert_eq!(session.focused_index(), Some(0));
        let w = session.recording(id).unwrap().window();
        assert_eq!((w.lower_sample(), w.upper_sample()), (45_000, 55_000));
    }

    #[test]
    fn test_focus_aligns_recordings_with_different_rates() {
        let mut session = MultiRecordingCoordinator::new();
        let a = session.load_recording(100_000, 500.0).unwrap();
        let b = session.load_recording(200_000, 1000.0).unwrap();
        session.attach_event_track(b, track(&[(30_000, 1), (80_000, 2)]));

        assert!(session.set_view_mode(ViewMode::EventFocused));
        assert!(session.step_event(StepDirection::Next));
        assert_eq!(session.focused_index(), Some(1));

        // 80 s in both recordings, each in its own sample domain.
        let wa = session.recording(a).unwrap().window();
        let wb = session.recording(b).unwrap().window();
        assert_eq!((wa.lower_sample(), wa.upper_sample()), (37_500, 42_500));
        assert_eq!((wb.lower_sample(), wb.upper_sample()), (75_000, 85_000));

        assert!(!session.step_event(StepDirection::Next));
        assert!(!session.goto_page(2));
    }

    #[test]
    fn test_leaving_focus_lands_on_containing_page() {
        let mut session = MultiRecordingCoordinator::new();
        let id = session.load_recording(100_000, 1000.0).unwrap();
        session.attach_event_track(id, track(&[(73_000, 1)]));
        session.set_view_mode(ViewMode::EventFocused);
        assert!(session.set_view_mode(ViewMode::Paged));
        assert_eq!(session.current_page(), 7);
        assert_eq!(session.focused_index(), None);
    }

    #[test]
    fn test_entering_focus_starts_near_current_page() {
        let mut session = MultiRecordingCoordinator::new();
        let id = session.load_recording(100_000, 1000.0).unwrap();
        session.attach_event_track(id, track(&[(5_000, 1), (42_000, 1), (61_000, 1)]));
        session.goto_page(5);
        session.set_view_mode(ViewMode::EventFocused);
        assert_eq!(session.focused_index(), Some(1));

        session.set_view_mode(ViewMode::Paged);
        session.goto_page(10);
        session.set_view_mode(ViewMode::EventFocused);
        assert_eq!(session.focused_index(), Some(2), "falls back to the last entry");
    }

    #[test]
    fn test_deleting_focused_event_clamps_focus() {
        let mut session = MultiRecordingCoordinator::new();
        let id = session.load_recording(100_000, 1000.0).unwrap();
        session.attach_event_track(id, track(&[(10_000, 1), (20_000, 2), (30_000, 1)]));
        session.set_view_mode(ViewMode::EventFocused);
        session.focus_on_browsable_index(2);

        session.delete_events_by_code(id, &[1]);
        assert_eq!(session.view_mode(), ViewMode::EventFocused);
        assert_eq!(session.focused_index(), Some(0));
        assert_eq!(session.build_browsable_index().len(), 1);

        session.delete_events_by_code(id, &[2]);
        assert_eq!(session.view_mode(), ViewMode::Paged);
    }

    #[test]
    fn test_recode_while_focused_keeps_focus_time() {
        let mut session = MultiRecordingCoordinator::new();
        let id = session.load_recording(100_000, 1000.0).unwrap();
        session.attach_event_track(id, track(&[(10_000, 1), (20_000, 2), (30_000, 3)]));
        session.set_code_browsability(id, 3, false);
        session.set_view_mode(ViewMode::EventFocused);
        session.focus_on_browsable_index(1);

        // 3 merges into 2's browsable state, so 30 s becomes browsable too.
        session.recode_events_by_code(id, &[(3, 2)]);
        assert_eq!(session.build_browsable_index().len(), 3);
        assert_eq!(session.focused_index(), Some(1));
        let track = session.recording(id).unwrap().active_track().unwrap();
        assert!(track.code_state(3).is_none());
    }

    #[test]
    fn test_unloading_last_focused_recording_reverts_to_paged() {
        let mut session = MultiRecordingCoordinator::new();
        let a = session.load_recording(100_000, 1000.0).unwrap();
        let b = session.load_recording(100_000, 1000.0).unwrap();
        session.attach_event_track(a, track(&[(50_000, 1)]));
        session.set_view_mode(ViewMode::EventFocused);

        assert!(session.unload_recording(b));
        assert_eq!(session.view_mode(), ViewMode::EventFocused);
        assert!(session.unload_recording(a));
        assert_eq!(session.view_mode(), ViewMode::Paged);
        assert!(!session.unload_recording(a));
    }

    #[test]
    fn test_recording_loaded_during_focus_joins_focus() {
        let mut session = MultiRecordingCoordinator::new();
        let a = session.load_recording(100_000, 1000.0).unwrap();
        session.attach_event_track(a, track(&[(60_000, 1)]));
        session.set_view_mode(ViewMode::EventFocused);
        let b = session.load_recording(50_000, 250.0).unwrap();
        let wb = session.recording(b).unwrap().window();
        assert_eq!(wb.view_mode(), ViewMode::EventFocused);
        assert_eq!(wb.focused_sample(), Some(15_000));
    }

    #[test]
    fn test_add_event_creates_track_and_reports_changes() {
        let mut session = MultiRecordingCoordinator::new();
        let id = session.load_recording(10_000, 1000.0).unwrap();
        session.drain_changes();

        assert_eq!(session.add_event(id, 500, 9, true, true), Some(0));
        assert_eq!(session.recording(id).unwrap().tracks().len(), 1);
        assert_eq!(session.drain_changes(), vec![ViewChange::EventsChanged(id)]);

        let in_view = session.events_in_view();
        assert_eq!(in_view[0].1.len(), 1);
        session.set_code_visibility(id, 9, false);
        assert!(session.events_in_view()[0].1.is_empty());
    }

    #[test]
    fn test_changes_are_coalesced() {
        let mut session = MultiRecordingCoordinator::new();
        session.load_recording(100_000, 1000.0).unwrap();
        session.drain_changes();
        session.goto_page(2);
        session.goto_page(3);
        session.goto_page(3);
        assert_eq!(session.drain_changes(), vec![ViewChange::RangeChanged]);
        session.set_global_time_scale(20_000);
        assert_eq!(
            session.drain_changes(),
            vec![ViewChange::TimeScaleChanged(20_000), ViewChange::RangeChanged]
        );
    }

    #[test]
    fn test_unload_prunes_overlays() {
        let mut session = MultiRecordingCoordinator::new();
        let a = session.load_recording(1_000, 100.0).unwrap();
        let b = session.load_recording(1_000, 100.0).unwrap();
        let overlays = session.overlays_mut();
        overlays.create("butterfly");
        overlays.add_member("butterfly", crate::ChannelRef { recording: a, channel: 0 });
        overlays.add_member("butterfly", crate::ChannelRef { recording: b, channel: 0 });
        session.unload_recording(a);
        let members = &session.overlays().get("butterfly").unwrap().members;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].recording, b);
    }
}
