//! Sorted event list of one event file plus its per-code display state.
//!
//! Events are kept in ascending `sample` order at all times; every code that
//! appears in the list has exactly one [`EventCodeState`]. Both invariants are
//! checked with `debug_assert!` after each mutation since they can only break
//! through a bug here, never through external input after [`EventTrack::load`].

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Range;
use std::path::PathBuf;

use log::debug;
use serde::{Deserialize, Serialize};

/// Accept/reject flag of a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AcceptState {
    #[default]
    Accepted,
    Rejected,
}

impl AcceptState {
    /// Maps the event-file reject flag: `0` is accepted, anything else rejected.
    pub fn from_reject_flag(flag: u8) -> Self {
        if flag == 0 {
            AcceptState::Accepted
        } else {
            AcceptState::Rejected
        }
    }

    pub fn reject_flag(self) -> u8 {
        match self {
            AcceptState::Accepted => 0,
            AcceptState::Rejected => 1,
        }
    }
}

/// A raw `(sample, code, reject)` triple as read from an event file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub sample: u64,
    pub code: i32,
    pub reject: u8,
}

impl RawEvent {
    pub fn new(sample: u64, code: i32, reject: u8) -> Self {
        Self { sample, code, reject }
    }
}

/// One marker in a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub sample: u64,
    pub code: i32,
    pub accept: AcceptState,
}

/// Display state shared by all events with the same code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCodeState {
    pub code: i32,
    pub visible: bool,
    pub browsable: bool,
}

impl EventCodeState {
    pub fn new(code: i32) -> Self {
        Self {
            code,
            visible: true,
            browsable: true,
        }
    }
}

/// Events of one event file.
#[derive(Debug, Clone, Default)]
pub struct EventTrack {
    events: Vec<Event>,
    code_states: Vec<EventCodeState>,
    source_path: Option<PathBuf>,
    /// Bumped whenever the set of browsable events may have changed.
    revision: u64,
}

impl EventTrack {
    /// Builds a track from unsorted triples.
    ///
    /// The sort is stable, so events sharing a sample keep their file order.
    /// Every distinct code starts visible and browsable.
    pub fn load(raw: impl IntoIterator<Item = RawEvent>) -> Self {
        Self::load_with_states(raw, &[])
    }

    /// Like [`Self::load`], restoring saved per-code states for codes that
    /// occur in the file. Saved states for absent codes are dropped.
    pub fn load_with_states(
        raw: impl IntoIterator<Item = RawEvent>,
        saved_states: &[EventCodeState],
    ) -> Self {
        let mut events: Vec<Event> = raw
            .into_iter()
            .map(|r| Event {
                sample: r.sample,
                code: r.code,
                accept: AcceptState::from_reject_flag(r.reject),
            })
            .collect();
        events.sort_by_key(|e| e.sample);

        let saved: HashMap<i32, &EventCodeState> =
            saved_states.iter().map(|s| (s.code, s)).collect();
        let mut seen = HashSet::new();
        let mut code_states = Vec::new();
        for event in &events {
            if seen.insert(event.code) {
                let state = saved
                    .get(&event.code)
                    .map(|s| **s)
                    .unwrap_or_else(|| EventCodeState::new(event.code));
                code_states.push(state);
            }
        }
        code_states.sort_by_key(|s| s.code);

        let track = Self {
            events,
            code_states,
            source_path: None,
            revision: 0,
        };
        track.debug_check_invariants();
        track
    }

    pub fn with_source_path(mut self, path: PathBuf) -> Self {
        self.source_path = Some(path);
        self
    }

    // ===== Queries =====

    pub fn source_path(&self) -> Option<&PathBuf> {
        self.source_path.as_ref()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    pub fn code_states(&self) -> &[EventCodeState] {
        &self.code_states
    }

    pub fn code_state(&self, code: i32) -> Option<&EventCodeState> {
        self.code_states.iter().find(|s| s.code == code)
    }

    pub fn is_visible(&self, code: i32) -> bool {
        self.code_state(code).is_some_and(|s| s.visible)
    }

    pub fn is_browsable(&self, code: i32) -> bool {
        self.code_state(code).is_some_and(|s| s.browsable)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Index range of events with `lower <= sample < upper`.
    ///
    /// Two binary searches, so re-querying on every pan or zoom stays
    /// `O(log n)` regardless of track size.
    pub fn range_indices(&self, lower: u64, upper: u64) -> Range<usize> {
        let start = self.events.partition_point(|e| e.sample < lower);
        if upper <= lower {
            return start..start;
        }
        let end = start + self.events[start..].partition_point(|e| e.sample < upper);
        start..end
    }

    /// Events with `lower <= sample < upper`, in ascending sample order.
    pub fn events_in_range(&self, lower: u64, upper: u64) -> &[Event] {
        &self.events[self.range_indices(lower, upper)]
    }

    /// In-range events whose code is visible, with their track indices.
    pub fn visible_events_in_range(
        &self,
        lower: u64,
        upper: u64,
    ) -> impl Iterator<Item = (usize, &Event)> + '_ {
        let range = self.range_indices(lower, upper);
        let offset = range.start;
        self.events[range]
            .iter()
            .enumerate()
            .map(move |(i, e)| (offset + i, e))
            .filter(move |(_, e)| self.is_visible(e.code))
    }

    /// All events whose code is browsable, with their track indices.
    pub fn browsable_events(&self) -> impl Iterator<Item = (usize, &Event)> + '_ {
        let browsable: HashSet<i32> = self
            .code_states
            .iter()
            .filter(|s| s.browsable)
            .map(|s| s.code)
            .collect();
        self.events
            .iter()
            .enumerate()
            .filter(move |(_, e)| browsable.contains(&e.code))
    }

    /// Number of events per code, ordered by code.
    pub fn code_counts(&self) -> BTreeMap<i32, usize> {
        let mut counts = BTreeMap::new();
        for event in &self.events {
            *counts.entry(event.code).or_insert(0) += 1;
        }
        counts
    }

    // ===== Mutations =====

    /// Inserts an event after any existing events at the same sample.
    ///
    /// A previously unknown code gets a state with the given flags.
    /// Returns the index of the new event.
    pub fn add_event(&mut self, sample: u64, code: i32, visible: bool, browsable: bool) -> usize {
        let index = self.events.partition_point(|e| e.sample <= sample);
        self.events.insert(
            index,
            Event {
                sample,
                code,
                accept: AcceptState::Accepted,
            },
        );
        if self.code_state(code).is_none() {
            self.push_code_state(EventCodeState {
                code,
                visible,
                browsable,
            });
        }
        self.revision += 1;
        self.debug_check_invariants();
        index
    }

    /// Removes every event whose code is in `codes`, and their code states.
    /// Unknown codes are ignored. Returns the number of events removed.
    pub fn delete_events_by_code(&mut self, codes: &[i32]) -> usize {
        let codes: HashSet<i32> = codes.iter().copied().collect();
        let before = self.events.len();
        self.events.retain(|e| !codes.contains(&e.code));
        self.code_states.retain(|s| !codes.contains(&s.code));
        let removed = before - self.events.len();
        if removed > 0 {
            debug!("deleted {} events for codes {:?}", removed, codes);
        }
        self.revision += 1;
        self.debug_check_invariants();
        removed
    }

    /// Rewrites event codes according to `(old, new)` pairs.
    ///
    /// The mapping is applied simultaneously: each event is looked up once by
    /// its original code. Old code states are dropped; a new code that already
    /// had a state keeps it (events merge silently into it), a new code without
    /// one gets a default visible/browsable state. Sample order is untouched.
    pub fn recode_events_by_code(&mut self, mapping: &[(i32, i32)]) -> usize {
        let map: HashMap<i32, i32> = mapping
            .iter()
            .copied()
            .filter(|(old, new)| old != new)
            .collect();
        if map.is_empty() {
            return 0;
        }

        let mut recoded = 0;
        for event in &mut self.events {
            if let Some(&new) = map.get(&event.code) {
                event.code = new;
                recoded += 1;
            }
        }

        let targets: HashSet<i32> = map.values().copied().collect();
        self.code_states
            .retain(|s| !map.contains_key(&s.code) || targets.contains(&s.code));
        // A code that is both source and target only keeps its state if it
        // still has events mapped onto it.
        let present: HashSet<i32> = self.events.iter().map(|e| e.code).collect();
        self.code_states
            .retain(|s| !map.contains_key(&s.code) || present.contains(&s.code));
        for &new in &targets {
            if present.contains(&new) && self.code_state(new).is_none() {
                self.push_code_state(EventCodeState::new(new));
            }
        }

        self.revision += 1;
        self.debug_check_invariants();
        recoded
    }

    /// Returns false when the code is unknown.
    pub fn set_code_visibility(&mut self, code: i32, visible: bool) -> bool {
        match self.code_states.iter_mut().find(|s| s.code == code) {
            Some(state) => {
                state.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Returns false when the code is unknown.
    pub fn set_code_browsability(&mut self, code: i32, browsable: bool) -> bool {
        match self.code_states.iter_mut().find(|s| s.code == code) {
            Some(state) => {
                if state.browsable != browsable {
                    state.browsable = browsable;
                    self.revision += 1;
                }
                true
            }
            None => false,
        }
    }

    /// Sets one event's accept/reject flag. Returns false for a bad index.
    pub fn accept_reject(&mut self, index: usize, state: AcceptState) -> bool {
        match self.events.get_mut(index) {
            Some(event) => {
                event.accept = state;
                true
            }
            None => false,
        }
    }

    /// Snapshot of the track as raw triples, in sample order.
    pub fn to_raw(&self) -> Vec<RawEvent> {
        self.events
            .iter()
            .map(|e| RawEvent::new(e.sample, e.code, e.accept.reject_flag()))
            .collect()
    }

    // ===== Internals =====

    fn push_code_state(&mut self, state: EventCodeState) {
        let at = self.code_states.partition_point(|s| s.code < state.code);
        self.code_states.insert(at, state);
    }

    /// Sorted by sample, one state per code in use, no duplicate states.
    pub fn invariants_hold(&self) -> bool {
        let sorted = self.events.windows(2).all(|w| w[0].sample <= w[1].sample);
        let mut state_codes = HashSet::new();
        let unique_states = self.code_states.iter().all(|s| state_codes.insert(s.code));
        let covered = self.events.iter().all(|e| state_codes.contains(&e.code));
        sorted && unique_states && covered
    }

    fn debug_check_invariants(&self) {
        debug_assert!(self.invariants_hold(), "event track invariant violated");
    }
}
