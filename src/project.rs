//! Project files: which recordings and event files were open, how they were
//! displayed, and where the session was looking.
//!
//! Only user choices are stored. Page ranges and the browsable index are
//! recomputed from the reopened files on restore.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::channel_catalog::SavedChannel;
use crate::coordinator::{MultiRecordingCoordinator, RecordingId};
use crate::error::DecodeError;
use crate::event_track::{EventCodeState, EventTrack};
use crate::overlay::{ChannelRef, OverlayGroup};
use crate::recording_window::{ViewMode, DEFAULT_TIME_SCALE_MS};
use crate::traits::{EventFileReader, RecordingDecoder, RecordingSource};

pub const PROJECT_VERSION: u32 = 1;

pub const DEFAULT_BACKGROUND: [u8; 3] = [255, 255, 255];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectEventFile {
    pub path: PathBuf,
    pub code_states: Vec<EventCodeState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecording {
    pub path: PathBuf,
    pub data_offset: f64,
    pub channels: Vec<SavedChannel>,
    pub event_files: Vec<ProjectEventFile>,
    /// Index into `event_files`
    pub active_event_file: Option<usize>,
}

/// Overlay member addressed by position in [`ProjectFile::recordings`],
/// since recording ids do not survive a restart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectOverlayMember {
    pub recording: usize,
    pub channel: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectOverlayGroup {
    pub name: String,
    pub members: Vec<ProjectOverlayMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub version: u32,
    pub recordings: Vec<ProjectRecording>,
    #[serde(default)]
    pub overlays: Vec<ProjectOverlayGroup>,
    pub time_scale_ms: u64,
    pub view_mode: ViewMode,
    pub current_page: usize,
    pub focused_index: Option<usize>,
    pub background_color: [u8; 3],
}

impl Default for ProjectFile {
    fn default() -> Self {
        Self {
            version: PROJECT_VERSION,
            recordings: Vec::new(),
            overlays: Vec::new(),
            time_scale_ms: DEFAULT_TIME_SCALE_MS,
            view_mode: ViewMode::Paged,
            current_page: 1,
            focused_index: None,
            background_color: DEFAULT_BACKGROUND,
        }
    }
}

/// A recording listed in a project that could not be reopened.
#[derive(Debug, Clone)]
pub struct SkippedRecording {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of [`ProjectFile::restore`]: decoded sources keyed by their new
/// ids, plus the recordings that were unavailable.
#[derive(Debug, Default)]
pub struct RestoreReport {
    pub loaded: Vec<(RecordingId, RecordingSource)>,
    pub skipped: Vec<SkippedRecording>,
}

impl ProjectFile {
    /// Snapshot of a session. Recordings and event tracks without a file on
    /// disk cannot be reopened and are left out.
    pub fn capture(session: &MultiRecordingCoordinator, background_color: [u8; 3]) -> Self {
        let mut recordings = Vec::new();
        let mut positions: Vec<(RecordingId, usize)> = Vec::new();

        for recording in session.recordings() {
            let Some(path) = recording.path() else {
                debug!("recording {} has no file, not saved in project", recording.id());
                continue;
            };

            let mut event_files = Vec::new();
            let mut active_event_file = None;
            for (i, track) in recording.tracks().iter().enumerate() {
                let Some(track_path) = track.source_path() else {
                    debug!("event track {} of {} has no file, not saved", i, recording.id());
                    continue;
                };
                if recording.active_track_index() == Some(i) {
                    active_event_file = Some(event_files.len());
                }
                event_files.push(ProjectEventFile {
                    path: track_path.clone(),
                    code_states: track.code_states().to_vec(),
                });
            }

            positions.push((recording.id(), recordings.len()));
            recordings.push(ProjectRecording {
                path: path.clone(),
                data_offset: recording.data_offset(),
                channels: recording.channels().to_saved(),
                event_files,
                active_event_file,
            });
        }

        let position_of = |id: RecordingId| {
            positions
                .iter()
                .find(|(candidate, _)| *candidate == id)
                .map(|(_, pos)| *pos)
        };
        let overlays = session
            .overlays()
            .groups()
            .iter()
            .map(|group| ProjectOverlayGroup {
                name: group.name.clone(),
                members: group
                    .members
                    .iter()
                    .filter_map(|m| {
                        position_of(m.recording).map(|recording| ProjectOverlayMember {
                            recording,
                            channel: m.channel,
                        })
                    })
                    .collect(),
            })
            .collect();

        Self {
            version: PROJECT_VERSION,
            recordings,
            overlays,
            time_scale_ms: session.time_scale_ms(),
            view_mode: session.view_mode(),
            current_page: session.current_page(),
            focused_index: session.focused_index(),
            background_color,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create project file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).context("Failed to serialize project")?;
        writer.flush().context("Failed to flush project file")?;
        info!("saved project with {} recordings to {}", self.recordings.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open project file: {}", path.display()))?;
        let project: ProjectFile = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse project file: {}", path.display()))?;
        if project.version != PROJECT_VERSION {
            bail!(
                "Unsupported project version {} (expected {})",
                project.version,
                PROJECT_VERSION
            );
        }
        Ok(project)
    }

    /// Reopens every recording into `session` and replays the saved view.
    ///
    /// A recording that fails to decode is skipped and reported; the rest of
    /// the project still loads. An unreadable event file is skipped the same
    /// way without dropping its recording.
    pub fn restore<F>(
        &self,
        session: &mut MultiRecordingCoordinator,
        decoder_for: F,
        event_reader: &dyn EventFileReader,
    ) -> RestoreReport
    where
        F: Fn(&Path) -> Result<Box<dyn RecordingDecoder>, DecodeError>,
    {
        let mut report = RestoreReport::default();
        let mut ids: Vec<Option<RecordingId>> = Vec::with_capacity(self.recordings.len());

        for saved in &self.recordings {
            match self.restore_recording(saved, session, &decoder_for, event_reader) {
                Ok((id, source)) => {
                    ids.push(Some(id));
                    report.loaded.push((id, source));
                }
                Err(reason) => {
                    warn!("recording unavailable, skipped: {}: {}", saved.path.display(), reason);
                    ids.push(None);
                    report.skipped.push(SkippedRecording {
                        path: saved.path.clone(),
                        reason,
                    });
                }
            }
        }

        let groups = self
            .overlays
            .iter()
            .map(|group| OverlayGroup {
                name: group.name.clone(),
                members: group
                    .members
                    .iter()
                    .filter_map(|m| {
                        ids.get(m.recording).copied().flatten().map(|recording| ChannelRef {
                            recording,
                            channel: m.channel,
                        })
                    })
                    .collect(),
            })
            .collect();
        session.overlays_mut().replace(groups);

        session.set_global_time_scale(self.time_scale_ms);
        match self.view_mode {
            ViewMode::Paged => {
                session.goto_page(self.current_page);
            }
            ViewMode::EventFocused => {
                if session.set_view_mode(ViewMode::EventFocused) {
                    session.focus_on_browsable_index(self.focused_index.unwrap_or(0));
                } else {
                    warn!("no browsable events after restore, staying in paged view");
                }
            }
        }

        info!(
            "restored project: {} recordings loaded, {} skipped",
            report.loaded.len(),
            report.skipped.len()
        );
        report
    }

    fn restore_recording<F>(
        &self,
        saved: &ProjectRecording,
        session: &mut MultiRecordingCoordinator,
        decoder_for: &F,
        event_reader: &dyn EventFileReader,
    ) -> std::result::Result<(RecordingId, RecordingSource), String>
    where
        F: Fn(&Path) -> Result<Box<dyn RecordingDecoder>, DecodeError>,
    {
        let decoder = decoder_for(&saved.path).map_err(|e| e.to_string())?;
        let source = decoder.read(&saved.path).map_err(|e| e.to_string())?;
        let id = session
            .load_described(&source.info, Some(saved.path.clone()))
            .map_err(|e| e.to_string())?;

        if let Some(channels) = session.channels_mut(id) {
            let matched = channels.apply_saved(&saved.channels);
            if matched < saved.channels.len() {
                debug!(
                    "{} of {} saved channels matched in {}",
                    matched,
                    saved.channels.len(),
                    saved.path.display()
                );
            }
        }
        session.set_data_offset(id, saved.data_offset);

        for (i, event_file) in saved.event_files.iter().enumerate() {
            let raw = match event_reader.read_events(&event_file.path) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("event file skipped: {}: {}", event_file.path.display(), e);
                    continue;
                }
            };
            let track = EventTrack::load_with_states(raw, &event_file.code_states)
                .with_source_path(event_file.path.clone());
            if let Some(index) = session.attach_event_track(id, track) {
                if saved.active_event_file == Some(i) {
                    session.set_active_track(id, index);
                }
            }
        }

        Ok((id, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_track::RawEvent;
    use crate::virtual_reader::VirtualRecordingReader;

    struct FixedEvents(Vec<RawEvent>);

    impl EventFileReader for FixedEvents {
        fn read_events(&self, path: &Path) -> std::result::Result<Vec<RawEvent>, DecodeError> {
            if path.ends_with("missing.evt") {
                return Err(DecodeError::UnsupportedFormat("missing".to_string()));
            }
            Ok(self.0.clone())
        }
    }

    fn virtual_decoder(path: &Path) -> std::result::Result<Box<dyn RecordingDecoder>, DecodeError> {
        if path.ends_with("broken.eegj") {
            return Err(DecodeError::UnsupportedFormat(path.display().to_string()));
        }
        Ok(Box::new(VirtualRecordingReader::with_config(2, 60.0, 100.0, 3)))
    }

    fn saved_recording(path: &str) -> ProjectRecording {
        ProjectRecording {
            path: PathBuf::from(path),
            data_offset: 0.0,
            channels: Vec::new(),
            event_files: Vec::new(),
            active_event_file: None,
        }
    }

    #[test]
    fn test_unavailable_recording_is_skipped() {
        let project = ProjectFile {
            recordings: vec![saved_recording("a.eegj"), saved_recording("broken.eegj")],
            overlays: vec![ProjectOverlayGroup {
                name: "all".to_string(),
                members: vec![
                    ProjectOverlayMember { recording: 0, channel: 1 },
                    ProjectOverlayMember { recording: 1, channel: 0 },
                ],
            }],
            ..ProjectFile::default()
        };

        let mut session = MultiRecordingCoordinator::new();
        let report = project.restore(&mut session, virtual_decoder, &FixedEvents(Vec::new()));
        assert_eq!(report.loaded.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, PathBuf::from("broken.eegj"));
        assert_eq!(session.recordings().len(), 1);
        assert_eq!(session.overlays().get("all").unwrap().members.len(), 1);
    }

    #[test]
    fn test_capture_restore_reproduces_view() {
        let events = vec![RawEvent::new(1_000, 1, 0), RawEvent::new(4_000, 2, 0)];
        let mut recording = saved_recording("a.eegj");
        recording.data_offset = 12.5;
        recording.channels = vec![SavedChannel {
            label: "Fp2".to_string(),
            displayed: false,
            amplitude_max: 50.0,
        }];
        recording.event_files = vec![
            ProjectEventFile {
                path: PathBuf::from("missing.evt"),
                code_states: Vec::new(),
            },
            ProjectEventFile {
                path: PathBuf::from("a.evt"),
                code_states: vec![EventCodeState {
                    code: 1,
                    visible: true,
                    browsable: false,
                }],
            },
        ];
        recording.active_event_file = Some(1);

        let project = ProjectFile {
            recordings: vec![recording],
            time_scale_ms: 5_000,
            view_mode: ViewMode::EventFocused,
            focused_index: Some(0),
            background_color: [0, 0, 0],
            ..ProjectFile::default()
        };

        let mut session = MultiRecordingCoordinator::new();
        let report = project.restore(&mut session, virtual_decoder, &FixedEvents(events));
        assert!(report.skipped.is_empty());

        let loaded = &session.recordings()[0];
        assert_eq!(loaded.data_offset(), 12.5);
        let fp2 = loaded.channels().index_of("Fp2").unwrap();
        assert!(!loaded.channels().get(fp2).unwrap().displayed);
        assert_eq!(loaded.tracks().len(), 1);

        // Code 1 is not browsable, so the only entry is the 40 s event.
        assert_eq!(session.view_mode(), ViewMode::EventFocused);
        assert_eq!(session.time_scale_ms(), 5_000);
        let w = loaded.window();
        assert_eq!((w.lower_sample(), w.upper_sample()), (3_750, 4_250));

        let captured = ProjectFile::capture(&session, [0, 0, 0]);
        assert_eq!(captured.recordings[0].event_files.len(), 1);
        assert_eq!(captured.recordings[0].active_event_file, Some(0));
        assert_eq!(captured.focused_index, Some(0));
        assert_eq!(captured.view_mode, ViewMode::EventFocused);

        let json = serde_json::to_string(&captured).unwrap();
        let parsed: ProjectFile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, captured);
    }

    #[test]
    fn test_capture_skips_recordings_without_file() {
        let mut session = MultiRecordingCoordinator::new();
        session.load_recording(1_000, 100.0).unwrap();
        let project = ProjectFile::capture(&session, DEFAULT_BACKGROUND);
        assert!(project.recordings.is_empty());
        assert_eq!(project.time_scale_ms, DEFAULT_TIME_SCALE_MS);
    }
}
