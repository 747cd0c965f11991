//! Asynchronous recording loading.
//!
//! Decodes a recording (and its sidecar event file, if any) on a background
//! thread so the GUI stays responsive. Results are handed to the UI thread
//! whole; the viewing core never sees the worker.

use eframe::egui;
use eegscope::{
    decoder_for_path, sidecar_event_path, EventFileReader, RawEvent, RecordingSource,
    TextEventReader, VirtualRecordingReader,
};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use crate::io::LoadingState;

/// A decoded recording plus the events read next to it.
pub struct LoadedFile {
    pub source: RecordingSource,
    pub events: Option<Vec<RawEvent>>,
    /// Where `events` came from; None for generated events
    pub event_path: Option<PathBuf>,
}

/// Result of a completed loading operation.
pub enum LoadResult {
    Success {
        loaded: LoadedFile,
        /// None for virtual recordings
        path: Option<PathBuf>,
    },
    Error(String),
    /// No loading operation finished since the last check
    None,
}

/// Manages asynchronous loading of recording files.
pub struct AsyncLoader {
    loading_state: Arc<Mutex<LoadingState>>,
    loading_receiver: Option<Receiver<Result<LoadedFile, String>>>,
    pending_load_path: Option<PathBuf>,
}

impl AsyncLoader {
    pub fn new() -> Self {
        Self {
            loading_state: Arc::new(Mutex::new(LoadingState::new())),
            loading_receiver: None,
            pending_load_path: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading_state
            .lock()
            .map(|state| state.in_progress)
            .unwrap_or(false)
    }

    /// Starts decoding `path` on a background thread.
    ///
    /// Call [`Self::check_completion`] once per frame to pick up the result.
    ///
    /// # Arguments
    /// * `path` - Recording file to decode
    /// * `ctx` - egui context, repainted when loading completes
    pub fn start_file_load(&mut self, path: PathBuf, ctx: &egui::Context) {
        let (sender, receiver) = channel();
        self.loading_receiver = Some(receiver);
        set_in_progress(&self.loading_state, true);
        self.pending_load_path = Some(path.clone());

        let loading_state = Arc::clone(&self.loading_state);
        let ctx_handle = ctx.clone();

        thread::spawn(move || {
            let result = load_file(&path);
            let _ = sender.send(result);
            set_in_progress(&loading_state, false);
            ctx_handle.request_repaint();
        });
    }

    /// Generates a synthetic recording with events, synchronously.
    pub fn load_virtual_recording(&mut self) -> Result<LoadedFile, String> {
        let reader = VirtualRecordingReader::new();
        let source = reader.generate().map_err(|e| e.to_string())?;
        Ok(LoadedFile {
            source,
            events: Some(reader.generate_events()),
            event_path: None,
        })
    }

    /// Returns the finished load, if any. Called once per frame.
    pub fn check_completion(&mut self) -> LoadResult {
        if let Some(receiver) = &self.loading_receiver {
            if let Ok(result) = receiver.try_recv() {
                let load_result = match result {
                    Ok(loaded) => LoadResult::Success {
                        loaded,
                        path: self.pending_load_path.take(),
                    },
                    Err(error_msg) => {
                        self.pending_load_path = None;
                        LoadResult::Error(error_msg)
                    }
                };
                self.loading_receiver = None;
                return load_result;
            }
        }

        LoadResult::None
    }
}

impl Default for AsyncLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn set_in_progress(state: &Mutex<LoadingState>, in_progress: bool) {
    if let Ok(mut state) = state.lock() {
        state.in_progress = in_progress;
    }
}

fn load_file(path: &Path) -> Result<LoadedFile, String> {
    let decoder = decoder_for_path(path).map_err(|e| e.to_string())?;
    let source = decoder.read(path).map_err(|e| e.to_string())?;

    let mut loaded = LoadedFile {
        source,
        events: None,
        event_path: None,
    };
    if let Some(event_path) = sidecar_event_path(path).filter(|p| p.exists()) {
        match TextEventReader::new().read_events(&event_path) {
            Ok(events) => {
                info!("attached sidecar events {}", event_path.display());
                loaded.events = Some(events);
                loaded.event_path = Some(event_path);
            }
            Err(e) => warn!("ignoring sidecar events {}: {}", event_path.display(), e),
        }
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_async_loader_creation() {
        let loader = AsyncLoader::new();
        assert!(!loader.is_loading());
    }

    #[test]
    fn test_virtual_recording_loading() {
        let mut loader = AsyncLoader::new();
        let loaded = loader.load_virtual_recording().unwrap();
        assert!(loaded.source.info.sample_count > 0);
        assert!(loaded.events.is_some_and(|events| !events.is_empty()));
        assert!(loaded.event_path.is_none());
    }

    #[test]
    fn test_check_completion_when_idle() {
        let mut loader = AsyncLoader::new();
        assert!(matches!(loader.check_completion(), LoadResult::None));
    }
}
