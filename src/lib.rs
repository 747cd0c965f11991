pub mod error;
pub mod traits;
pub mod parser;
pub mod writer;
pub mod event_file;
pub mod virtual_reader;
pub mod recording_window;
pub mod event_track;
pub mod channel_catalog;
pub mod overlay;
pub mod coordinator;
pub mod project;

// Errors
pub use error::{DecodeError, RecordingError};

// Decoder seam
pub use traits::{
    ChannelDescriptor, EventFileReader, RecordingDecoder, RecordingInfo, RecordingSource,
};

// File formats
pub use parser::{decoder_for_path, EegjReader, EEGJ_VERSION};
pub use writer::RecordingWriter;
pub use event_file::{sidecar_event_path, write_event_file, TextEventReader};
pub use virtual_reader::VirtualRecordingReader;

// Viewing core
pub use recording_window::{
    RecordingWindow, StepDirection, ViewMode, DEFAULT_TIME_SCALE_MS, MIN_TIME_SCALE_MS,
};
pub use event_track::{AcceptState, Event, EventCodeState, EventTrack, RawEvent};
pub use channel_catalog::{ChannelCatalog, ChannelEntry, SavedChannel};
pub use overlay::{ChannelRef, OverlayGroup, OverlayGroups};
pub use coordinator::{
    BrowsableEntry, BrowsableEventIndex, LoadedRecording, MultiRecordingCoordinator,
    RecordingId, ViewChange,
};

// Persistence
pub use project::{ProjectFile, RestoreReport, SkippedRecording};
