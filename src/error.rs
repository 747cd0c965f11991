//! Error types at the boundary between file decoding and the paging core.
//!
//! Decoder failures are kept distinct from "valid but empty" results so the
//! viewer can report a recording as unavailable without ever constructing
//! window state for it. Everything past this boundary clamps instead of failing.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while decoding a recording or event file.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported recording format: {0}")]
    UnsupportedFormat(String),

    #[error("unsupported format version '{found}' (expected {expected})")]
    UnsupportedVersion { found: String, expected: &'static str },

    #[error("malformed content at line {line}: {message}")]
    Malformed { line: usize, message: String },
}

impl DecodeError {
    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        DecodeError::Malformed {
            line,
            message: message.into(),
        }
    }
}

/// A decoded tuple that cannot back a [`crate::RecordingWindow`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordingError {
    #[error("recording has no samples")]
    Empty,

    #[error("invalid sampling frequency {0} Hz")]
    InvalidSamplingFrequency(f64),
}
