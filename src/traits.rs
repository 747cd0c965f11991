use std::ops::Range;
use std::path::Path;

use crate::error::DecodeError;
use crate::event_track::RawEvent;

/// Label and physical unit of one channel as reported by a decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDescriptor {
    pub label: String,
    pub unit: String,
}

impl ChannelDescriptor {
    pub fn new(label: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            unit: unit.into(),
        }
    }
}

/// The tuple the paging core consumes from a decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingInfo {
    pub sample_count: u64,
    pub sampling_frequency_hz: f64,
    pub channels: Vec<ChannelDescriptor>,
}

/// A fully decoded recording: its description plus one sample vector per channel.
#[derive(Debug, Clone)]
pub struct RecordingSource {
    pub info: RecordingInfo,
    /// `samples[channel][sample]`, each of length `info.sample_count`
    samples: Vec<Vec<f32>>,
}

impl RecordingSource {
    /// Builds a source, checking the per-channel vectors against the header.
    pub fn new(info: RecordingInfo, samples: Vec<Vec<f32>>) -> Result<Self, DecodeError> {
        if samples.len() != info.channels.len() {
            return Err(DecodeError::malformed(
                0,
                format!(
                    "{} channels declared but {} sample vectors decoded",
                    info.channels.len(),
                    samples.len()
                ),
            ));
        }
        if let Some((ch, data)) = samples
            .iter()
            .enumerate()
            .find(|(_, data)| data.len() as u64 != info.sample_count)
        {
            return Err(DecodeError::malformed(
                0,
                format!(
                    "channel {} has {} samples, expected {}",
                    ch,
                    data.len(),
                    info.sample_count
                ),
            ));
        }
        Ok(Self { info, samples })
    }

    pub fn channel_count(&self) -> usize {
        self.samples.len()
    }

    /// Samples of one channel in `range`, clipped to the recording length.
    pub fn channel_samples(&self, channel: usize, range: Range<u64>) -> &[f32] {
        match self.samples.get(channel) {
            Some(data) => {
                let end = (range.end as usize).min(data.len());
                let start = (range.start as usize).min(end);
                &data[start..end]
            }
            None => &[],
        }
    }
}

/// Decodes a recording file into a [`RecordingSource`].
///
/// Implementations must report every failure as a [`DecodeError`]; a recording
/// that decodes to zero channels is a valid result, not an error.
pub trait RecordingDecoder: Send {
    fn read(&self, path: &Path) -> Result<RecordingSource, DecodeError>;
}

/// Reads `(sample, code, reject)` triples from an event file, in file order.
pub trait EventFileReader: Send {
    fn read_events(&self, path: &Path) -> Result<Vec<RawEvent>, DecodeError>;
}
