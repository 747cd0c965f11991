use std::f64::consts::TAU;
use std::path::Path;

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::DecodeError;
use crate::event_track::RawEvent;
use crate::traits::{
    ChannelDescriptor, EventFileReader, RecordingDecoder, RecordingInfo, RecordingSource,
};

const DEFAULT_CHANNELS: usize = 8;
const DEFAULT_DURATION_S: f64 = 120.0;
const DEFAULT_SAMPLING_FREQUENCY_HZ: f64 = 256.0;

static TEN_TWENTY_LABELS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "Fp1", "Fp2", "F7", "F3", "Fz", "F4", "F8", "T7", "C3", "Cz", "C4", "T8", "P7", "P3",
        "Pz", "P4", "P8", "O1", "Oz", "O2",
    ]
});

/// Generates a reproducible synthetic recording and matching event triples.
///
/// Each channel is a mix of alpha (10 Hz) and theta (6 Hz) rhythms with a
/// per-channel phase plus uniform noise, in microvolts. Events are spaced
/// 0.5-4 s apart with codes 1-4; roughly one in ten is rejected.
/// The path passed to the reader traits is ignored.
pub struct VirtualRecordingReader {
    channels: usize,
    duration_s: f64,
    sampling_frequency_hz: f64,
    seed: u64,
}

impl Default for VirtualRecordingReader {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualRecordingReader {
    pub fn new() -> Self {
        Self {
            channels: DEFAULT_CHANNELS,
            duration_s: DEFAULT_DURATION_S,
            sampling_frequency_hz: DEFAULT_SAMPLING_FREQUENCY_HZ,
            seed: 42,
        }
    }

    pub fn with_config(channels: usize, duration_s: f64, sampling_frequency_hz: f64, seed: u64) -> Self {
        Self {
            channels,
            duration_s,
            sampling_frequency_hz,
            seed,
        }
    }

    pub fn sample_count(&self) -> u64 {
        (self.duration_s * self.sampling_frequency_hz).round().max(0.0) as u64
    }

    pub fn generate(&self) -> Result<RecordingSource, DecodeError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let n = self.sample_count() as usize;
        let fs = self.sampling_frequency_hz;

        let channels: Vec<ChannelDescriptor> = (0..self.channels)
            .map(|i| ChannelDescriptor::new(channel_label(i), "uV"))
            .collect();

        let samples: Vec<Vec<f32>> = (0..self.channels)
            .map(|_| {
                let phase = rng.gen_range(0.0..TAU);
                let alpha = rng.gen_range(10.0..30.0);
                let theta = rng.gen_range(5.0..15.0);
                (0..n)
                    .map(|t| {
                        let time = t as f64 / fs;
                        let value = alpha * (TAU * 10.0 * time + phase).sin()
                            + theta * (TAU * 6.0 * time).sin()
                            + rng.gen_range(-5.0..5.0);
                        value as f32
                    })
                    .collect()
            })
            .collect();

        let info = RecordingInfo {
            sample_count: n as u64,
            sampling_frequency_hz: fs,
            channels,
        };
        RecordingSource::new(info, samples)
    }

    pub fn generate_events(&self) -> Vec<RawEvent> {
        // Separate stream so event positions do not depend on channel count.
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(1));
        let n = self.sample_count();
        let fs = self.sampling_frequency_hz;
        let mut events = Vec::new();
        let mut t = rng.gen_range(0.5..2.0) * fs;
        while (t as u64) < n {
            let code = rng.gen_range(1..=4);
            let reject = u8::from(rng.gen_bool(0.1));
            events.push(RawEvent::new(t as u64, code, reject));
            t += rng.gen_range(0.5..4.0) * fs;
        }
        events
    }
}

fn channel_label(index: usize) -> String {
    match TEN_TWENTY_LABELS.get(index) {
        Some(label) => label.to_string(),
        None => format!("E{}", index + 1),
    }
}

impl RecordingDecoder for VirtualRecordingReader {
    fn read(&self, _path: &Path) -> Result<RecordingSource, DecodeError> {
        self.generate()
    }
}

impl EventFileReader for VirtualRecordingReader {
    fn read_events(&self, _path: &Path) -> Result<Vec<RawEvent>, DecodeError> {
        Ok(self.generate_events())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_reproducible() {
        let reader = VirtualRecordingReader::with_config(3, 10.0, 100.0, 7);
        let a = reader.generate().unwrap();
        let b = reader.generate().unwrap();
        assert_eq!(a.info, b.info);
        assert_eq!(a.channel_samples(2, 0..1000), b.channel_samples(2, 0..1000));
        assert_eq!(reader.generate_events(), reader.generate_events());
    }

    #[test]
    fn test_shape_and_labels() {
        let reader = VirtualRecordingReader::with_config(22, 2.0, 250.0, 1);
        let source = reader.generate().unwrap();
        assert_eq!(source.info.sample_count, 500);
        assert_eq!(source.channel_count(), 22);
        assert_eq!(source.info.channels[0].label, "Fp1");
        assert_eq!(source.info.channels[21].label, "E22");
    }

    #[test]
    fn test_events_fall_inside_recording() {
        let reader = VirtualRecordingReader::new();
        let events = reader.generate_events();
        assert!(!events.is_empty());
        assert!(events.iter().all(|e| e.sample < reader.sample_count()));
        assert!(events.iter().all(|e| (1..=4).contains(&e.code)));
    }
}
