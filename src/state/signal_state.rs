//! Decoded sample data for loaded recordings.
//!
//! The coordinator only knows sample counts and rates; amplitudes stay here,
//! keyed by the id the coordinator handed out.

use std::collections::HashMap;
use std::ops::Range;

use eegscope::{RecordingId, RecordingSource};

#[derive(Debug, Default)]
pub struct SignalState {
    sources: HashMap<RecordingId, RecordingSource>,
}

impl SignalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: RecordingId, source: RecordingSource) {
        self.sources.insert(id, source);
    }

    pub fn remove(&mut self, id: RecordingId) -> Option<RecordingSource> {
        self.sources.remove(&id)
    }

    pub fn clear(&mut self) {
        self.sources.clear();
    }

    pub fn get(&self, id: RecordingId) -> Option<&RecordingSource> {
        self.sources.get(&id)
    }

    /// Samples of one channel over `range`; empty when unknown.
    pub fn channel_samples(&self, id: RecordingId, channel: usize, range: Range<u64>) -> &[f32] {
        self.sources
            .get(&id)
            .map(|s| s.channel_samples(channel, range))
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eegscope::VirtualRecordingReader;

    #[test]
    fn test_insert_and_slice() {
        let mut signals = SignalState::new();
        let id = RecordingId::from_raw(1);
        let source = VirtualRecordingReader::with_config(2, 1.0, 100.0, 1).generate().unwrap();
        signals.insert(id, source);
        assert_eq!(signals.channel_samples(id, 1, 90..200).len(), 10);
        assert!(signals.channel_samples(RecordingId::from_raw(2), 0, 0..10).is_empty());
        assert!(signals.remove(id).is_some());
        assert!(signals.get(id).is_none());
    }
}
