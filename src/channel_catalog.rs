//! Per-recording channel table.

use serde::{Deserialize, Serialize};

use crate::traits::ChannelDescriptor;

/// Amplitude bound given to channels with no saved display range.
pub const DEFAULT_AMPLITUDE_MAX: f64 = 100.0;

/// Display settings of one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelEntry {
    pub label: String,
    pub unit: String,
    /// Upper bound of the symmetric display range `[-max, max]`
    pub amplitude_max: f64,
    pub displayed: bool,
}

impl ChannelEntry {
    pub fn display_range(&self) -> (f64, f64) {
        (-self.amplitude_max, self.amplitude_max)
    }
}

/// Saved display settings of one channel, matched back by label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedChannel {
    pub label: String,
    pub displayed: bool,
    pub amplitude_max: f64,
}

/// Ordered channel table of one recording, in decoder order.
#[derive(Debug, Clone, Default)]
pub struct ChannelCatalog {
    channels: Vec<ChannelEntry>,
}

impl ChannelCatalog {
    /// All channels displayed with the default amplitude bound.
    pub fn from_descriptors(descriptors: &[ChannelDescriptor]) -> Self {
        let channels = descriptors
            .iter()
            .map(|d| ChannelEntry {
                label: d.label.clone(),
                unit: d.unit.clone(),
                amplitude_max: DEFAULT_AMPLITUDE_MAX,
                displayed: true,
            })
            .collect();
        Self { channels }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn channels(&self) -> &[ChannelEntry] {
        &self.channels
    }

    pub fn get(&self, index: usize) -> Option<&ChannelEntry> {
        self.channels.get(index)
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.channels.iter().position(|c| c.label == label)
    }

    /// Indices of displayed channels, in catalog order.
    pub fn displayed_indices(&self) -> Vec<usize> {
        self.channels
            .iter()
            .enumerate()
            .filter(|(_, c)| c.displayed)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn set_displayed(&mut self, index: usize, displayed: bool) -> bool {
        match self.channels.get_mut(index) {
            Some(channel) => {
                channel.displayed = displayed;
                true
            }
            None => false,
        }
    }

    pub fn set_all_displayed(&mut self, displayed: bool) {
        for channel in &mut self.channels {
            channel.displayed = displayed;
        }
    }

    /// Non-positive or non-finite bounds are rejected.
    pub fn set_amplitude_max(&mut self, index: usize, amplitude_max: f64) -> bool {
        if !amplitude_max.is_finite() || amplitude_max <= 0.0 {
            return false;
        }
        match self.channels.get_mut(index) {
            Some(channel) => {
                channel.amplitude_max = amplitude_max;
                true
            }
            None => false,
        }
    }

    pub fn to_saved(&self) -> Vec<SavedChannel> {
        self.channels
            .iter()
            .map(|c| SavedChannel {
                label: c.label.clone(),
                displayed: c.displayed,
                amplitude_max: c.amplitude_max,
            })
            .collect()
    }

    /// Applies saved settings to channels with matching labels.
    /// Returns how many saved entries matched.
    pub fn apply_saved(&mut self, saved: &[SavedChannel]) -> usize {
        let mut matched = 0;
        for entry in saved {
            if let Some(index) = self.index_of(&entry.label) {
                self.channels[index].displayed = entry.displayed;
                self.set_amplitude_max(index, entry.amplitude_max);
                matched += 1;
            }
        }
        matched
    }
}
