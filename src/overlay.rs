//! Butterfly plots: named groups of channels drawn overlaid in one panel.
//!
//! Members may come from different recordings. Groups only hold references;
//! amplitude data and paging stay with each recording.

use serde::{Deserialize, Serialize};

use crate::coordinator::RecordingId;

/// A channel of a loaded recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelRef {
    pub recording: RecordingId,
    pub channel: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayGroup {
    pub name: String,
    pub members: Vec<ChannelRef>,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayGroups {
    groups: Vec<OverlayGroup>,
}

impl OverlayGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[OverlayGroup] {
        &self.groups
    }

    pub fn get(&self, name: &str) -> Option<&OverlayGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Creates an empty group. Returns false if the name is taken.
    pub fn create(&mut self, name: &str) -> bool {
        if self.get(name).is_some() {
            return false;
        }
        self.groups.push(OverlayGroup {
            name: name.to_string(),
            members: Vec::new(),
        });
        true
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| g.name != name);
        before != self.groups.len()
    }

    /// Adds a channel to a group; duplicates are ignored.
    pub fn add_member(&mut self, name: &str, member: ChannelRef) -> bool {
        match self.groups.iter_mut().find(|g| g.name == name) {
            Some(group) if !group.members.contains(&member) => {
                group.members.push(member);
                true
            }
            _ => false,
        }
    }

    pub fn remove_member(&mut self, name: &str, member: ChannelRef) -> bool {
        match self.groups.iter_mut().find(|g| g.name == name) {
            Some(group) => {
                let before = group.members.len();
                group.members.retain(|m| *m != member);
                before != group.members.len()
            }
            None => false,
        }
    }

    /// Drops every member that belongs to `recording`. Empty groups stay.
    pub fn prune_recording(&mut self, recording: RecordingId) {
        for group in &mut self.groups {
            group.members.retain(|m| m.recording != recording);
        }
    }

    pub(crate) fn replace(&mut self, groups: Vec<OverlayGroup>) {
        self.groups = groups;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(recording: u64, channel: usize) -> ChannelRef {
        ChannelRef {
            recording: RecordingId::from_raw(recording),
            channel,
        }
    }

    #[test]
    fn test_group_membership() {
        let mut groups = OverlayGroups::new();
        assert!(groups.create("frontal"));
        assert!(!groups.create("frontal"));
        assert!(groups.add_member("frontal", member(1, 0)));
        assert!(!groups.add_member("frontal", member(1, 0)));
        assert!(!groups.add_member("missing", member(1, 0)));
        assert!(groups.add_member("frontal", member(2, 3)));
        assert!(groups.remove_member("frontal", member(1, 0)));
        assert_eq!(groups.get("frontal").unwrap().members, vec![member(2, 3)]);
        assert!(groups.remove("frontal"));
        assert!(groups.groups().is_empty());
    }

    #[test]
    fn test_prune_recording() {
        let mut groups = OverlayGroups::new();
        groups.create("all");
        groups.add_member("all", member(1, 0));
        groups.add_member("all", member(2, 0));
        groups.prune_recording(RecordingId::from_raw(1));
        assert_eq!(groups.get("all").unwrap().members, vec![member(2, 0)]);
    }
}
