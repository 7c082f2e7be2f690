// core/perception.rs

// Holds the latest perception snapshot of tracked agents. Each raw entity contributes
// the pose of one canonical body part (torso by default); entities without it are
// dropped. Every update replaces the whole snapshot, so agents that vanished from the
// feed vanish here too.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::ros_interface::{Header, PoseStamped, SegmentType, Stamp, TrackedAgents};

/// Stable track identity reported by the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// One tracked agent and its pose in the common frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedAgent {
    pub id: AgentId,
    pub pose: PoseStamped,
}

pub struct AgentSnapshot {
    canonical_segment: SegmentType,
    common_frame: String,
    agents: BTreeMap<AgentId, TrackedAgent>,
    stamp: Option<Stamp>,
}

impl AgentSnapshot {
    /// Creates an empty snapshot selecting `canonical_segment` from each entity
    pub fn new(canonical_segment: SegmentType, common_frame: impl Into<String>) -> Self {
        AgentSnapshot {
            canonical_segment,
            common_frame: common_frame.into(),
            agents: BTreeMap::new(),
            stamp: None,
        }
    }

    /// Replaces the snapshot with the entities of `raw`, re-stamped into the common
    /// frame at `stamp`. If a track id repeats, the later entity wins.
    pub fn update(&mut self, raw: &TrackedAgents, stamp: Stamp) -> &BTreeMap<AgentId, TrackedAgent> {
        let mut next = BTreeMap::new();

        for entity in &raw.agents {
            let Some(segment) = entity
                .segments
                .iter()
                .find(|segment| segment.segment_type == self.canonical_segment)
            else {
                debug!("Track {} has no {:?} segment; skipped", entity.track_id, self.canonical_segment);
                continue;
            };

            let id = AgentId(entity.track_id);
            let pose = PoseStamped::new(Header::new(self.common_frame.clone(), stamp), segment.pose);
            next.insert(id, TrackedAgent { id, pose });
        }

        // Swap in one step; readers never see a partial snapshot
        self.agents = next;
        self.stamp = Some(stamp);
        debug!("Agent snapshot updated: {} agents", self.agents.len());
        &self.agents
    }

    /// Current pose of agent `id`
    pub fn get(&self, id: AgentId) -> Option<&TrackedAgent> {
        self.agents.get(&id)
    }

    /// Agents in identity order
    pub fn iter(&self) -> impl Iterator<Item = &TrackedAgent> {
        self.agents.values()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Stamp of the last update
    pub fn stamp(&self) -> Option<Stamp> {
        self.stamp
    }
}


// Weaknesses:
// - Only one body part per agent is kept; head orientation is lost when torso is canonical.
// - Poses are re-tagged into the common frame, not transformed; the tracker must already
//   publish in that frame.

// Current Functionality:
// - Selects one canonical segment per tracked entity.
// - Replaces the snapshot wholesale on every perception event.
// - Provides lookup by agent identity and ordered iteration for planning.
