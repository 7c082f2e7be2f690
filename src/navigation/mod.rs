//! Navigation side of the plan bridge
//!
//! This module builds the requests sent to the global planner and the trajectory
//! optimizer, and holds the plans that travel between them:
//! - [`GoalPredictor`]: short-horizon goal for the distinguished agent
//! - [`PlanCoordinator`]: robot plan + agent path collection
//! - [`OptimizationBridge`]: live / fallback optimization requests

pub mod controller;
pub mod planner;
pub mod prediction;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::AgentId;
use crate::ros_interface::{Header, PoseStamped};

pub use controller::{AgentPathMode, OptimizationBridge, OptimizationResult};
pub use planner::{CoordinatedPlans, PlanCoordinator};
pub use prediction::GoalPredictor;

/// Whose plan this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanOwner {
    /// The robot itself
    Robot,
    /// A tracked agent
    Agent(AgentId),
}

/// Ordered poses returned by the planner for one owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPlan {
    /// Owner of the plan
    pub owner: PlanOwner,
    /// Planned poses, possibly empty
    pub poses: Vec<PoseStamped>,
}

impl PathPlan {
    /// Create a plan from planner output
    pub fn new(owner: PlanOwner, poses: Vec<PoseStamped>) -> Self {
        PathPlan { owner, poses }
    }

    /// Plan standing for a failed or unreachable planner
    pub fn failed(owner: PlanOwner) -> Self {
        PathPlan::new(owner, Vec::new())
    }

    /// Zero-length path holding a single pose
    pub fn stationary(owner: PlanOwner, pose: PoseStamped) -> Self {
        PathPlan::new(owner, vec![pose])
    }

    /// A plan succeeded iff it has at least one pose
    pub fn succeeded(&self) -> bool {
        !self.poses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

/// Path of one agent inside a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPath {
    /// Header of the path (frame + stamp)
    pub header: Header,
    /// Agent identity
    pub id: AgentId,
    /// The path itself
    pub plan: PathPlan,
}

/// Agent identity -> path, under a common header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPathCollection {
    /// Common frame + stamp
    pub header: Header,
    /// One path per agent
    pub paths: BTreeMap<AgentId, AgentPath>,
}

impl AgentPathCollection {
    /// Create an empty collection
    pub fn new(header: Header) -> Self {
        AgentPathCollection {
            header,
            paths: BTreeMap::new(),
        }
    }

    /// Insert (or replace) the path of `id`
    pub fn insert(&mut self, id: AgentId, header: Header, poses: Vec<PoseStamped>) {
        let plan = PathPlan::new(PlanOwner::Agent(id), poses);
        self.paths.insert(id, AgentPath { header, id, plan });
    }

    pub fn get(&self, id: AgentId) -> Option<&AgentPath> {
        self.paths.get(&id)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ros_interface::{Pose, Stamp};

    fn stamped(x: f64) -> PoseStamped {
        PoseStamped::new(Header::new("map", Stamp::default()), Pose::planar(x, 0.0, 0.0))
    }

    #[test]
    fn success_follows_contents() {
        assert!(!PathPlan::failed(PlanOwner::Robot).succeeded());
        assert!(PathPlan::stationary(PlanOwner::Robot, stamped(1.0)).succeeded());
        assert!(PathPlan::new(PlanOwner::Agent(AgentId(3)), vec![stamped(0.0), stamped(1.0)]).succeeded());
    }

    #[test]
    fn insert_replaces_existing_entry() {
        let mut collection = AgentPathCollection::new(Header::new("map", Stamp::default()));
        collection.insert(AgentId(1), Header::default(), vec![stamped(0.0)]);
        collection.insert(AgentId(1), Header::default(), vec![stamped(1.0), stamped(2.0)]);

        assert_eq!(collection.len(), 1);
        let path = collection.get(AgentId(1)).unwrap();
        assert_eq!(path.plan.len(), 2);
        assert_eq!(path.plan.owner, PlanOwner::Agent(AgentId(1)));
    }
}
