// core/state.rs

// Cached state shared by the event handlers: last robot pose, last plans and the two
// success flags that gate optimization. Only the orchestrator writes it, one event at
// a time.

use log::info;

use crate::navigation::{AgentPathCollection, CoordinatedPlans, PathPlan};
use crate::ros_interface::PoseStamped;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BridgeState {
    robot_pose: Option<PoseStamped>,
    robot_plan: Option<PathPlan>,
    agent_paths: Option<AgentPathCollection>,
    robot_plan_ok: bool,
    agent_plan_ok: bool,
    cycles: u64,
}

impl BridgeState {
    /// Empty state: no pose, no plans, both flags false
    pub fn new() -> Self {
        BridgeState::default()
    }

    /// Last resolved robot pose, if any lookup has succeeded yet
    pub fn robot_pose(&self) -> Option<&PoseStamped> {
        self.robot_pose.as_ref()
    }

    pub fn set_robot_pose(&mut self, pose: PoseStamped) {
        self.robot_pose = Some(pose);
    }

    /// Caches the outcome of a planning cycle, superseding the previous one
    pub fn record_cycle(&mut self, plans: CoordinatedPlans) {
        self.robot_plan_ok = plans.robot_plan_ok();
        self.agent_plan_ok = plans.agent_plan_ok();
        self.robot_plan = Some(plans.robot_plan);
        self.agent_paths = Some(plans.agent_paths);
        self.cycles += 1;
        info!(
            "Planning cycle {}: robot plan ok={}, agent plan ok={}",
            self.cycles, self.robot_plan_ok, self.agent_plan_ok
        );
    }

    pub fn robot_plan(&self) -> Option<&PathPlan> {
        self.robot_plan.as_ref()
    }

    pub fn agent_paths(&self) -> Option<&AgentPathCollection> {
        self.agent_paths.as_ref()
    }

    pub fn robot_plan_ok(&self) -> bool {
        self.robot_plan_ok
    }

    pub fn agent_plan_ok(&self) -> bool {
        self.agent_plan_ok
    }

    /// Both cached plans succeeded
    pub fn plans_ready(&self) -> bool {
        self.robot_plan_ok && self.agent_plan_ok
    }

    /// Number of planning cycles recorded so far
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}
