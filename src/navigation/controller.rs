// src/navigation/controller.rs
// Forwards assembled plans to the trajectory optimizer and reports the outcome.
// Two call sites: live mode right after planning, and on-demand mode against cached
// plans (replaying the live collection or a single-pose fallback).

use log::{debug, info, warn};

use super::{AgentPathCollection, CoordinatedPlans, PathPlan};
use crate::core::{AgentId, BridgeState};
use crate::ros_interface::{Header, OptimizationService, OptimizeRequest, PoseStamped, Twist};

/// Outcome of one optimization call
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    pub success: bool,
    pub message: String,
    /// Only present when `success` is true
    pub velocity: Option<Twist>,
}

impl OptimizationResult {
    pub fn succeeded(message: impl Into<String>, velocity: Twist) -> Self {
        OptimizationResult {
            success: true,
            message: message.into(),
            velocity: Some(velocity),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        OptimizationResult {
            success: false,
            message: message.into(),
            velocity: None,
        }
    }
}

/// Which agent path collection an on-demand call sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentPathMode {
    /// Replay the last live collection
    Live,
    /// Single stationary path for the distinguished agent at its current pose
    Fallback,
}

impl AgentPathMode {
    pub fn from_flag(use_live_agent_paths: bool) -> Self {
        if use_live_agent_paths {
            AgentPathMode::Live
        } else {
            AgentPathMode::Fallback
        }
    }
}

/// Client side of the optimization service
pub struct OptimizationBridge {
    optimizer: Box<dyn OptimizationService>,
    service_name: String,
}

impl OptimizationBridge {
    pub fn new(optimizer: Box<dyn OptimizationService>, service_name: impl Into<String>) -> Self {
        OptimizationBridge {
            optimizer,
            service_name: service_name.into(),
        }
    }

    /// Sends one optimization request. Never retries.
    pub fn optimize(&mut self, robot_plan: &PathPlan, agent_paths: &AgentPathCollection) -> OptimizationResult {
        let request = OptimizeRequest {
            robot_plan: robot_plan.clone(),
            agent_path_array: agent_paths.clone(),
        };
        debug!(
            "Optimizing robot plan of {} poses against {} agent paths",
            robot_plan.len(),
            agent_paths.len()
        );

        match self.optimizer.optimize(&request) {
            Ok(response) if response.success => OptimizationResult::succeeded(response.message, response.cmd_vel),
            Ok(response) => {
                info!("Optimization failed !! {}", response.message);
                if response.message.is_empty() {
                    OptimizationResult::failed("Optimization failed..!!")
                } else {
                    OptimizationResult::failed(format!("Optimization failed..!! {}", response.message))
                }
            }
            Err(e) => {
                warn!("Optimization call to {} failed: {}", self.service_name, e);
                OptimizationResult::failed(format!("Optimization service call failed: {}", e))
            }
        }
    }

    /// Live mode: gated on both the robot plan and the distinguished agent's plan
    pub fn optimize_live(&mut self, plans: &CoordinatedPlans) -> Option<OptimizationResult> {
        if !(plans.robot_plan_ok() && plans.agent_plan_ok()) {
            info!(
                "Skipping optimization (robot plan ok: {}, agent plan ok: {})",
                plans.robot_plan_ok(),
                plans.agent_plan_ok()
            );
            return None;
        }
        Some(self.optimize(&plans.robot_plan, &plans.agent_paths))
    }

    /// On-demand mode against cached state. `None` means "not ready": a cached success
    /// flag is false, or the fallback has no pose for the distinguished agent.
    pub fn optimize_cached(
        &mut self,
        state: &BridgeState,
        mode: AgentPathMode,
        distinguished: Option<(AgentId, &PoseStamped)>,
        header: Header,
    ) -> Option<OptimizationResult> {
        if !state.plans_ready() {
            debug!("Cached plans not ready; on-demand optimization skipped");
            return None;
        }
        let robot_plan = state.robot_plan()?;

        match mode {
            AgentPathMode::Live => {
                let agent_paths = state.agent_paths()?;
                Some(self.optimize(robot_plan, agent_paths))
            }
            AgentPathMode::Fallback => {
                let Some((id, pose)) = distinguished else {
                    warn!("Distinguished agent is not tracked; fallback optimization skipped");
                    return None;
                };
                let fallback = fallback_collection(id, pose, header);
                Some(self.optimize(robot_plan, &fallback))
            }
        }
    }
}

/// Collection with exactly one entry: `id` holding position at `pose`
pub fn fallback_collection(id: AgentId, pose: &PoseStamped, header: Header) -> AgentPathCollection {
    let mut collection = AgentPathCollection::new(header);
    collection.insert(id, pose.header.clone(), vec![pose.clone()]);
    collection
}
