//! HATEB plan bridge - reactive orchestration for human-aware navigation
//!
//! This library keeps a frame-consistent picture of the robot and the tracked agents
//! around it, predicts a short-horizon goal for one distinguished agent, requests
//! global plans for the robot and that agent, and forwards the assembled paths to a
//! trajectory optimizer that produces a velocity command.
//!
//! The planner, the optimizer, the tracker and the transform tree are external
//! collaborators, reached through the traits in [`ros_interface`].

#![warn(unused_extern_crates)]

pub mod core;
pub mod navigation;
pub mod ros_interface;
pub mod sim;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

// Re-export commonly used items for easier access
pub use crate::core::{AgentId, AgentSnapshot, BridgeState, Collaborators, Orchestrator, OrchestratorFacade, PoseFrameResolver};
pub use navigation::{
    AgentPathCollection, AgentPathMode, GoalPredictor, OptimizationBridge, OptimizationResult, PathPlan,
    PlanCoordinator,
};
pub use ros_interface::{Event, EventHandler, EventQueue, TriggerResponse};

/// Frame every exchanged pose is expressed in
pub const DEFAULT_COMMON_FRAME: &str = "map";
/// Robot base frame before namespacing
pub const DEFAULT_ROBOT_BASE_FRAME: &str = "base_footprint";
/// Node name used by hosts that register the bridge
pub const NODE_NAME: &str = "hateb_plan_bridge";
/// Longest wait (s) allowed after a failed transform lookup
pub const MAX_BACKOFF_SECS: f64 = 60.0;

/// Main configuration structure for the plan bridge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Frame naming
    pub frames: FrameConfig,
    /// Distinguished agent and goal prediction
    pub prediction: PredictionConfig,
    /// Transform lookup behaviour
    pub transform: TransformConfig,
    /// Service names
    pub services: ServiceConfig,
    /// Topic names
    pub topics: TopicConfig,
}

/// Frame naming
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Common reference frame
    pub common_frame: String,
    /// Robot base frame (without namespace)
    pub robot_base_frame: String,
    /// Deployment namespace, empty or "/" for none
    pub namespace: String,
}

impl Default for FrameConfig {
    fn default() -> Self {
        FrameConfig {
            common_frame: DEFAULT_COMMON_FRAME.to_string(),
            robot_base_frame: DEFAULT_ROBOT_BASE_FRAME.to_string(),
            namespace: String::new(),
        }
    }
}

/// Distinguished agent and goal prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Track id of the agent that gets a predicted goal and a real plan
    pub distinguished_agent_id: u64,
    /// Body part whose pose stands for the agent
    pub canonical_segment: ros_interface::SegmentType,
    /// Distance (m) behind the robot where the predicted goal is placed
    pub behind_offset: f64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        PredictionConfig {
            distinguished_agent_id: 1,
            canonical_segment: ros_interface::SegmentType::Torso,
            behind_offset: navigation::prediction::DEFAULT_BEHIND_OFFSET,
        }
    }
}

/// Transform lookup behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Wait (s) after a failed lookup, 0 to disable
    pub backoff_secs: f64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        TransformConfig { backoff_secs: 1.0 }
    }
}

/// Service names (outbound ones get the namespace prefix)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Global planning service
    pub get_plan: String,
    /// Trajectory optimization service
    pub optimize: String,
    /// On-demand re-optimization entry point (advertised, private)
    pub reoptimize: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            get_plan: "move_base/GlobalPlanner/make_plan".to_string(),
            optimize: "move_base/HATebLocalPlannerROS/optimize".to_string(),
            reoptimize: "optimize_srv".to_string(),
        }
    }
}

/// Topic names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    /// Perception feed
    pub tracked_agents: String,
    /// Robot goal feed
    pub robot_goal: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        TopicConfig {
            tracked_agents: "/tracked_agents".to_string(),
            robot_goal: "/clicked_point".to_string(),
        }
    }
}

impl BridgeConfig {
    /// Parses a YAML document; missing fields take their defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self, BridgeError> {
        let config: BridgeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let file = std::fs::File::open(path)?;
        let config: BridgeConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the bridge cannot run with
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.frames.common_frame.trim().is_empty() {
            return Err(BridgeError::Config("common_frame must not be empty".into()));
        }
        if self.frames.robot_base_frame.trim().is_empty() {
            return Err(BridgeError::Config("robot_base_frame must not be empty".into()));
        }
        let offset = self.prediction.behind_offset;
        if !offset.is_finite() || offset < 0.0 {
            return Err(BridgeError::Config(format!("behind_offset must be >= 0, got {}", offset)));
        }
        self.backoff()?;
        Ok(())
    }

    /// Wait after a failed transform lookup, bounded by [`MAX_BACKOFF_SECS`]
    pub fn backoff(&self) -> Result<Duration, BridgeError> {
        let secs = self.transform.backoff_secs;
        if !(0.0..=MAX_BACKOFF_SECS).contains(&secs) {
            return Err(BridgeError::Config(format!(
                "backoff_secs must be within [0, {}], got {}",
                MAX_BACKOFF_SECS, secs
            )));
        }
        Duration::try_from_secs_f64(secs).map_err(|e| BridgeError::Config(format!("backoff_secs: {}", e)))
    }

    /// Robot base frame with the namespace applied
    pub fn robot_base_frame(&self) -> String {
        ros_interface::namespaced_frame(&self.frames.namespace, &self.frames.robot_base_frame)
    }

    pub fn planning_service_name(&self) -> String {
        ros_interface::namespaced_service(&self.frames.namespace, &self.services.get_plan)
    }

    pub fn optimization_service_name(&self) -> String {
        ros_interface::namespaced_service(&self.frames.namespace, &self.services.optimize)
    }
}

/// Plan bridge error types
///
/// Planning and optimization failures are not errors at this level: they surface as
/// `PathPlan::succeeded() == false` and `OptimizationResult::success == false`.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
    /// Configuration could not be parsed
    #[error("Configuration parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Configuration file could not be read
    #[error("Configuration read error: {0}")]
    Io(#[from] std::io::Error),
    /// Robot pose lookup failed
    #[error(transparent)]
    TransformUnavailable(#[from] ros_interface::TransformError),
    /// An inbound pose is not in the common frame
    #[error("Frame mismatch: expected '{expected}', got '{found}'")]
    FrameMismatch { expected: String, found: String },
    /// A handler panicked while holding the orchestrator lock
    #[error("Orchestrator state poisoned")]
    StatePoisoned,
}
