//! Boundary to the external collaborators of the plan bridge
//!
//! This module describes everything that crosses the process edge:
//! - Inbound events (tracked agents, robot goal, on-demand re-optimization)
//! - Outbound request/response services (global planner, trajectory optimizer)
//! - The reference-frame lookup
//!
//! Transport is not implemented here. An adapter (ROS node, test fake, simulator)
//! implements the traits below and feeds events to an [`EventHandler`].

mod messages;
mod publisher;
mod subscriber;

use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

pub use messages::*;
pub use publisher::*;
pub use subscriber::*;

use crate::navigation::{AgentPathCollection, PathPlan};

/// Reference-frame lookup (the transform tree)
#[cfg_attr(test, mockall::automock)]
pub trait TransformLookup: Send {
    /// Transform that maps `source` coordinates into `target`.
    /// `at = None` asks for the latest available transform.
    fn lookup_transform(
        &mut self,
        target: &str,
        source: &str,
        at: Option<Stamp>,
    ) -> Result<TransformStamped, TransformError>;
}

/// Point-to-point global planning service
#[cfg_attr(test, mockall::automock)]
pub trait PlanningService: Send {
    /// Returns the planned poses, empty when the planner found no path
    fn make_plan(&mut self, request: &PlanRequest) -> Result<Vec<PoseStamped>, ServiceError>;
}

/// Human-aware trajectory optimization service
#[cfg_attr(test, mockall::automock)]
pub trait OptimizationService: Send {
    fn optimize(&mut self, request: &OptimizeRequest) -> Result<OptimizeResponse, ServiceError>;
}

/// Source of "now" for stamping headers
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send {
    fn now(&self) -> Stamp;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Stamp {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Stamp {
            sec: elapsed.as_secs() as i64,
            nanosec: elapsed.subsec_nanos(),
        }
    }
}

/// Request sent to the planning service
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub start: PoseStamped,
    pub goal: PoseStamped,
}

/// Request sent to the optimization service
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeRequest {
    pub robot_plan: PathPlan,
    pub agent_path_array: AgentPathCollection,
}

/// Reply of the optimization service
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeResponse {
    pub success: bool,
    pub message: String,
    pub cmd_vel: Twist,
}

/// Transform tree errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransformError {
    #[error("transform {target_frame} <- {source_frame} unavailable: {reason}")]
    Unavailable {
        target_frame: String,
        source_frame: String,
        reason: String,
    },
}

/// Service call errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ServiceError {
    /// The service could not be reached
    #[error("service {0} unavailable")]
    Unavailable(String),
    /// The reply could not be interpreted
    #[error("malformed reply from {service}: {detail}")]
    Malformed { service: String, detail: String },
}

fn is_root_namespace(namespace: &str) -> bool {
    namespace.is_empty() || namespace == "/"
}

/// Prefixes an outbound service name with the node namespace
pub fn namespaced_service(namespace: &str, service: &str) -> String {
    if is_root_namespace(namespace) {
        service.to_string()
    } else {
        let ns = namespace.trim_end_matches('/');
        format!("{}/{}", ns, service.trim_start_matches('/'))
    }
}

/// Robot base frame as it appears in the transform tree of a namespaced robot
pub fn namespaced_frame(namespace: &str, frame: &str) -> String {
    if is_root_namespace(namespace) {
        frame.to_string()
    } else {
        let ns = namespace.trim_matches('/');
        format!("{}/{}", ns, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "move_base/GlobalPlanner/make_plan", "move_base/GlobalPlanner/make_plan")]
    #[case("/", "move_base/GlobalPlanner/make_plan", "move_base/GlobalPlanner/make_plan")]
    #[case("/robot1", "move_base/GlobalPlanner/make_plan", "/robot1/move_base/GlobalPlanner/make_plan")]
    #[case("/robot1/", "optimize_srv", "/robot1/optimize_srv")]
    fn service_names_follow_namespace(#[case] ns: &str, #[case] service: &str, #[case] expected: &str) {
        assert_eq!(namespaced_service(ns, service), expected);
    }

    #[rstest]
    #[case("", "base_footprint", "base_footprint")]
    #[case("/", "base_footprint", "base_footprint")]
    #[case("/robot1", "base_footprint", "robot1/base_footprint")]
    fn base_frame_drops_leading_slash(#[case] ns: &str, #[case] frame: &str, #[case] expected: &str) {
        assert_eq!(namespaced_frame(ns, frame), expected);
    }

    #[test]
    fn system_clock_is_past_epoch() {
        assert!(SystemClock.now().sec > 0);
    }
}
