// src/navigation/prediction.rs
// Synthetic short-horizon goal for the distinguished agent: a point a fixed distance
// directly behind the robot, so the agent's predicted destination trails the robot.
// This is a heuristic, not a motion model.

use nalgebra::{Isometry3, Translation3};

use crate::ros_interface::{Header, Pose, PoseStamped, Stamp};

/// Default distance (metres) behind the robot
pub const DEFAULT_BEHIND_OFFSET: f64 = 0.5;

/// Places the predicted goal behind the robot along its heading
#[derive(Debug, Clone, PartialEq)]
pub struct GoalPredictor {
    behind_offset: f64,
    common_frame: String,
}

impl GoalPredictor {
    /// Creates a predictor placing goals `behind_offset` metres behind the robot
    pub fn new(behind_offset: f64, common_frame: impl Into<String>) -> Self {
        GoalPredictor {
            behind_offset,
            common_frame: common_frame.into(),
        }
    }

    pub fn behind_offset(&self) -> f64 {
        self.behind_offset
    }

    /// Composes the robot transform with a pure translation of `-behind_offset` along
    /// the robot's local x axis. The offset carries no rotation, so the goal keeps
    /// the robot's orientation.
    pub fn predict_goal(&self, robot_pose: &Pose, stamp: Stamp) -> PoseStamped {
        let behind = Isometry3::from_parts(
            Translation3::new(-self.behind_offset, 0.0, 0.0),
            nalgebra::UnitQuaternion::identity(),
        );
        let goal = robot_pose.to_isometry() * behind;

        PoseStamped::new(
            Header::new(self.common_frame.clone(), stamp),
            Pose::from_isometry(&goal),
        )
    }
}

impl Default for GoalPredictor {
    fn default() -> Self {
        GoalPredictor::new(DEFAULT_BEHIND_OFFSET, crate::DEFAULT_COMMON_FRAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[rstest]
    #[case(1.0, 0.0, 0.0, 0.5, 0.0)]
    #[case(0.0, 0.0, FRAC_PI_2, 0.0, -0.5)]
    #[case(2.0, 2.0, PI, 2.5, 2.0)]
    #[case(-1.0, 3.0, -FRAC_PI_2, -1.0, 3.5)]
    fn goal_trails_the_robot(
        #[case] x: f64,
        #[case] y: f64,
        #[case] yaw: f64,
        #[case] expected_x: f64,
        #[case] expected_y: f64,
    ) {
        let predictor = GoalPredictor::default();
        let goal = predictor.predict_goal(&Pose::planar(x, y, yaw), Stamp::default());

        assert!((goal.pose.position.x - expected_x).abs() < 1e-9, "x = {}", goal.pose.position.x);
        assert!((goal.pose.position.y - expected_y).abs() < 1e-9, "y = {}", goal.pose.position.y);
        assert!((goal.pose.orientation.yaw() - Pose::planar(x, y, yaw).orientation.yaw()).abs() < 1e-9);
        assert_eq!(goal.header.frame_id, "map");
    }

    #[test]
    fn offset_is_configurable() {
        let predictor = GoalPredictor::new(1.5, "world");
        let goal = predictor.predict_goal(&Pose::planar(0.0, 0.0, 0.0), Stamp { sec: 4, nanosec: 0 });
        assert!((goal.pose.position.x + 1.5).abs() < 1e-9);
        assert_eq!(goal.header.frame_id, "world");
        assert_eq!(goal.header.stamp.sec, 4);
    }
}
