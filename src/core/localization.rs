// core/localization.rs

// Resolves the robot pose in the common reference frame by looking up the transform
// from the robot base frame. A failed lookup (typically at startup, before the tree is
// populated) is reported, followed by a bounded wait; there is no retry loop here, the
// next perception event simply asks again.

use log::{debug, warn};
use std::thread;
use std::time::Duration;

use crate::ros_interface::{Header, PoseStamped, TransformLookup};
use crate::BridgeError;

pub struct PoseFrameResolver {
    lookup: Box<dyn TransformLookup>,
    common_frame: String,
    robot_base_frame: String,
    backoff: Duration,
}

impl PoseFrameResolver {
    /// `robot_base_frame` must already carry any namespace prefix
    pub fn new(
        lookup: Box<dyn TransformLookup>,
        common_frame: impl Into<String>,
        robot_base_frame: impl Into<String>,
        backoff: Duration,
    ) -> Self {
        PoseFrameResolver {
            lookup,
            common_frame: common_frame.into(),
            robot_base_frame: robot_base_frame.into(),
            backoff,
        }
    }

    pub fn robot_base_frame(&self) -> &str {
        &self.robot_base_frame
    }

    /// Latest robot pose in the common frame.
    /// On failure the caller keeps its previous pose.
    pub fn resolve_robot_pose(&mut self) -> Result<PoseStamped, BridgeError> {
        match self
            .lookup
            .lookup_transform(&self.common_frame, &self.robot_base_frame, None)
        {
            Ok(tf) => {
                let pose = PoseStamped::new(
                    Header::new(self.common_frame.clone(), tf.header.stamp),
                    tf.transform.as_pose(),
                );
                debug!(
                    "Robot pose: x={:.3}, y={:.3}, yaw={:.3}",
                    pose.pose.position.x,
                    pose.pose.position.y,
                    pose.pose.orientation.yaw()
                );
                Ok(pose)
            }
            Err(e) => {
                warn!("{}", e);
                if !self.backoff.is_zero() {
                    thread::sleep(self.backoff);
                }
                Err(BridgeError::TransformUnavailable(e))
            }
        }
    }
}
