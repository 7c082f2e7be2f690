// src/ros_interface/messages.rs
// Message shapes exchanged with the perception feed, the planner, the optimizer and
// the transform tree. They mirror the ROS geometry/nav messages so an adapter only
// has to copy fields across.

use nalgebra::{Isometry3, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Time stamp (seconds + nanoseconds)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Stamp {
    pub sec: i64,
    pub nanosec: u32,
}

impl Stamp {
    /// Builds a stamp from fractional seconds
    pub fn from_secs_f64(secs: f64) -> Self {
        let sec = secs.floor();
        let nanosec = ((secs - sec) * 1e9).round().min(999_999_999.0) as u32;
        Stamp { sec: sec as i64, nanosec }
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + self.nanosec as f64 * 1e-9
    }
}

/// Frame tag + stamp carried by every stamped message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub frame_id: String,
    pub stamp: Stamp,
}

impl Header {
    pub fn new(frame_id: impl Into<String>, stamp: Stamp) -> Self {
        Header {
            frame_id: frame_id.into(),
            stamp,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Quaternion::identity()
    }
}

impl Quaternion {
    pub fn identity() -> Self {
        Quaternion { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
    }

    /// Rotation of `yaw` radians about +z
    pub fn from_yaw(yaw: f64) -> Self {
        UnitQuaternion::from_euler_angles(0.0, 0.0, yaw).into()
    }

    pub fn yaw(&self) -> f64 {
        UnitQuaternion::from(*self).euler_angles().2
    }
}

impl From<Quaternion> for UnitQuaternion<f64> {
    fn from(q: Quaternion) -> Self {
        // A zero quaternion (uninitialised message) is read as identity.
        let raw = nalgebra::Quaternion::new(q.w, q.x, q.y, q.z);
        if raw.norm() <= f64::EPSILON {
            UnitQuaternion::identity()
        } else {
            UnitQuaternion::from_quaternion(raw)
        }
    }
}

impl From<UnitQuaternion<f64>> for Quaternion {
    fn from(q: UnitQuaternion<f64>) -> Self {
        Quaternion {
            x: q.i,
            y: q.j,
            z: q.k,
            w: q.w,
        }
    }
}

/// Position + orientation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point,
    pub orientation: Quaternion,
}

impl Pose {
    /// Planar pose at (x, y) facing `yaw`
    pub fn planar(x: f64, y: f64, yaw: f64) -> Self {
        Pose {
            position: Point { x, y, z: 0.0 },
            orientation: Quaternion::from_yaw(yaw),
        }
    }

    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::new(self.position.x, self.position.y, self.position.z),
            self.orientation.into(),
        )
    }

    pub fn from_isometry(iso: &Isometry3<f64>) -> Self {
        Pose {
            position: Point {
                x: iso.translation.x,
                y: iso.translation.y,
                z: iso.translation.z,
            },
            orientation: iso.rotation.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseStamped {
    pub header: Header,
    pub pose: Pose,
}

impl PoseStamped {
    pub fn new(header: Header, pose: Pose) -> Self {
        PoseStamped { header, pose }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointStamped {
    pub header: Header,
    pub point: Point,
}

/// Rigid transform between two frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vector3,
    pub rotation: Quaternion,
}

impl Transform {
    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::new(self.translation.x, self.translation.y, self.translation.z),
            self.rotation.into(),
        )
    }

    /// The pose of the child frame origin expressed in the parent frame
    pub fn as_pose(&self) -> Pose {
        Pose {
            position: Point {
                x: self.translation.x,
                y: self.translation.y,
                z: self.translation.z,
            },
            orientation: self.rotation,
        }
    }
}

/// Transform from `child_frame_id` into `header.frame_id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformStamped {
    pub header: Header,
    pub child_frame_id: String,
    pub transform: Transform,
}

/// Velocity command
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Twist {
    pub linear: Vector3,
    pub angular: Vector3,
}

impl fmt::Display for Twist {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "linear=({:.3}, {:.3}, {:.3}) angular=({:.3}, {:.3}, {:.3})",
            self.linear.x, self.linear.y, self.linear.z, self.angular.x, self.angular.y, self.angular.z
        )
    }
}

/// Labelled body part of a tracked entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentType {
    Head,
    #[default]
    Torso,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedSegment {
    pub segment_type: SegmentType,
    pub pose: Pose,
}

/// One entity reported by the tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedAgentMsg {
    pub track_id: u64,
    pub segments: Vec<TrackedSegment>,
}

/// Full perception snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackedAgents {
    pub header: Header,
    pub agents: Vec<TrackedAgentMsg>,
}
