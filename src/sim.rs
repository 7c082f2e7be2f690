// src/sim.rs
// In-process stand-ins for the external collaborators: a fake robot transform
// broadcaster, a straight-line global planner and a proportional "optimizer". Used by
// the demo binary and the integration tests; none of them is a real algorithm.

use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::ros_interface::{
    Header, OptimizationService, OptimizeRequest, OptimizeResponse, PlanRequest, PlanningService, Pose,
    PoseStamped, Quaternion, ServiceError, Stamp, Transform, TransformError, TransformLookup,
    TransformStamped, Twist, Vector3,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct FakeTf {
    parent: String,
    child: String,
    robot: Option<Pose>,
    lookups: usize,
}

/// Publishes a single `parent -> child` transform that can be moved or withdrawn.
/// Clones share the same transform.
#[derive(Clone)]
pub struct FakeRobotTransform {
    inner: Arc<Mutex<FakeTf>>,
}

impl FakeRobotTransform {
    pub fn new(parent: impl Into<String>, child: impl Into<String>, robot: Pose) -> Self {
        FakeRobotTransform {
            inner: Arc::new(Mutex::new(FakeTf {
                parent: parent.into(),
                child: child.into(),
                robot: Some(robot),
                lookups: 0,
            })),
        }
    }

    /// Nothing published yet, like a transform tree at startup
    pub fn unavailable(parent: impl Into<String>, child: impl Into<String>) -> Self {
        let tf = FakeRobotTransform::new(parent, child, Pose::default());
        tf.withdraw();
        tf
    }

    pub fn set_pose(&self, robot: Pose) {
        lock(&self.inner).robot = Some(robot);
    }

    pub fn withdraw(&self) {
        lock(&self.inner).robot = None;
    }

    /// Number of lookups served or refused so far
    pub fn lookups(&self) -> usize {
        lock(&self.inner).lookups
    }
}

impl TransformLookup for FakeRobotTransform {
    fn lookup_transform(
        &mut self,
        target: &str,
        source: &str,
        at: Option<Stamp>,
    ) -> Result<TransformStamped, TransformError> {
        let mut tf = lock(&self.inner);
        tf.lookups += 1;

        let unavailable = |reason: &str| TransformError::Unavailable {
            target_frame: target.to_string(),
            source_frame: source.to_string(),
            reason: reason.to_string(),
        };

        if target != tf.parent || source != tf.child {
            return Err(unavailable("frames are not connected"));
        }
        let robot = tf.robot.ok_or_else(|| unavailable("transform not published yet"))?;

        Ok(TransformStamped {
            header: Header::new(tf.parent.clone(), at.unwrap_or_default()),
            child_frame_id: tf.child.clone(),
            transform: Transform {
                translation: Vector3 {
                    x: robot.position.x,
                    y: robot.position.y,
                    z: robot.position.z,
                },
                rotation: robot.orientation,
            },
        })
    }
}

/// Most poses a straight-line plan may hold
const MAX_PLAN_POSES: usize = 100_000;

/// Interpolates a straight line from start to goal, one pose every `step` metres.
/// Every request is recorded for inspection.
#[derive(Clone)]
pub struct StraightLinePlanner {
    step: f64,
    requests: Arc<Mutex<Vec<PlanRequest>>>,
}

impl StraightLinePlanner {
    pub fn new(step: f64) -> Self {
        StraightLinePlanner {
            step: step.max(1e-3),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<PlanRequest> {
        lock(&self.requests).clone()
    }
}

impl PlanningService for StraightLinePlanner {
    fn make_plan(&mut self, request: &PlanRequest) -> Result<Vec<PoseStamped>, ServiceError> {
        lock(&self.requests).push(request.clone());

        let start = request.start.pose.position;
        let goal = request.goal.pose.position;
        let (dx, dy, dz) = (goal.x - start.x, goal.y - start.y, goal.z - start.z);
        let length = (dx * dx + dy * dy + dz * dz).sqrt();
        let heading = if length > 0.0 {
            Quaternion::from_yaw(dy.atan2(dx))
        } else {
            request.goal.pose.orientation
        };
        let steps = (length / self.step).ceil().max(1.0);
        if !length.is_finite() || steps >= MAX_PLAN_POSES as f64 {
            return Err(ServiceError::Malformed {
                service: "straight_line_planner".to_string(),
                detail: format!("cannot interpolate a path of length {} m", length),
            });
        }
        let steps = steps as usize;

        let mut poses = Vec::with_capacity(steps + 1);
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let mut pose = Pose {
                position: start,
                orientation: heading,
            };
            pose.position.x += dx * t;
            pose.position.y += dy * t;
            pose.position.z += dz * t;
            if i == steps {
                pose.orientation = request.goal.pose.orientation;
            }
            poses.push(PoseStamped::new(request.goal.header.clone(), pose));
        }

        debug!("Straight-line plan with {} poses", poses.len());
        Ok(poses)
    }
}

/// Steers toward the second pose of the robot plan with proportional gains.
/// Every request is recorded for inspection.
#[derive(Clone)]
pub struct ProportionalOptimizer {
    linear_gain: f64,
    angular_gain: f64,
    max_linear: f64,
    requests: Arc<Mutex<Vec<OptimizeRequest>>>,
}

impl ProportionalOptimizer {
    pub fn new(linear_gain: f64, angular_gain: f64, max_linear: f64) -> Self {
        ProportionalOptimizer {
            linear_gain,
            angular_gain,
            max_linear,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<OptimizeRequest> {
        lock(&self.requests).clone()
    }
}

impl Default for ProportionalOptimizer {
    fn default() -> Self {
        ProportionalOptimizer::new(0.8, 1.5, 0.5)
    }
}

impl OptimizationService for ProportionalOptimizer {
    fn optimize(&mut self, request: &OptimizeRequest) -> Result<OptimizeResponse, ServiceError> {
        lock(&self.requests).push(request.clone());

        let poses = &request.robot_plan.poses;
        let Some(first) = poses.first() else {
            return Ok(OptimizeResponse {
                success: false,
                message: "empty robot plan".to_string(),
                cmd_vel: Twist::default(),
            });
        };
        let target = poses.get(1).unwrap_or(first);

        // Target expressed in the robot's own frame
        let local = first.pose.to_isometry().inverse() * target.pose.to_isometry();
        let (x, y) = (local.translation.x, local.translation.y);

        let cmd_vel = Twist {
            linear: Vector3 {
                x: (self.linear_gain * x).clamp(-self.max_linear, self.max_linear),
                y: 0.0,
                z: 0.0,
            },
            angular: Vector3 {
                x: 0.0,
                y: 0.0,
                z: self.angular_gain * y.atan2(x.max(1e-6)),
            },
        };

        Ok(OptimizeResponse {
            success: true,
            message: format!(
                "Optimized {} robot poses against {} agent paths",
                poses.len(),
                request.agent_path_array.len()
            ),
            cmd_vel,
        })
    }
}
