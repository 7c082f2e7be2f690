// core/mod.rs

// The state-keeping half of the bridge: robot pose resolution, the agent snapshot, the
// cached plan state and the orchestrator that owns them and reacts to events.

pub mod api;
pub mod localization;
pub mod perception;
pub mod state;

pub use api::OrchestratorFacade;
pub use localization::PoseFrameResolver;
pub use perception::{AgentId, AgentSnapshot, TrackedAgent};
pub use state::BridgeState;

use log::{info, warn};

use crate::navigation::{AgentPathMode, GoalPredictor, OptimizationBridge, OptimizationResult, PlanCoordinator};
use crate::ros_interface::{
    Clock, EventHandler, Header, LogSink, OptimizationService, PlanningService, PointStamped, Pose,
    PoseStamped, ResultSink, SystemClock, TrackedAgents, TransformLookup,
};
use crate::{BridgeConfig, BridgeError};

/// External collaborators the orchestrator talks to
pub struct Collaborators {
    pub transforms: Box<dyn TransformLookup>,
    pub planner: Box<dyn PlanningService>,
    pub optimizer: Box<dyn OptimizationService>,
    pub clock: Box<dyn Clock>,
    pub sink: Box<dyn ResultSink>,
}

impl Collaborators {
    /// Wall clock and log sink by default
    pub fn new(
        transforms: Box<dyn TransformLookup>,
        planner: Box<dyn PlanningService>,
        optimizer: Box<dyn OptimizationService>,
    ) -> Self {
        Collaborators {
            transforms,
            planner,
            optimizer,
            clock: Box::new(SystemClock),
            sink: Box::new(LogSink),
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn ResultSink>) -> Self {
        self.sink = sink;
        self
    }
}

// Orchestrator: owns every component plus the cached state, one handler per event
pub struct Orchestrator {
    config: BridgeConfig,
    resolver: PoseFrameResolver,
    snapshot: AgentSnapshot,
    coordinator: PlanCoordinator,
    bridge: OptimizationBridge,
    state: BridgeState,
    clock: Box<dyn Clock>,
    sink: Box<dyn ResultSink>,
}

impl Orchestrator {
    /// Validates `config` and wires the components to `collaborators`
    pub fn new(config: BridgeConfig, collaborators: Collaborators) -> Result<Self, BridgeError> {
        config.validate()?;

        let common_frame = config.frames.common_frame.clone();
        let resolver = PoseFrameResolver::new(
            collaborators.transforms,
            common_frame.clone(),
            config.robot_base_frame(),
            config.backoff()?,
        );
        let snapshot = AgentSnapshot::new(config.prediction.canonical_segment, common_frame.clone());
        let predictor = GoalPredictor::new(config.prediction.behind_offset, common_frame.clone());
        let coordinator = PlanCoordinator::new(
            collaborators.planner,
            predictor,
            common_frame,
            config.planning_service_name(),
        );
        let bridge = OptimizationBridge::new(collaborators.optimizer, config.optimization_service_name());

        info!(
            "Plan bridge ready: base frame '{}', distinguished agent {} (goal {:.2} m behind robot)",
            resolver.robot_base_frame(),
            config.prediction.distinguished_agent_id,
            coordinator.predictor().behind_offset()
        );
        info!(
            "Listening on '{}' and '{}', serving '{}'",
            config.topics.tracked_agents, config.topics.robot_goal, config.services.reoptimize
        );

        Ok(Orchestrator {
            config,
            resolver,
            snapshot,
            coordinator,
            bridge,
            state: BridgeState::new(),
            clock: collaborators.clock,
            sink: collaborators.sink,
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn state(&self) -> &BridgeState {
        &self.state
    }

    pub fn snapshot(&self) -> &AgentSnapshot {
        &self.snapshot
    }

    fn distinguished_id(&self) -> AgentId {
        AgentId(self.config.prediction.distinguished_agent_id)
    }

    /// Optimizes again against cached state without re-planning.
    /// `None` means "not ready".
    pub fn reoptimize(&mut self, use_live_agent_paths: bool) -> Option<OptimizationResult> {
        let mode = AgentPathMode::from_flag(use_live_agent_paths);
        let distinguished = self
            .snapshot
            .get(self.distinguished_id())
            .map(|agent| (agent.id, &agent.pose));
        let header = Header::new(self.config.frames.common_frame.clone(), self.clock.now());

        self.bridge.optimize_cached(&self.state, mode, distinguished, header)
    }

    fn check_goal_frame(&self, goal: &PointStamped) -> Result<(), BridgeError> {
        let frame = &goal.header.frame_id;
        if frame.is_empty() || *frame == self.config.frames.common_frame {
            Ok(())
        } else {
            Err(BridgeError::FrameMismatch {
                expected: self.config.frames.common_frame.clone(),
                found: frame.clone(),
            })
        }
    }
}

impl EventHandler for Orchestrator {
    fn on_tracked_agents(&mut self, agents: TrackedAgents) {
        let stamp = self.clock.now();
        self.snapshot.update(&agents, stamp);

        // On failure keep the previous pose; the next event retries
        if let Ok(pose) = self.resolver.resolve_robot_pose() {
            self.state.set_robot_pose(pose);
        }
    }

    fn on_robot_goal(&mut self, goal: PointStamped) -> Option<OptimizationResult> {
        if let Err(e) = self.check_goal_frame(&goal) {
            warn!("Robot goal rejected: {}", e);
            return None;
        }
        let Some(robot_pose) = self.state.robot_pose().cloned() else {
            warn!("Robot pose unknown; ignoring goal until the transform is available");
            return None;
        };

        // The goal inherits the robot's current orientation
        let robot_goal = PoseStamped::new(
            Header::new(self.config.frames.common_frame.clone(), goal.header.stamp),
            Pose {
                position: goal.point,
                orientation: robot_pose.pose.orientation,
            },
        );
        info!("New robot goal: x={:.2}, y={:.2}", goal.point.x, goal.point.y);

        let stamp = self.clock.now();
        let distinguished = self.distinguished_id();
        let plans = self
            .coordinator
            .build_plans(&robot_pose, &robot_goal, &self.snapshot, distinguished, stamp);

        let result = self.bridge.optimize_live(&plans);
        self.state.record_cycle(plans);

        if let Some(result) = &result {
            self.sink.deliver(result);
        }
        result
    }

    fn on_reoptimize(&mut self, use_live_agent_paths: bool) -> Option<OptimizationResult> {
        self.reoptimize(use_live_agent_paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ros_interface::{
        MockClock, MockOptimizationService, MockPlanningService, MockTransformLookup, OptimizeResponse,
        Point, Quaternion, SegmentType, Stamp, TrackedAgentMsg, TrackedSegment, Transform,
        TransformError, TransformStamped, Twist, Vector3,
    };

    fn config() -> BridgeConfig {
        let mut config = BridgeConfig::default();
        config.transform.backoff_secs = 0.0;
        config
    }

    fn robot_at(x: f64, y: f64) -> MockTransformLookup {
        let mut lookup = MockTransformLookup::new();
        lookup.expect_lookup_transform().returning(move |_, _, _| {
            Ok(TransformStamped {
                header: Header::new("map", Stamp::default()),
                child_frame_id: "base_footprint".into(),
                transform: Transform {
                    translation: Vector3 { x, y, z: 0.0 },
                    rotation: Quaternion::identity(),
                },
            })
        });
        lookup
    }

    fn fixed_clock() -> MockClock {
        let mut clock = MockClock::new();
        clock.expect_now().return_const(Stamp { sec: 10, nanosec: 0 });
        clock
    }

    fn agents() -> TrackedAgents {
        TrackedAgents {
            header: Header::new("map", Stamp::default()),
            agents: vec![TrackedAgentMsg {
                track_id: 1,
                segments: vec![TrackedSegment {
                    segment_type: SegmentType::Torso,
                    pose: Pose::planar(0.0, 0.0, 0.0),
                }],
            }],
        }
    }

    fn goal(frame: &str) -> PointStamped {
        PointStamped {
            header: Header::new(frame, Stamp::default()),
            point: Point { x: 5.0, y: 0.0, z: 0.0 },
        }
    }

    fn orchestrator(
        lookup: MockTransformLookup,
        planner: MockPlanningService,
        optimizer: MockOptimizationService,
    ) -> Orchestrator {
        let collaborators = Collaborators::new(Box::new(lookup), Box::new(planner), Box::new(optimizer))
            .with_clock(Box::new(fixed_clock()))
            .with_sink(Box::new(Vec::<OptimizationResult>::new()));
        Orchestrator::new(config(), collaborators).unwrap()
    }

    #[test]
    fn unbounded_backoff_fails_construction() {
        let mut config = config();
        config.transform.backoff_secs = 1.0e30;
        let collaborators = Collaborators::new(
            Box::new(MockTransformLookup::new()),
            Box::new(MockPlanningService::new()),
            Box::new(MockOptimizationService::new()),
        );

        assert!(matches!(
            Orchestrator::new(config, collaborators),
            Err(BridgeError::Config(_))
        ));
    }

    #[test]
    fn goal_in_foreign_frame_is_rejected() {
        let mut planner = MockPlanningService::new();
        planner.expect_make_plan().never();
        let mut optimizer = MockOptimizationService::new();
        optimizer.expect_optimize().never();

        let mut orchestrator = orchestrator(robot_at(1.0, 0.0), planner, optimizer);
        orchestrator.on_tracked_agents(agents());
        assert!(orchestrator.on_robot_goal(goal("odom")).is_none());
        assert_eq!(orchestrator.state().cycles(), 0);
    }

    #[test]
    fn goal_before_robot_pose_is_ignored() {
        let mut lookup = MockTransformLookup::new();
        lookup.expect_lookup_transform().returning(|t, s, _| {
            Err(TransformError::Unavailable {
                target_frame: t.into(),
                source_frame: s.into(),
                reason: "not yet published".into(),
            })
        });
        let mut planner = MockPlanningService::new();
        planner.expect_make_plan().never();

        let mut orchestrator = orchestrator(lookup, planner, MockOptimizationService::new());
        orchestrator.on_tracked_agents(agents());
        assert_eq!(orchestrator.snapshot().len(), 1);
        assert!(orchestrator.on_robot_goal(goal("map")).is_none());
    }

    #[test]
    fn robot_goal_keeps_robot_orientation() {
        let mut planner = MockPlanningService::new();
        planner
            .expect_make_plan()
            .withf(|req| (req.goal.pose.position.x - 5.0).abs() < 1e-9)
            .times(1)
            .returning(|req| {
                assert_eq!(req.goal.pose.orientation, Quaternion::identity());
                assert_eq!(req.goal.header.frame_id, "map");
                Ok(vec![req.start.clone(), req.goal.clone()])
            });
        planner
            .expect_make_plan()
            .withf(|req| (req.goal.pose.position.x - 0.5).abs() < 1e-9)
            .times(1)
            .returning(|req| Ok(vec![req.start.clone(), req.goal.clone()]));
        let mut optimizer = MockOptimizationService::new();
        optimizer.expect_optimize().times(1).returning(|_| {
            Ok(OptimizeResponse {
                success: true,
                message: "ok".into(),
                cmd_vel: Twist::default(),
            })
        });

        let mut orchestrator = orchestrator(robot_at(1.0, 0.0), planner, optimizer);
        orchestrator.on_tracked_agents(agents());
        let result = orchestrator.on_robot_goal(goal("")).unwrap();
        assert!(result.success);
        assert!(orchestrator.state().plans_ready());
    }
}
