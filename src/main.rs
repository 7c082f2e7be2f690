// src/main.rs
// Demo entry point: runs the plan bridge against the in-process simulated collaborators.
// A real deployment wires the same Orchestrator to a transport adapter instead.

// Usage: hateb-plan-bridge [config.yaml]

use hateb_plan_bridge::ros_interface::{
    Header, Point, PointStamped, Pose, SegmentType, Stamp, TrackedAgentMsg, TrackedAgents, TrackedSegment,
};
use hateb_plan_bridge::sim::{FakeRobotTransform, ProportionalOptimizer, StraightLinePlanner};
use hateb_plan_bridge::{BridgeConfig, Collaborators, Event, EventQueue, Orchestrator, OrchestratorFacade};
use log::{error, info};
use std::error::Error;

fn torso(track_id: u64, x: f64, y: f64) -> TrackedAgentMsg {
    TrackedAgentMsg {
        track_id,
        segments: vec![TrackedSegment {
            segment_type: SegmentType::Torso,
            pose: Pose::planar(x, y, 0.0),
        }],
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging for debugging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Starting {}...", hateb_plan_bridge::NODE_NAME);

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {}", path);
            BridgeConfig::from_yaml_file(&path)?
        }
        None => BridgeConfig::default(),
    };

    // Fake robot at the centre of a 11 x 11 m map, facing +x
    let robot_tf = FakeRobotTransform::new(
        config.frames.common_frame.clone(),
        config.robot_base_frame(),
        Pose::planar(5.5, 5.5, 0.0),
    );
    let planner = StraightLinePlanner::new(0.25);
    let optimizer = ProportionalOptimizer::default();

    let collaborators = Collaborators::new(
        Box::new(robot_tf.clone()),
        Box::new(planner.clone()),
        Box::new(optimizer.clone()),
    );
    let facade = OrchestratorFacade::new(Orchestrator::new(config.clone(), collaborators)?);

    let mut queue = EventQueue::new();
    queue.push(Event::TrackedAgents(TrackedAgents {
        header: Header::new(config.frames.common_frame.clone(), Stamp::default()),
        agents: vec![torso(1, 4.5, 5.5), torso(2, 8.0, 8.0)],
    }));
    queue.push(Event::RobotGoal(PointStamped {
        header: Header::new(config.frames.common_frame.clone(), Stamp::default()),
        point: Point { x: 9.5, y: 5.5, z: 0.0 },
    }));

    while let Some(event) = queue.pop() {
        match facade.handle(event) {
            Ok(Some(result)) if result.success => info!("Live optimization: {}", result.message),
            Ok(Some(result)) => error!("Live optimization failed: {}", result.message),
            Ok(None) => {}
            Err(e) => error!("Event handling failed: {}", e),
        }
    }

    for use_live_agent_paths in [true, false] {
        let response = facade.trigger(use_live_agent_paths)?;
        info!(
            "{} (live agent paths: {}): success={}, message='{}'",
            config.services.reoptimize, use_live_agent_paths, response.success, response.message
        );
    }

    info!(
        "Demo completed: {} plan requests, {} optimization requests, {} transform lookups",
        planner.requests().len(),
        optimizer.requests().len(),
        robot_tf.lookups()
    );
    Ok(())
}
