use std::f64::consts::FRAC_PI_4;

use hateb_plan_bridge::navigation::controller::fallback_collection;
use hateb_plan_bridge::ros_interface::{
    Header, Pose, PoseStamped, SegmentType, Stamp, TrackedAgentMsg, TrackedAgents, TrackedSegment,
};
use hateb_plan_bridge::sim::StraightLinePlanner;
use hateb_plan_bridge::{AgentId, AgentSnapshot, GoalPredictor, PlanCoordinator};
use rstest::rstest;

fn segment(segment_type: SegmentType, x: f64, y: f64) -> TrackedSegment {
    TrackedSegment {
        segment_type,
        pose: Pose::planar(x, y, 0.0),
    }
}

fn crowd(count: u64) -> TrackedAgents {
    TrackedAgents {
        header: Header::new("map", Stamp::default()),
        agents: (1..=count)
            .map(|track_id| TrackedAgentMsg {
                track_id,
                segments: vec![segment(SegmentType::Torso, track_id as f64, -(track_id as f64))],
            })
            .collect(),
    }
}

fn robot_at(x: f64, y: f64, yaw: f64) -> PoseStamped {
    PoseStamped::new(Header::new("map", Stamp::default()), Pose::planar(x, y, yaw))
}

// Unit test for the goal predictor
#[test]
fn predicted_goal_is_deterministic() {
    let predictor = GoalPredictor::default();
    let robot = Pose::planar(3.0, -2.0, FRAC_PI_4);
    let stamp = Stamp::from_secs_f64(12.5);

    let first = predictor.predict_goal(&robot, stamp);
    let second = predictor.predict_goal(&robot, stamp);
    assert_eq!(first, second);

    // Half a metre behind, same heading
    let dx = first.pose.position.x - 3.0;
    let dy = first.pose.position.y + 2.0;
    assert!(((dx * dx + dy * dy).sqrt() - 0.5).abs() < 1e-9);
    assert!((first.pose.orientation.yaw() - FRAC_PI_4).abs() < 1e-9);
    assert_eq!(first.header.stamp, stamp);
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(10)]
fn only_robot_and_distinguished_agent_are_planned(#[case] count: u64) {
    let planner = StraightLinePlanner::new(0.5);
    let mut coordinator = PlanCoordinator::new(Box::new(planner.clone()), GoalPredictor::default(), "map", "make_plan");

    let mut snapshot = AgentSnapshot::new(SegmentType::Torso, "map");
    snapshot.update(&crowd(count), Stamp::default());

    let plans = coordinator.build_plans(
        &robot_at(0.0, 0.0, 0.0),
        &robot_at(4.0, 0.0, 0.0),
        &snapshot,
        AgentId(1),
        Stamp::default(),
    );

    assert_eq!(planner.requests().len(), 2);
    assert!(plans.robot_plan_ok());
    assert!(plans.agent_plan_ok());
    assert_eq!(plans.agent_paths.len(), count as usize);
    assert_eq!(plans.agent_goals.len(), count as usize);

    for id in 2..=count {
        let path = &plans.agent_paths.get(AgentId(id)).unwrap().plan;
        assert_eq!(path.len(), 1);
        assert_eq!(path.poses[0].pose.position.x, id as f64);
    }
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(7)]
fn fallback_collection_has_one_entry(#[case] extra_agents: u64) {
    let mut snapshot = AgentSnapshot::new(SegmentType::Torso, "map");
    snapshot.update(&crowd(1 + extra_agents), Stamp::default());

    let agent = snapshot.get(AgentId(1)).unwrap();
    let collection = fallback_collection(agent.id, &agent.pose, Header::new("map", Stamp::default()));

    assert_eq!(collection.len(), 1);
    let path = &collection.get(AgentId(1)).unwrap().plan;
    assert_eq!(path.poses, vec![agent.pose.clone()]);
}

// Snapshot size equals the number of tracks carrying the canonical segment
#[test]
fn snapshot_counts_only_canonical_segments() {
    let raw = TrackedAgents {
        header: Header::new("map", Stamp::default()),
        agents: vec![
            TrackedAgentMsg {
                track_id: 1,
                segments: vec![segment(SegmentType::Head, 0.0, 0.0), segment(SegmentType::Torso, 1.0, 1.0)],
            },
            TrackedAgentMsg {
                track_id: 2,
                segments: vec![segment(SegmentType::Head, 2.0, 2.0)],
            },
            TrackedAgentMsg {
                track_id: 3,
                segments: vec![segment(SegmentType::Torso, 3.0, 3.0)],
            },
            TrackedAgentMsg {
                track_id: 3,
                segments: vec![segment(SegmentType::Torso, 4.0, 4.0)],
            },
        ],
    };

    let mut snapshot = AgentSnapshot::new(SegmentType::Torso, "map");
    snapshot.update(&raw, Stamp::from_secs_f64(1.0));

    assert_eq!(snapshot.len(), 2);
    assert!(snapshot.get(AgentId(2)).is_none());
    assert_eq!(snapshot.get(AgentId(1)).unwrap().pose.pose.position.x, 1.0);
    assert_eq!(snapshot.get(AgentId(3)).unwrap().pose.pose.position.x, 4.0);

    // Empty message clears the snapshot
    snapshot.update(&TrackedAgents::default(), Stamp::from_secs_f64(2.0));
    assert!(snapshot.is_empty());
}
