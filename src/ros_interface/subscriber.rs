// src/ros_interface/subscriber.rs
// Inbound side of the bridge: the three events it reacts to and the handler contract
// an event loop drives. Events are handled strictly one at a time, in arrival order.

use std::collections::VecDeque;

use super::{PointStamped, TrackedAgents};
use crate::navigation::OptimizationResult;

/// Everything the bridge can be asked to react to
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// New perception snapshot (`/tracked_agents`)
    TrackedAgents(TrackedAgents),
    /// New robot navigation goal (`/clicked_point`)
    RobotGoal(PointStamped),
    /// On-demand re-optimization request (`optimize_srv`)
    Reoptimize { use_live_agent_paths: bool },
}

/// Reply of the on-demand re-optimization entry point
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerResponse {
    pub success: bool,
    pub message: String,
}

impl From<Option<OptimizationResult>> for TriggerResponse {
    /// "Not ready" (no result) answers with an empty failure.
    fn from(result: Option<OptimizationResult>) -> Self {
        match result {
            Some(result) => TriggerResponse {
                success: result.success,
                message: result.message,
            },
            None => TriggerResponse::default(),
        }
    }
}

/// One method per inbound event. Implementors own no threads; the host loop calls in.
pub trait EventHandler {
    /// Replaces the agent snapshot and refreshes the robot pose
    fn on_tracked_agents(&mut self, agents: TrackedAgents);

    /// Runs a full plan-and-optimize cycle. `None` when optimization was not attempted.
    fn on_robot_goal(&mut self, goal: PointStamped) -> Option<OptimizationResult>;

    /// Re-optimizes against cached plans. `None` means "not ready".
    fn on_reoptimize(&mut self, use_live_agent_paths: bool) -> Option<OptimizationResult>;

    fn dispatch(&mut self, event: Event) -> Option<OptimizationResult> {
        match event {
            Event::TrackedAgents(agents) => {
                self.on_tracked_agents(agents);
                None
            }
            Event::RobotGoal(goal) => self.on_robot_goal(goal),
            Event::Reoptimize {
                use_live_agent_paths,
            } => self.on_reoptimize(use_live_agent_paths),
        }
    }
}

/// FIFO of pending events for hosts that receive on one thread and handle on another
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue::default()
    }

    pub fn push(&mut self, event: Event) {
        self.pending.push_back(event);
    }

    /// Oldest pending event
    pub fn pop(&mut self) -> Option<Event> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Hands every queued event to `handler` in arrival order and collects the outcomes
    pub fn process_pending<H: EventHandler + ?Sized>(
        &mut self,
        handler: &mut H,
    ) -> Vec<Option<OptimizationResult>> {
        let mut outcomes = Vec::with_capacity(self.pending.len());
        while let Some(event) = self.pending.pop_front() {
            outcomes.push(handler.dispatch(event));
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<&'static str>,
    }

    impl EventHandler for Recorder {
        fn on_tracked_agents(&mut self, _agents: TrackedAgents) {
            self.seen.push("agents");
        }

        fn on_robot_goal(&mut self, _goal: PointStamped) -> Option<OptimizationResult> {
            self.seen.push("goal");
            None
        }

        fn on_reoptimize(&mut self, use_live_agent_paths: bool) -> Option<OptimizationResult> {
            self.seen.push(if use_live_agent_paths { "live" } else { "fallback" });
            Some(OptimizationResult::failed("not wired"))
        }
    }

    #[test]
    fn queue_preserves_arrival_order() {
        let mut queue = EventQueue::new();
        queue.push(Event::Reoptimize { use_live_agent_paths: false });
        queue.push(Event::TrackedAgents(TrackedAgents::default()));
        queue.push(Event::RobotGoal(PointStamped::default()));
        queue.push(Event::Reoptimize { use_live_agent_paths: true });

        let mut recorder = Recorder::default();
        let outcomes = queue.process_pending(&mut recorder);

        assert_eq!(recorder.seen, vec!["fallback", "agents", "goal", "live"]);
        assert_eq!(outcomes.len(), 4);
        assert!(queue.is_empty());
    }

    #[test]
    fn missing_result_maps_to_empty_failure() {
        let response = TriggerResponse::from(None);
        assert!(!response.success);
        assert!(response.message.is_empty());

        let response = TriggerResponse::from(Some(OptimizationResult::failed("Optimization failed..!!")));
        assert!(!response.success);
        assert_eq!(response.message, "Optimization failed..!!");
    }
}
