// src/navigation/planner.rs
// Requests global plans for the robot and the distinguished agent and assembles the
// agent path collection handed to the optimizer.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use super::{AgentPathCollection, GoalPredictor, PathPlan, PlanOwner};
use crate::core::{AgentId, AgentSnapshot};
use crate::ros_interface::{Header, PlanRequest, PlanningService, PoseStamped, Stamp};

/// Output of one planning cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatedPlans {
    /// Plan from the robot pose to the robot goal
    pub robot_plan: PathPlan,
    /// Live agent path collection
    pub agent_paths: AgentPathCollection,
    /// Goal used for each agent: predicted for the distinguished one, current pose otherwise
    pub agent_goals: BTreeMap<AgentId, PoseStamped>,
    /// Identity the collection was built around
    pub distinguished_id: AgentId,
}

impl CoordinatedPlans {
    pub fn robot_plan_ok(&self) -> bool {
        self.robot_plan.succeeded()
    }

    /// False as well when the distinguished agent was not tracked this cycle
    pub fn agent_plan_ok(&self) -> bool {
        self.agent_paths
            .get(self.distinguished_id)
            .map(|path| path.plan.succeeded())
            .unwrap_or(false)
    }
}

/// Issues planning requests and builds the multi-agent path collection
pub struct PlanCoordinator {
    planner: Box<dyn PlanningService>,
    predictor: GoalPredictor,
    common_frame: String,
    service_name: String,
}

impl PlanCoordinator {
    /// Create a coordinator talking to `planner`
    pub fn new(
        planner: Box<dyn PlanningService>,
        predictor: GoalPredictor,
        common_frame: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        PlanCoordinator {
            planner,
            predictor,
            common_frame: common_frame.into(),
            service_name: service_name.into(),
        }
    }

    pub fn predictor(&self) -> &GoalPredictor {
        &self.predictor
    }

    /// Plans for the robot and the distinguished agent.
    ///
    /// Other agents get no planning request; each one enters the collection as a
    /// single-pose path at its current pose.
    pub fn build_plans(
        &mut self,
        robot_pose: &PoseStamped,
        robot_goal: &PoseStamped,
        agents: &AgentSnapshot,
        distinguished_id: AgentId,
        stamp: Stamp,
    ) -> CoordinatedPlans {
        let robot_plan = self.request_plan(PlanOwner::Robot, robot_pose, robot_goal);

        let mut agent_paths = AgentPathCollection::new(Header::new(self.common_frame.clone(), stamp));
        let mut agent_goals = BTreeMap::new();

        for agent in agents.iter() {
            if agent.id == distinguished_id {
                let agent_goal = self.predictor.predict_goal(&robot_pose.pose, stamp);
                let owner = PlanOwner::Agent(agent.id);
                let plan = self.request_plan(owner, &agent.pose, &agent_goal);
                agent_paths.insert(agent.id, agent_goal.header.clone(), plan.poses);
                agent_goals.insert(agent.id, agent_goal);
            } else {
                debug!("Agent {} held stationary", agent.id);
                agent_paths.insert(agent.id, agent.pose.header.clone(), vec![agent.pose.clone()]);
                agent_goals.insert(agent.id, agent.pose.clone());
            }
        }

        if agents.get(distinguished_id).is_none() {
            info!("Agent {} not tracked; no agent plan this cycle", distinguished_id);
        }

        CoordinatedPlans {
            robot_plan,
            agent_paths,
            agent_goals,
            distinguished_id,
        }
    }

    fn request_plan(&mut self, owner: PlanOwner, start: &PoseStamped, goal: &PoseStamped) -> PathPlan {
        let request = PlanRequest {
            start: start.clone(),
            goal: goal.clone(),
        };

        match self.planner.make_plan(&request) {
            Ok(poses) => {
                if poses.is_empty() {
                    warn!("Planner returned an empty path for {:?}", owner);
                } else {
                    debug!("Planner returned {} poses for {:?}", poses.len(), owner);
                }
                PathPlan::new(owner, poses)
            }
            Err(e) => {
                warn!("Planning request for {:?} via {} failed: {}", owner, self.service_name, e);
                PathPlan::failed(owner)
            }
        }
    }
}
