// core/api.rs

// Cloneable handle to the orchestrator for hosts that receive events and on-demand
// requests on different threads. Every call takes the lock for its whole duration, so
// each handler still sees and mutates the cached state atomically.

use log::error;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{BridgeState, Orchestrator};
use crate::navigation::OptimizationResult;
use crate::ros_interface::{Event, EventHandler, TriggerResponse};
use crate::BridgeError;

#[derive(Clone)]
pub struct OrchestratorFacade {
    orchestrator: Arc<Mutex<Orchestrator>>,
}

impl OrchestratorFacade {
    pub fn new(orchestrator: Orchestrator) -> Self {
        OrchestratorFacade {
            orchestrator: Arc::new(Mutex::new(orchestrator)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Orchestrator>, BridgeError> {
        self.orchestrator.lock().map_err(|_| {
            error!("Orchestrator state poisoned by a panicking handler");
            BridgeError::StatePoisoned
        })
    }

    /// Re-optimizes against cached plans; no planning is re-run.
    /// `Ok(None)` means the cached plans are not ready.
    pub fn reoptimize(&self, use_live_agent_paths: bool) -> Result<Option<OptimizationResult>, BridgeError> {
        Ok(self.lock()?.reoptimize(use_live_agent_paths))
    }

    /// The on-demand RPC: (use live agent paths) -> (success, message)
    pub fn trigger(&self, use_live_agent_paths: bool) -> Result<TriggerResponse, BridgeError> {
        self.reoptimize(use_live_agent_paths).map(TriggerResponse::from)
    }

    /// Handles one inbound event under the lock
    pub fn handle(&self, event: Event) -> Result<Option<OptimizationResult>, BridgeError> {
        Ok(self.lock()?.dispatch(event))
    }

    /// Copy of the cached state
    pub fn state(&self) -> Result<BridgeState, BridgeError> {
        Ok(self.lock()?.state().clone())
    }
}

// Weaknesses:
// - A hung planner or optimizer call holds the lock and stalls every other caller.
// - No timeout of its own; relies on the transport.

// Current Functionality:
// - Serializes events and on-demand requests through one mutex.
// - Maps "not ready" to an empty failure reply for the RPC surface.
