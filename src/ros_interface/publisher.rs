// src/ros_interface/publisher.rs
// Outbound side: where live-mode optimization results go.

use log::{info, warn};

use crate::navigation::OptimizationResult;

/// Receives the result of every automatically triggered optimization
pub trait ResultSink: Send {
    fn deliver(&mut self, result: &OptimizationResult);
}

/// Writes results to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ResultSink for LogSink {
    fn deliver(&mut self, result: &OptimizationResult) {
        match (result.success, result.velocity) {
            (true, Some(cmd_vel)) => info!("{} | cmd_vel {}", result.message, cmd_vel),
            (true, None) => info!("{}", result.message),
            (false, _) => warn!("Optimization failed: {}", result.message),
        }
    }
}

// Vec sink, handy for hosts that poll results instead of reacting to them
impl ResultSink for Vec<OptimizationResult> {
    fn deliver(&mut self, result: &OptimizationResult) {
        self.push(result.clone());
    }
}
