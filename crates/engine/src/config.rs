use std::time::Duration;

use crate::error::{EngineError, EngineResult};

/// Simulation runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Number of settlement worker threads
    pub workers: usize,
    /// Pause between two audit passes
    pub audit_interval: Duration,
    /// Log a progress line for every bill whose backlog index is a multiple of this
    pub progress_every: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            audit_interval: Duration::from_secs(1),
            progress_every: 100,
        }
    }
}

impl SimulationConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_audit_interval(mut self, interval: Duration) -> Self {
        self.audit_interval = interval;
        self
    }

    pub fn with_progress_every(mut self, every: usize) -> Self {
        self.progress_every = every;
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.workers == 0 {
            return Err(EngineError::config("at least one settlement worker is required"));
        }
        if self.progress_every == 0 {
            return Err(EngineError::config("progress interval must be at least 1"));
        }
        Ok(())
    }
}
