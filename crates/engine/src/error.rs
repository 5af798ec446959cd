//! Engine error model.

use thiserror::Error;

use tillsim_core::DomainError;

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised while setting up or running a simulation.
///
/// Settlement itself never fails; everything here is either a setup problem
/// or the loss of a thread.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The OS refused a thread (resource exhaustion). Fatal for the run.
    #[error("failed to spawn {role} thread: {source}")]
    Spawn {
        role: String,
        source: std::io::Error,
    },

    #[error("settlement worker {name} panicked")]
    WorkerPanicked { name: String },

    #[error("auditor thread panicked")]
    AuditorPanicked,
}

impl EngineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
