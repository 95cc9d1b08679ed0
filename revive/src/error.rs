use revive_common::ComputeError;
use thiserror::Error;

/// Everything that aborts a run. Each variant names the step that failed.
#[derive(Debug, Error)]
pub enum RestartError {
    #[error("{0}")]
    Usage(#[from] clap::Error),

    /// Settings or provider selection failed; raised only after the arguments parsed.
    #[error("{0:#}")]
    Config(anyhow::Error),

    #[error("unable to get instance: {0}")]
    GetInstance(#[source] ComputeError),

    #[error("unable to start instance: {0}")]
    StartInstance(#[source] ComputeError),

    #[error("unable to wait for the operation: {0}")]
    WaitOperation(#[source] ComputeError),
}

impl RestartError {
    /// The underlying API failure, if any.
    pub fn compute_error(&self) -> Option<&ComputeError> {
        match self {
            RestartError::Usage(_) | RestartError::Config(_) => None,
            RestartError::GetInstance(e)
            | RestartError::StartInstance(e)
            | RestartError::WaitOperation(e) => Some(e),
        }
    }

    /// Short failure class for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            RestartError::Usage(_) => "usage",
            RestartError::Config(_) => "config",
            _ => self.compute_error().map(ComputeError::kind).unwrap_or("unknown"),
        }
    }

    /// Usage errors keep clap's code (2); every other failure exits 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            RestartError::Usage(e) => e.exit_code(),
            _ => 1,
        }
    }
}
