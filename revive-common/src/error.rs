use thiserror::Error;

use crate::OperationError;

/// Failures talking to the compute-management API.
#[derive(Debug, Clone, Error)]
pub enum ComputeError {
    /// Client or credentials could not be set up.
    #[error("connection error: {0}")]
    Connection(String),

    /// A single remote call was rejected or could not be completed.
    #[error("request error: {message}")]
    Request {
        status: Option<u16>,
        message: String,
    },

    /// An accepted long-running operation finished with an error.
    #[error("operation {operation} failed: {error}")]
    Operation {
        operation: String,
        error: OperationError,
    },
}

impl ComputeError {
    pub fn connection(msg: impl Into<String>) -> Self {
        ComputeError::Connection(msg.into())
    }

    pub fn request(status: Option<u16>, msg: impl Into<String>) -> Self {
        ComputeError::Request {
            status,
            message: msg.into(),
        }
    }

    /// HTTP status of a rejected request, when there was one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ComputeError::Request { status, .. } => *status,
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ComputeError::Connection(_) => "connection",
            ComputeError::Request { .. } => "request",
            ComputeError::Operation { .. } => "operation",
        }
    }
}
