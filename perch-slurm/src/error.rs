//! Error types for the SLURM client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors raised while talking to the SLURM control plane.
///
/// Every variant is fatal for the current keep-alive cycle: an unreadable or
/// unreachable queue is treated as "a worker might already be running", and the
/// controller must not submit into that ambiguity.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The scheduler command could not be spawned.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The scheduler command did not complete within the client timeout.
    #[error("{program} timed out after {timeout:?}")]
    Timeout {
        program: &'static str,
        timeout: std::time::Duration,
    },

    /// The scheduler command exited nonzero.
    #[error("{program} failed (status {status}): {stderr}")]
    CommandFailed {
        program: &'static str,
        status: i32,
        stderr: String,
    },

    /// The scheduler replied with output the client could not interpret.
    #[error("unexpected scheduler output: {0}")]
    Parse(String),
}

impl ClientError {
    /// Create a parse error from a message.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Check if this error is a command timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
