//! Error types for the SIP supervisor

use std::time::Duration;
use thiserror::Error;

/// Result type for supervisor operations
pub type SupervisorResult<T> = Result<T, SupervisorError>;

/// Errors that can occur while driving the voice client
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// No response arrived before the deadline. The command may still take
    /// effect, the caller decides whether that matters.
    #[error("Command {command:?} timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    /// The voice client exited or closed its output
    #[error("Voice client terminated unexpectedly (exit code {code:?})")]
    ProcessDied { code: Option<i32> },

    /// The supervisor has been stopped
    #[error("Voice client supervisor is not running")]
    NotRunning,

    /// The voice client binary could not be obtained
    #[error("Failed to download voice client: {message}")]
    Download { message: String },

    /// The supervising task went away without answering
    #[error("Supervisor dropped the reply channel")]
    ChannelClosed,

    /// I/O failure talking to the process
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SupervisorError {
    pub fn download(message: impl Into<String>) -> Self {
        Self::Download {
            message: message.into(),
        }
    }

    /// Whether the daemon can keep running after this error
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Timeout { .. })
    }
}

impl From<reqwest::Error> for SupervisorError {
    fn from(err: reqwest::Error) -> Self {
        Self::download(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timeouts_are_recoverable() {
        let timeout = SupervisorError::Timeout {
            command: "call list".to_string(),
            timeout: Duration::from_secs(10),
        };
        assert!(!timeout.is_fatal());
        assert!(SupervisorError::ProcessDied { code: Some(1) }.is_fatal());
        assert!(SupervisorError::NotRunning.is_fatal());
    }
}
