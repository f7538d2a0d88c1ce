//! Controller misuse and infrastructure failures.

use thiserror::Error;

/// Errors returned by the controller API itself, never by a submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// `start` was called while a request is still running or waiting.
    #[error("a generation request is already in flight")]
    AlreadyRunning,
    /// `start` was called outside a tokio runtime.
    #[error("no tokio runtime is available to drive the request")]
    NoRuntime,
    /// Controller bookkeeping was poisoned by a panic.
    #[error("controller state unavailable: {message}")]
    StateUnavailable {
        /// Description of the failure.
        message: String,
    },
    /// The attempt loop task panicked or was aborted.
    #[error("attempt loop task failed: {message}")]
    TaskFailed {
        /// Description of the failure.
        message: String,
    },
}
