//! Observable controller state.

use crate::domain::ports::{GenerationPayload, GenerationSubmitError, SubmitErrorKind};

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttemptStatus {
    /// No request has been started, or the controller was reset.
    #[default]
    Idle,
    /// A submission is in flight.
    Running,
    /// Waiting out the backoff before the next attempt.
    RetryScheduled,
    /// Terminal: a submission succeeded.
    Succeeded,
    /// Terminal: a non-retryable failure, or retries exhausted.
    Failed,
    /// Terminal: the caller cancelled.
    Cancelled,
}

impl AttemptStatus {
    /// Whether an attempt loop currently owns the controller.
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Running | Self::RetryScheduled)
    }

    /// Whether the status is final for the current request.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

/// Descriptor of the error that ended a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    /// Human-readable message.
    pub message: String,
    /// Classification of the last failure.
    pub kind: SubmitErrorKind,
}

impl From<&GenerationSubmitError> for AttemptFailure {
    fn from(value: &GenerationSubmitError) -> Self {
        Self {
            message: value.to_string(),
            kind: value.kind(),
        }
    }
}

/// Snapshot of one request's progress.
///
/// `attempt_number` is 0 for the first submission and never exceeds the
/// retry budget. `cancelled` is set at most once per request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationAttemptState {
    /// Zero-based attempt counter.
    pub attempt_number: u32,
    /// Lifecycle status.
    pub status: AttemptStatus,
    /// Terminal failure, only when `status` is `Failed`.
    pub last_error: Option<AttemptFailure>,
    /// Whether cancellation was requested for this request.
    pub cancelled: bool,
    /// Payload, only when `status` is `Succeeded`.
    pub result: Option<GenerationPayload>,
}

impl GenerationAttemptState {
    pub(super) fn running() -> Self {
        Self {
            status: AttemptStatus::Running,
            ..Self::default()
        }
    }
}

/// How a request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// A submission succeeded.
    Succeeded(GenerationPayload),
    /// The request failed; carries the last error.
    Failed(AttemptFailure),
    /// The caller cancelled; no error is reported.
    Cancelled,
}

impl GenerationOutcome {
    /// Status this outcome corresponds to.
    pub fn status(&self) -> AttemptStatus {
        match self {
            Self::Succeeded(_) => AttemptStatus::Succeeded,
            Self::Failed(_) => AttemptStatus::Failed,
            Self::Cancelled => AttemptStatus::Cancelled,
        }
    }
}
