//! Client-side controller that drives one generation request to a terminal
//! outcome.
//!
//! The controller submits through the [`GenerationSubmitter`] port and
//! retries only when the model reports it is overloaded, waiting
//! `1s, 2s, 4s` between attempts. Cancellation is cooperative: it is
//! observed before each attempt, during backoff waits and when a submission
//! returns, but an in-flight submission is never interrupted.
//!
//! State is published through a [`tokio::sync::watch`] channel so callers
//! can render progress without polling.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::ports::{GenerationRequest, GenerationSubmitter, SubmitErrorKind};

mod error;
mod policy;
mod runtime;
mod state;

pub use error::ControllerError;
pub use policy::{BASE_DELAY, MAX_RETRIES, RetryPolicy};
pub use runtime::{RetrySleeper, TokioSleeper};
pub use state::{AttemptFailure, AttemptStatus, GenerationAttemptState, GenerationOutcome};

/// Bookkeeping for the loop that currently owns the published state.
#[derive(Default)]
struct RunSlot {
    run_id: u64,
    token: Option<CancellationToken>,
}

struct Shared {
    state: watch::Sender<GenerationAttemptState>,
    slot: Mutex<RunSlot>,
}

impl Shared {
    fn lock_slot(&self) -> Result<MutexGuard<'_, RunSlot>, ControllerError> {
        self.slot.lock().map_err(|_| ControllerError::StateUnavailable {
            message: "run slot mutex poisoned".to_owned(),
        })
    }

    /// Apply `update` only while `run_id` still owns the controller. A
    /// reset or newer start silences older loops.
    fn publish(&self, run_id: u64, update: impl FnOnce(&mut GenerationAttemptState)) -> bool {
        let Ok(slot) = self.slot.lock() else {
            return false;
        };
        if slot.run_id != run_id {
            return false;
        }
        self.state.send_modify(update);
        true
    }
}

/// Handle to a started request.
#[derive(Debug)]
pub struct GenerationRun {
    handle: JoinHandle<GenerationOutcome>,
}

impl GenerationRun {
    /// Wait for the attempt loop to reach its terminal outcome.
    pub async fn outcome(self) -> Result<GenerationOutcome, ControllerError> {
        self.handle
            .await
            .map_err(|error| ControllerError::TaskFailed {
                message: error.to_string(),
            })
    }
}

/// Drives generation requests through the retry loop.
///
/// One controller handles one request at a time; independent controllers
/// share nothing.
///
/// # Examples
/// ```rust,ignore
/// let controller = GenerationRequestController::new(submitter);
/// let outcome = controller.run(request).await?;
/// ```
pub struct GenerationRequestController {
    submitter: Arc<dyn GenerationSubmitter>,
    sleeper: Arc<dyn RetrySleeper>,
    policy: RetryPolicy,
    shared: Arc<Shared>,
}

impl GenerationRequestController {
    /// Build a controller with the default policy and tokio timers.
    pub fn new(submitter: Arc<dyn GenerationSubmitter>) -> Self {
        Self::with_runtime(submitter, Arc::new(TokioSleeper), RetryPolicy::default())
    }

    /// Build a controller with an injected sleeper and policy.
    pub fn with_runtime(
        submitter: Arc<dyn GenerationSubmitter>,
        sleeper: Arc<dyn RetrySleeper>,
        policy: RetryPolicy,
    ) -> Self {
        let (state, _) = watch::channel(GenerationAttemptState::default());
        Self {
            submitter,
            sleeper,
            policy,
            shared: Arc::new(Shared {
                state,
                slot: Mutex::new(RunSlot::default()),
            }),
        }
    }

    /// Begin a request and return immediately.
    ///
    /// Resets the attempt counter, sets the status to `Running` and spawns the
    /// attempt loop on the current tokio runtime. Rejected with
    /// [`ControllerError::AlreadyRunning`] while a previous request is still
    /// running or waiting to retry.
    pub fn start(&self, request: GenerationRequest) -> Result<GenerationRun, ControllerError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| ControllerError::NoRuntime)?;

        let (run_id, token) = {
            let mut slot = self.shared.lock_slot()?;
            if self.shared.state.borrow().status.is_in_flight() {
                return Err(ControllerError::AlreadyRunning);
            }
            slot.run_id = slot.run_id.wrapping_add(1);
            let token = CancellationToken::new();
            slot.token = Some(token.clone());
            self.shared.state.send_replace(GenerationAttemptState::running());
            (slot.run_id, token)
        };

        info!(run_id, "generation request started");
        let attempt_loop = AttemptLoop {
            submitter: Arc::clone(&self.submitter),
            sleeper: Arc::clone(&self.sleeper),
            policy: self.policy,
            shared: Arc::clone(&self.shared),
            run_id,
            token,
        };
        let handle = runtime.spawn(attempt_loop.run(request));
        Ok(GenerationRun { handle })
    }

    /// Start a request and wait for its outcome.
    pub async fn run(&self, request: GenerationRequest) -> Result<GenerationOutcome, ControllerError> {
        self.start(request)?.outcome().await
    }

    /// Request cancellation of the in-flight request.
    ///
    /// A pending backoff wait is abandoned immediately. A submission already
    /// in flight runs to completion but its result is discarded. No-op when
    /// nothing is in flight.
    pub fn cancel(&self) {
        let Ok(slot) = self.shared.slot.lock() else {
            warn!("cancel ignored: run slot mutex poisoned");
            return;
        };
        let in_flight = self.shared.state.send_if_modified(|state| {
            if !state.status.is_in_flight() || state.cancelled {
                return false;
            }
            state.cancelled = true;
            true
        });
        if in_flight {
            if let Some(token) = slot.token.as_ref() {
                token.cancel();
            }
            info!(run_id = slot.run_id, "generation request cancellation requested");
        }
    }

    /// Cancel and return the controller to `Idle` with cleared state.
    ///
    /// Safe at any time and idempotent on an idle controller. A loop that is
    /// still finishing an in-flight submission is detached and can no longer
    /// publish state.
    pub fn reset(&self) {
        self.cancel();
        let Ok(mut slot) = self.shared.slot.lock() else {
            warn!("reset ignored: run slot mutex poisoned");
            return;
        };
        slot.run_id = slot.run_id.wrapping_add(1);
        slot.token = None;
        self.shared.state.send_if_modified(|state| {
            if *state == GenerationAttemptState::default() {
                return false;
            }
            *state = GenerationAttemptState::default();
            true
        });
    }

    /// Current state.
    pub fn snapshot(&self) -> GenerationAttemptState {
        self.shared.state.borrow().clone()
    }

    /// Receiver that observes every published state change.
    pub fn subscribe(&self) -> watch::Receiver<GenerationAttemptState> {
        self.shared.state.subscribe()
    }
}

struct AttemptLoop {
    submitter: Arc<dyn GenerationSubmitter>,
    sleeper: Arc<dyn RetrySleeper>,
    policy: RetryPolicy,
    shared: Arc<Shared>,
    run_id: u64,
    token: CancellationToken,
}

impl AttemptLoop {
    async fn run(self, request: GenerationRequest) -> GenerationOutcome {
        let mut attempt: u32 = 0;
        loop {
            if self.token.is_cancelled() {
                return self.finish(GenerationOutcome::Cancelled);
            }

            if attempt > 0 {
                let delay = self.policy.delay_before(attempt);
                self.shared.publish(self.run_id, |state| {
                    state.attempt_number = attempt;
                    state.status = AttemptStatus::RetryScheduled;
                });
                info!(
                    run_id = self.run_id,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "model overloaded; retry scheduled"
                );
                tokio::select! {
                    biased;
                    () = self.token.cancelled() => {
                        return self.finish(GenerationOutcome::Cancelled);
                    }
                    () = self.sleeper.sleep(delay) => {}
                }
                if self.token.is_cancelled() {
                    return self.finish(GenerationOutcome::Cancelled);
                }
                self.shared.publish(self.run_id, |state| {
                    state.status = AttemptStatus::Running;
                });
            }

            debug!(run_id = self.run_id, attempt, "submitting generation");
            let result = self.submitter.submit(&request).await;
            if self.token.is_cancelled() {
                return self.finish(GenerationOutcome::Cancelled);
            }

            let error = match result {
                Ok(payload) => return self.finish(GenerationOutcome::Succeeded(payload)),
                Err(error) => error,
            };
            match error.kind() {
                SubmitErrorKind::Cancelled => return self.finish(GenerationOutcome::Cancelled),
                SubmitErrorKind::Overloaded if self.policy.allows_retry_after(attempt) => {
                    attempt += 1;
                }
                SubmitErrorKind::Overloaded | SubmitErrorKind::Other => {
                    warn!(run_id = self.run_id, attempt, %error, "generation request failed");
                    return self.finish(GenerationOutcome::Failed(AttemptFailure::from(&error)));
                }
            }
        }
    }

    fn finish(&self, outcome: GenerationOutcome) -> GenerationOutcome {
        let status = outcome.status();
        let published = self.shared.publish(self.run_id, |state| {
            state.status = status;
            match &outcome {
                GenerationOutcome::Succeeded(payload) => state.result = Some(payload.clone()),
                GenerationOutcome::Failed(failure) => state.last_error = Some(failure.clone()),
                GenerationOutcome::Cancelled => {}
            }
        });
        info!(run_id = self.run_id, ?status, published, "generation request finished");
        outcome
    }
}
