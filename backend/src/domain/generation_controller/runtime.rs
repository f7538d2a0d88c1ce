//! Runtime seam for backoff waits.

use std::time::Duration;

use async_trait::async_trait;

/// Async sleeping abstraction so tests can observe and control backoff.
///
/// The controller races this future against cancellation, so
/// implementations do not need to observe cancellation themselves.
///
/// ```rust,no_run
/// use std::sync::Mutex;
/// use std::time::Duration;
/// use async_trait::async_trait;
/// use studio::domain::generation_controller::RetrySleeper;
///
/// #[derive(Default)]
/// struct CountingSleeper(Mutex<u32>);
///
/// #[async_trait]
/// impl RetrySleeper for CountingSleeper {
///     async fn sleep(&self, _duration: Duration) {
///         if let Ok(mut calls) = self.0.lock() {
///             *calls += 1;
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait RetrySleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Tokio timer backed sleeper.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl RetrySleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn tokio_sleeper_waits_on_the_timer() {
        let started = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_millis(2_000)).await;
        assert!(started.elapsed() >= Duration::from_millis(2_000));
    }
}
