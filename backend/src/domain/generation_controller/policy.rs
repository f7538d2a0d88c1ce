//! Retry budget and backoff schedule.

use std::time::Duration;

/// Retries allowed after the first attempt.
pub const MAX_RETRIES: u32 = 3;
/// Delay before the first retry; doubles for each subsequent retry.
pub const BASE_DELAY: Duration = Duration::from_millis(1_000);

/// Retry budget and exponential backoff base.
///
/// The same counter drives both: attempt `k` (1-based retry index) waits
/// `base_delay * 2^(k-1)`.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use studio::domain::generation_controller::RetryPolicy;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.delay_before(1), Duration::from_millis(1_000));
/// assert_eq!(policy.delay_before(3), Duration::from_millis(4_000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay: BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Backoff to wait before attempt number `attempt`; zero for the first
    /// attempt.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exponent = 2_u32.saturating_pow(attempt - 1);
        let base_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(u64::from(exponent)))
    }

    /// Whether another attempt may follow attempt number `attempt`.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }
}
