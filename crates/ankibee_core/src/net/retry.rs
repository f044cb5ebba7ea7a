//! Retry logic with configurable backoff.
//!
//! A [`RetryPolicy`] decides how many attempts are made and how long to wait
//! between them; the error type decides, through [`Retryable`], whether a
//! given failure is worth another attempt at all and whether that attempt
//! should wait out the backoff first.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Delay inserted between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backoff {
    /// Retry immediately.
    None,
    /// Wait `step * attempt` after the given (1-indexed) attempt.
    Linear { step: Duration },
    /// Wait `initial * 2^(attempt-1)`, capped at `max`.
    Exponential { initial: Duration, max: Duration },
}

impl Backoff {
    /// Delay to wait after `attempt` (1-indexed) failed.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self {
            Backoff::None => Duration::ZERO,
            Backoff::Linear { step } => step.saturating_mul(attempt),
            Backoff::Exponential { initial, max } => {
                let factor = 1u32 << attempt.saturating_sub(1).min(16);
                initial.saturating_mul(factor).min(*max)
            }
        }
    }
}

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay between attempts.
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    /// Three attempts with 1s/2s linear backoff.
    fn default() -> Self {
        Self::linear(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// Linear backoff policy.
    pub fn linear(max_attempts: u32, step: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Linear { step },
        }
    }

    /// Single attempt, no retry.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            backoff: Backoff::None,
        }
    }
}

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    /// True if the failure is transient.
    fn is_retryable(&self) -> bool;

    /// Whether to wait out the policy's backoff before the next attempt.
    ///
    /// Failures that already burned their time budget, such as timeouts, can
    /// return false to retry immediately.
    fn should_back_off(&self) -> bool {
        true
    }
}

/// Run `operation` under `policy`.
///
/// The closure receives the 1-indexed attempt number. Returns the first
/// success, the first non-retryable error, or the last error once the attempt
/// budget is exhausted. No delay follows the final attempt, nor any failure
/// whose [`Retryable::should_back_off`] is false.
pub async fn retry_async<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let err = match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        warn!("Attempt {}/{} failed: {}", attempt, max_attempts, err);

        if !err.is_retryable() || attempt >= max_attempts {
            return Err(err);
        }

        let delay = if err.should_back_off() {
            policy.backoff.delay_after(attempt)
        } else {
            Duration::ZERO
        };
        if !delay.is_zero() {
            debug!("Retrying in {:?}", delay);
            tokio::time::sleep(delay).await;
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug)]
    struct Flaky {
        retryable: bool,
    }

    #[derive(Debug)]
    struct Expired;

    impl Display for Expired {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("expired")
        }
    }

    impl Retryable for Expired {
        fn is_retryable(&self) -> bool {
            true
        }

        fn should_back_off(&self) -> bool {
            false
        }
    }

    impl Display for Flaky {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "flaky (retryable={})", self.retryable)
        }
    }

    impl Retryable for Flaky {
        fn is_retryable(&self) -> bool {
            self.retryable
        }
    }

    #[test]
    fn linear_backoff_grows_by_step() {
        let backoff = Backoff::Linear {
            step: Duration::from_millis(1000),
        };
        assert_eq!(backoff.delay_after(1), Duration::from_secs(1));
        assert_eq!(backoff.delay_after(2), Duration::from_secs(2));
    }

    #[test]
    fn exponential_backoff_is_capped() {
        let backoff = Backoff::Exponential {
            initial: Duration::from_millis(500),
            max: Duration::from_secs(3),
        };
        assert_eq!(backoff.delay_after(1), Duration::from_millis(500));
        assert_eq!(backoff.delay_after(3), Duration::from_secs(2));
        assert_eq!(backoff.delay_after(10), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_budget_and_returns_last_error() {
        let calls = Cell::new(0);
        let start = tokio::time::Instant::now();

        let result: Result<(), Flaky> = retry_async(&RetryPolicy::default(), |_| {
            calls.set(calls.get() + 1);
            async { Err(Flaky { retryable: true }) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 3);
        // 1s after the first attempt, 2s after the second, nothing after the last.
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn errors_can_skip_backoff() {
        let calls = Cell::new(0);
        let start = tokio::time::Instant::now();

        let result: Result<(), Expired> = retry_async(&RetryPolicy::default(), |_| {
            calls.set(calls.get() + 1);
            async { Err(Expired) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 3);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_on_non_retryable_error() {
        let calls = Cell::new(0);
        let result: Result<(), Flaky> = retry_async(&RetryPolicy::default(), |_| {
            calls.set(calls.get() + 1);
            async { Err(Flaky { retryable: false }) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_later_attempt() {
        let result: Result<u32, Flaky> = retry_async(&RetryPolicy::default(), |attempt| async move {
            if attempt < 2 {
                Err(Flaky { retryable: true })
            } else {
                Ok(attempt)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let policy = RetryPolicy {
            max_attempts: 0,
            backoff: Backoff::None,
        };
        let calls = Cell::new(0);
        let _: Result<(), Flaky> = retry_async(&policy, |_| {
            calls.set(calls.get() + 1);
            async { Err(Flaky { retryable: true }) }
        })
        .await;
        assert_eq!(calls.get(), 1);
    }
}
