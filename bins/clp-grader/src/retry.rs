//! Bounded retry with linear backoff.
//!
//! The combinator is parameterized by the attempt budget, the backoff
//! schedule, and a predicate over the error kind, so the retry decision
//! is an explicit match rather than exception inspection at call sites.

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Attempt budget and backoff schedule.
///
/// Retry n (1-based count of retries already made) waits
/// `n * backoff_unit` before the next call: 1s, 2s, 3s, 4s with the
/// defaults. The final failed attempt does not wait again.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total calls allowed, the first attempt included.
    pub max_attempts: u32,
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    pub fn backoff(&self, retries: u32) -> Duration {
        self.backoff_unit * retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

/// Terminal outcome of a retried operation.
#[derive(Debug, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every attempt failed with a retriable error.
    Exhausted { attempts: u32 },
    /// A non-retriable error ended the operation immediately.
    Inner(E),
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Exhausted { attempts } => {
                write!(f, "gave up after {} attempts", attempts)
            }
            RetryError::Inner(e) => e.fmt(f),
        }
    }
}

/// Run `operation` until it succeeds, fails non-retriably, or the
/// attempt budget is spent. Each backoff sleep suspends only the caller.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    is_retriable: impl Fn(&E) -> bool,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let mut retries = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if is_retriable(&err) => {
                retries += 1;
                if retries >= policy.max_attempts {
                    return Err(RetryError::Exhausted { attempts: retries });
                }
                let delay = policy.backoff(retries);
                warn!(
                    retry = retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retriable failure, backing off"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(RetryError::Inner(err)),
        }
    }
}
