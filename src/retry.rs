//! Bounded retry with exponential backoff.
//!
//! [`RetryPolicy::run`] drives one logical call through its attempts:
//!
//! ```text
//! Attempting(0) --ok, not 429/5xx--> Success
//!       |
//!  429 / 5xx / network failure
//!       |
//!  n < max_retries: sleep base * 2^n --> Attempting(n + 1)
//!  n == max_retries:                 --> ExhaustedFailure (last outcome surfaced)
//! ```
//!
//! Every HTTP method is retried the same way, including POST, PATCH and DELETE.
//! The API has no idempotency keys, so a write whose response was lost may be
//! applied twice; such retries are logged at `warn`.

use crate::transport::RawResponse;
use crate::{Config, Error, Result};
use http::Method;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

/// Retry schedule: up to `max_retries` re-issues, waiting `base_delay * 2^n`
/// after failed attempt `n` (0-indexed).
///
/// # Examples
///
/// ```
/// use puxbay::retry::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_secs(1));
///
/// assert_eq!(policy.delay_for_attempt(0), Some(Duration::from_secs(1)));
/// assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_secs(2)));
/// assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_secs(4)));
/// assert_eq!(policy.delay_for_attempt(3), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Re-issues allowed after the first attempt.
    pub max_retries: u32,
    /// Delay after the first failed attempt; doubles each time.
    pub base_delay: Duration,
    /// Whether to scale each delay by a random factor in `[0.5, 1.0]`.
    pub jitter: bool,
}

impl RetryPolicy {
    /// Creates a policy without jitter.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            jitter: false,
        }
    }

    /// Creates the policy described by a client configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries(),
            base_delay: config.backoff_base(),
            jitter: config.backoff_jitter(),
        }
    }

    /// Returns the sleep that follows failed attempt `attempt` (0-indexed), or
    /// `None` once retries are exhausted.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }

        let delay = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));

        if self.jitter {
            let factor = rand::thread_rng().gen_range(0.5..=1.0);
            Some(delay.mul_f64(factor))
        } else {
            Some(delay)
        }
    }

    /// Runs `send` until it succeeds, fails for good, or retries run out.
    ///
    /// `send` receives the 0-indexed attempt number. A response is returned as-is
    /// whatever its status; it is the caller's job to turn a surfaced 429/5xx into
    /// an error. A network failure on the last attempt is returned as the error.
    /// Errors other than [`Error::Network`] end the loop immediately.
    ///
    /// If `cancel` fires while sleeping between attempts, the loop stops with
    /// [`Error::Interrupted`].
    pub async fn run<F, Fut>(
        &self,
        method: &Method,
        cancel: &mut Cancellation,
        mut send: F,
    ) -> Result<Attempted>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<RawResponse>>,
    {
        let mut attempt = 0;

        loop {
            let outcome = send(attempt).await;

            let retryable = match &outcome {
                Ok(response) => response.is_retryable(),
                Err(e) => matches!(e, Error::Network(_)),
            };
            if !retryable {
                return outcome.map(|response| Attempted::new(response, attempt));
            }

            let Some(delay) = self.delay_for_attempt(attempt) else {
                tracing::warn!(
                    attempts = attempt + 1,
                    method = %method,
                    "Retries exhausted"
                );
                return outcome.map(|response| Attempted::new(response, attempt));
            };

            match &outcome {
                Ok(response) => tracing::warn!(
                    status = response.status.as_u16(),
                    attempt = attempt,
                    delay_ms = delay.as_millis(),
                    "Retryable response, backing off"
                ),
                Err(e) => tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    delay_ms = delay.as_millis(),
                    "Network failure, backing off"
                ),
            }
            if !method.is_idempotent() {
                tracing::warn!(
                    method = %method,
                    "Retrying a non-idempotent request; the server may apply it twice"
                );
            }

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => {
                    return Err(Error::Interrupted(format!(
                        "client shut down during backoff after {} attempt(s)",
                        attempt + 1
                    )));
                }
            }

            attempt += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_MAX_RETRIES,
            crate::config::DEFAULT_BACKOFF_BASE,
        )
    }
}

/// The response that ended a retry loop.
#[derive(Debug, Clone)]
pub struct Attempted {
    /// The final response; may still be a 429/5xx when retries ran out.
    pub response: RawResponse,
    /// Total attempts made, including the first.
    pub attempts: u32,
}

impl Attempted {
    fn new(response: RawResponse, attempt: u32) -> Self {
        Self {
            response,
            attempts: attempt + 1,
        }
    }
}

/// Cooperative cancellation signal observed during backoff sleeps.
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

impl Cancellation {
    /// Wraps the receiving side of a shutdown flag.
    pub fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    /// A signal that never fires.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }

    /// Returns `true` once the flag has been raised.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the flag is raised.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // sender gone without raising the flag: nothing can cancel us any more
            std::future::pending::<()>().await;
        }
    }
}
