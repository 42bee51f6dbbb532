//! Retry with exponential backoff for collaborator calls
//!
//! Every outbound call (record store, LLM agents) goes through
//! [`with_retry`]. Each attempt is bounded by a deadline; transient failures
//! are retried with exponential backoff, everything else is returned as is.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Error returned by an external collaborator
pub trait CollaboratorError: std::error::Error + Send + Sync + Sized + 'static {
    /// Whether retrying the same call may succeed (timeouts, 429, 5xx)
    fn is_transient(&self) -> bool;

    /// Build the error reported when an attempt exceeds its deadline
    fn deadline_exceeded(after: Duration) -> Self;

    /// The deadline, if this error is a deadline expiry
    fn deadline(&self) -> Option<Duration>;
}

/// Retry and deadline settings for collaborator calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Deadline for a single attempt
    pub call_timeout: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, call_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            call_timeout,
            ..Self::default()
        }
    }

    /// A single attempt, no backoff
    pub fn no_retry(call_timeout: Duration) -> Self {
        Self::new(1, call_timeout)
    }

    pub fn with_delays(mut self, initial_delay: Duration, max_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self.max_delay = max_delay;
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            call_timeout: Duration::from_secs(60),
        }
    }
}

/// Run `call` until it succeeds, fails permanently, or attempts run out
///
/// `operation` names the call in log output.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, operation: &str, mut call: F) -> Result<T, E>
where
    E: CollaboratorError,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    let mut delay = policy.initial_delay;

    loop {
        attempt += 1;

        let result = match tokio::time::timeout(policy.call_timeout, call()).await {
            Ok(result) => result,
            Err(_) => Err(E::deadline_exceeded(policy.call_timeout)),
        };

        match result {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} succeeded after {} attempt(s)", operation, attempt);
                }
                return Ok(value);
            }
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {} ms",
                    operation,
                    attempt,
                    policy.max_attempts,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(policy.max_delay);
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, thiserror::Error)]
    enum FakeError {
        #[error("server error")]
        Server,
        #[error("bad request")]
        BadRequest,
        #[error("timed out after {0:?}")]
        Timeout(Duration),
    }

    impl CollaboratorError for FakeError {
        fn is_transient(&self) -> bool {
            matches!(self, FakeError::Server | FakeError::Timeout(_))
        }

        fn deadline_exceeded(after: Duration) -> Self {
            FakeError::Timeout(after)
        }

        fn deadline(&self) -> Option<Duration> {
            match self {
                FakeError::Timeout(after) => Some(*after),
                _ => None,
            }
        }
    }

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_secs(5))
            .with_delays(Duration::from_millis(1), Duration::from_millis(2))
    }

    #[tokio::test]
    async fn test_retries_transient_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, FakeError> = with_retry(&fast_policy(3), "op", || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 { Err(FakeError::Server) } else { Ok(n) }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_permanent_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<(), FakeError> = with_retry(&fast_policy(5), "op", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(FakeError::BadRequest)
        })
        .await;

        assert!(matches!(result, Err(FakeError::BadRequest)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), FakeError> = with_retry(&fast_policy(2), "op", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(FakeError::Server)
        })
        .await;

        assert!(matches!(result, Err(FakeError::Server)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let policy = RetryPolicy::no_retry(Duration::from_millis(50));
        let result: Result<(), FakeError> = with_retry(&policy, "op", || async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.deadline(), Some(Duration::from_millis(50)));
    }
}
