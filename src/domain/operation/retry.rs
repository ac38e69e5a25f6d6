use serde::Serialize;
use std::num::NonZeroU32;
use thiserror::Error;
use tracing::debug;

use super::Operation;

/// Tags a failure as worth another attempt or terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision<E> {
    Retry(E),
    DoNotRetry(E),
}

impl<E> RetryDecision<E> {
    pub fn is_retryable(&self) -> bool {
        matches!(self, RetryDecision::Retry(_))
    }

    pub fn into_inner(self) -> E {
        match self {
            RetryDecision::Retry(error) | RetryDecision::DoNotRetry(error) => error,
        }
    }
}

/// Terminal failure of [`retry`].
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error; carries the last one observed.
    #[error("Gave up after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: E },

    #[error("{0}")]
    NotRetryable(E),
}

impl<E> RetryError<E> {
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Exhausted { last_error, .. } => last_error,
            RetryError::NotRetryable(error) => error,
        }
    }
}

/// Re-invokes `operation` until it succeeds, fails with
/// [`RetryDecision::DoNotRetry`], or `attempts` invocations have failed.
///
/// The first invocation counts as attempt 1, so `operation` never runs more than
/// `attempts` times.
pub fn retry<T, E, F>(attempts: NonZeroU32, mut operation: F) -> Operation<T, RetryError<E>>
where
    T: Send + 'static,
    E: Send + 'static,
    F: FnMut() -> Operation<T, RetryDecision<E>> + Send + 'static,
{
    let max_attempts = attempts.get();
    Operation::from_future(async move {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(RetryDecision::DoNotRetry(error)) => {
                    debug!(attempt, "operation failed with a non-retryable error");
                    return Err(RetryError::NotRetryable(error));
                }
                Err(RetryDecision::Retry(error)) if attempt >= max_attempts => {
                    debug!(attempt, "retry attempts exhausted");
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last_error: error,
                    });
                }
                Err(RetryDecision::Retry(_)) => {
                    debug!(attempt, max_attempts, "operation failed, retrying");
                    attempt += 1;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    };

    fn attempts(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_retry_exhausts_exactly_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = Arc::clone(&calls);

        let result: Result<(), _> = retry(attempts(5), move || {
            let n = calls_clone.fetch_add(1, Ordering::SeqCst) + 1;
            Operation::fail(RetryDecision::Retry(format!("pending {n}")))
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(
            result,
            Err(RetryError::Exhausted {
                attempts: 5,
                last_error: "pending 5".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_retry_stops_on_do_not_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = Arc::clone(&calls);

        let result: Result<(), _> = retry(attempts(5), move || {
            let n = calls_clone.fetch_add(1, Ordering::SeqCst) + 1;
            if n == 2 {
                Operation::fail(RetryDecision::DoNotRetry("rpc down"))
            } else {
                Operation::fail(RetryDecision::Retry("pending"))
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(result, Err(RetryError::NotRetryable("rpc down")));
    }

    #[tokio::test]
    async fn test_retry_succeeds_on_first_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = Arc::clone(&calls);

        let result = retry(attempts(5), move || {
            let n = calls_clone.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Operation::fail(RetryDecision::Retry("pending"))
            } else {
                Operation::pure(n)
            }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_single_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = Arc::clone(&calls);

        let result: Result<(), _> = retry(attempts(1), move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            Operation::fail(RetryDecision::Retry(1))
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(RetryError::Exhausted { attempts: 1, .. })));
    }

    #[test]
    fn test_decision_helpers() {
        assert!(RetryDecision::Retry(1).is_retryable());
        assert!(!RetryDecision::DoNotRetry(1).is_retryable());
        assert_eq!(RetryDecision::DoNotRetry(7).into_inner(), 7);
        assert_eq!(
            RetryError::Exhausted {
                attempts: 2,
                last_error: "x"
            }
            .into_inner(),
            "x"
        );
    }
}
