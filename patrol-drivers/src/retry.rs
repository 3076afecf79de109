//! Retry-until-success-or-budget-exhausted, the one primitive behind every
//! element accessor in the workspace.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, warn};

use crate::error::DriverError;

/// How often to re-attempt an operation and how long to pause in between.
///
/// The backoff is fixed: no exponential growth, no jitter. One browser
/// session is driven sequentially, so there is nothing to desynchronise
/// from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one; a policy that never
    /// attempts anything has no meaning.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Element-level reads: quick to re-issue, quick to settle.
    pub fn element() -> Self {
        Self::new(3, Duration::from_millis(250))
    }

    /// Payload-level operations that touch more of the page per attempt.
    pub fn payload() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Attempt `op` up to `policy.max_attempts` times.
///
/// A failure the classifier accepts is logged and retried after
/// `policy.backoff`; one it rejects propagates immediately, untouched.
/// Exhausting the budget yields [`DriverError::RetryExhausted`] naming the
/// operation, never a silent null.
pub async fn retry<T, F, Fut, C>(
    operation: &str,
    policy: RetryPolicy,
    is_retryable: C,
    mut op: F,
) -> Result<T, DriverError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DriverError>>,
    C: Fn(&DriverError) -> bool,
{
    let attempts = policy.max_attempts.max(1);
    let mut last: Option<DriverError> = None;

    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if is_retryable(&err) => {
                warn!(operation, attempt, error = %err, "retryable failure");
                last = Some(err);
                if attempt < attempts {
                    sleep(policy.backoff).await;
                }
            }
            Err(err) => return Err(err),
        }
    }

    if let Some(err) = last {
        error!(operation, attempts, error = %err, "retry budget exhausted");
    }
    Err(DriverError::RetryExhausted {
        operation: operation.to_string(),
        attempts,
    })
}
