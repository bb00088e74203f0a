use std::future::Future;
use std::time::Duration;

use ghpc_comments::github_transport_helpers::retry_delay;
use tokio::sync::watch;

use crate::remote_error::RemoteCallError;

#[derive(Debug)]
/// Last error of an operation that exhausted its attempts or was cancelled.
pub struct RetryFailure {
    pub attempts: usize,
    pub error: RemoteCallError,
}

/// Cancellation receiver that never fires.
pub fn no_cancellation() -> watch::Receiver<bool> {
    let (_cancel_tx, cancel_rx) = watch::channel(false);
    cancel_rx
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Bounded exponential backoff shared by every GitHub call.
pub struct RetryPolicy {
    max_attempts: usize,
    base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_BASE_DELAY_MS)
    }
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
    pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;

    pub fn new(max_attempts: usize, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn delay_after(&self, attempt: usize, error: &RemoteCallError) -> Duration {
        retry_delay(self.base_delay_ms, attempt, error.retry_after())
    }

    /// Run `call` until it succeeds, `max_attempts` is reached, or the
    /// cancellation signal flips. Both in-flight calls and backoff sleeps are
    /// abandoned on cancellation.
    pub async fn run<T, F, Fut>(
        &self,
        operation: &str,
        cancel_rx: &watch::Receiver<bool>,
        mut call: F,
    ) -> Result<T, RetryFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteCallError>>,
    {
        let mut cancel_rx = cancel_rx.clone();
        let mut attempt = 0_usize;
        loop {
            if *cancel_rx.borrow() {
                return Err(RetryFailure {
                    attempts: attempt,
                    error: RemoteCallError::Cancelled,
                });
            }
            attempt = attempt.saturating_add(1);
            let outcome = tokio::select! {
                outcome = call() => outcome,
                _ = wait_for_cancel(&mut cancel_rx) => Err(RemoteCallError::Cancelled),
            };
            let error = match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!(operation, attempt, "github call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };
            if error.is_cancelled() || attempt >= self.max_attempts {
                tracing::warn!(
                    operation,
                    attempt,
                    max_attempts = self.max_attempts,
                    error = %error,
                    "github call failed; giving up"
                );
                return Err(RetryFailure { attempts: attempt, error });
            }

            let delay = self.delay_after(attempt, &error);
            tracing::warn!(
                operation,
                attempt,
                max_attempts = self.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "github call failed; retrying"
            );
            let slept = tokio::select! {
                _ = tokio::time::sleep(delay) => true,
                _ = wait_for_cancel(&mut cancel_rx) => false,
            };
            if !slept {
                return Err(RetryFailure {
                    attempts: attempt,
                    error: RemoteCallError::Cancelled,
                });
            }
        }
    }
}

async fn wait_for_cancel(cancel_rx: &mut watch::Receiver<bool>) {
    loop {
        if *cancel_rx.borrow() {
            return;
        }
        if cancel_rx.changed().await.is_err() {
            // Sender dropped: nothing can cancel anymore.
            std::future::pending::<()>().await;
        }
    }
}
