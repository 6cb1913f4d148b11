//! Bounded linear backoff for session verification
//!
//! One scheduler is created per reconciliation and dropped with it. Every
//! wait races the reconciliation's cancellation token, so teardown ends a
//! pending retry immediately.

use std::time::Duration;

use calgentic_domain::RetrySettings;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Retry policy derived from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub settle_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            base_delay: Duration::from_millis(settings.base_delay_ms),
            settle_delay: Duration::from_millis(settings.settle_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RetryError {
    #[error("retry budget exhausted after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("retry cancelled")]
    Cancelled,
}

/// Retry state owned by one in-flight reconciliation.
#[derive(Debug)]
pub struct RetryScheduler {
    policy: RetryPolicy,
    attempt: u32,
    cancel: CancellationToken,
}

impl RetryScheduler {
    pub fn new(policy: RetryPolicy, cancel: CancellationToken) -> Self {
        Self { policy, attempt: 0, cancel }
    }

    /// Retries scheduled so far.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.attempt >= self.policy.max_attempts
    }

    /// Advances to the next attempt and waits `base_delay * attempt`.
    ///
    /// # Errors
    /// `Exhausted` once `max_attempts` retries have been used, `Cancelled` if
    /// the token fires during the wait.
    pub async fn wait_next(&mut self) -> Result<u32, RetryError> {
        if self.is_exhausted() {
            return Err(RetryError::Exhausted { attempts: self.attempt });
        }

        self.attempt += 1;
        let delay = self.policy.delay_for(self.attempt);
        debug!(
            attempt = self.attempt,
            max_attempts = self.policy.max_attempts,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "Scheduling session verification retry"
        );

        self.sleep(delay).await?;
        Ok(self.attempt)
    }

    /// Waits the configured settle delay once. No-op when zero.
    ///
    /// # Errors
    /// `Cancelled` if the token fires during the wait.
    pub async fn settle(&self) -> Result<(), RetryError> {
        if self.policy.settle_delay.is_zero() {
            return Ok(());
        }
        self.sleep(self.policy.settle_delay).await
    }

    async fn sleep(&self, delay: Duration) -> Result<(), RetryError> {
        tokio::select! {
            () = self.cancel.cancelled() => {
                debug!("Retry wait cancelled");
                Err(RetryError::Cancelled)
            }
            () = tokio::time::sleep(delay) => Ok(()),
        }
    }
}
