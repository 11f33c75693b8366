use std::time::Duration;

use crate::config::ThrottleRetryConfig;

/// High-level classification of a probe failure, used for logging and for
/// the throttle backoff decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Server asked us to slow down (429, 503).
    Throttled,
    /// Network-level failure (connection reset, DNS, etc.).
    Connection,
    /// The address does not exist (404, 410); the usual end-of-sequence signal.
    NotFound,
    /// Server error other than throttling.
    Http5xx(u16),
    /// Anything else.
    Other,
}

/// Decision returned by the throttle policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Give up on this address; the engine tries the next extension.
    NoRetry,
    /// Retry the same address after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff applied only to throttled responses.
#[derive(Debug, Clone, Copy)]
pub struct ThrottlePolicy {
    /// Maximum number of attempts per address (including the first).
    pub max_attempts: u32,
    /// Base delay for backoff.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        ThrottlePolicy::from(&ThrottleRetryConfig::default())
    }
}

impl From<&ThrottleRetryConfig> for ThrottlePolicy {
    fn from(cfg: &ThrottleRetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(cfg.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(cfg.max_delay_secs),
        }
    }
}

impl ThrottlePolicy {
    /// `attempt` is 1-based (1 = first attempt). Only `Throttled` is retried.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }
        match kind {
            ErrorKind::Throttled => {
                let exp = 1u32 << attempt.saturating_sub(1).min(8);
                let delay = self.base_delay.saturating_mul(exp).min(self.max_delay);
                RetryDecision::RetryAfter(delay)
            }
            ErrorKind::Timeout
            | ErrorKind::Connection
            | ErrorKind::NotFound
            | ErrorKind::Http5xx(_)
            | ErrorKind::Other => RetryDecision::NoRetry,
        }
    }
}
