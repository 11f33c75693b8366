//! Retry loop for one address: run a probe until success or the policy says stop.

use super::classify;
use super::error::ProbeError;
use super::policy::{RetryDecision, ThrottlePolicy};
use crate::control::CancelToken;

/// Runs `f` once, or repeatedly while `policy` asks for a throttle backoff.
/// Sleeps between attempts on the calling thread; stops early if `cancel` is set.
pub fn run_with_backoff<T, F>(
    policy: Option<&ThrottlePolicy>,
    cancel: &CancelToken,
    mut f: F,
) -> Result<T, ProbeError>
where
    F: FnMut() -> Result<T, ProbeError>,
{
    let mut attempt = 1u32;
    loop {
        let err = match f() {
            Ok(v) => return Ok(v),
            Err(e) => e,
        };
        let Some(policy) = policy else {
            return Err(err);
        };
        match policy.decide(attempt, classify::classify(&err)) {
            RetryDecision::NoRetry => return Err(err),
            RetryDecision::RetryAfter(d) => {
                tracing::debug!(attempt, delay_ms = d.as_millis() as u64, "throttled: {}", err);
                std::thread::sleep(d);
                if cancel.is_cancelled() {
                    return Err(err);
                }
                attempt += 1;
            }
        }
    }
}
