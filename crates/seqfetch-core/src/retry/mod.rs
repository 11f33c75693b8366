//! Network error classification and optional throttle backoff.
//!
//! Every network failure falls back to the next candidate extension. The
//! only exception is rate limiting (429/503), which may be retried on the
//! same address when a `ThrottlePolicy` is configured.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::ProbeError;
pub use policy::{ErrorKind, RetryDecision, ThrottlePolicy};
pub use run::run_with_backoff;
