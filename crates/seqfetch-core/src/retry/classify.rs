//! Classify HTTP status and curl errors into error kinds.

use super::error::ProbeError;
use super::policy::ErrorKind;

/// Classify an HTTP status code.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        404 | 410 => ErrorKind::NotFound,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Classify a curl error.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify a probe error (curl or HTTP) into an ErrorKind.
pub fn classify(e: &ProbeError) -> ErrorKind {
    match e {
        ProbeError::Curl(ce) => classify_curl_error(ce),
        ProbeError::Http(code) => classify_http_status(*code),
    }
}
