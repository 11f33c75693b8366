//! HTTP GET of candidate addresses.
//!
//! The engine only depends on the [`ImageSource`] trait; [`CurlSource`] is the
//! libcurl-backed implementation used in production.

mod curl_source;
mod headers;

pub use curl_source::CurlSource;
pub use headers::BrowserHeaders;

use std::sync::Arc;

use crate::retry::ProbeError;

/// Fetches the full body of one address. Implementations are blocking; the
/// engine runs on a dedicated worker thread.
pub trait ImageSource: Send {
    fn get(&self, url: &str) -> Result<Vec<u8>, ProbeError>;
}

impl<S: ImageSource + Sync + ?Sized> ImageSource for Arc<S> {
    fn get(&self, url: &str) -> Result<Vec<u8>, ProbeError> {
        (**self).get(url)
    }
}
