//! Blocking GET via libcurl.

use std::time::Duration;

use super::{BrowserHeaders, ImageSource};
use crate::retry::ProbeError;

/// libcurl-backed [`ImageSource`]. A fresh easy handle is used per request.
#[derive(Debug, Clone)]
pub struct CurlSource {
    timeout: Duration,
    headers: BrowserHeaders,
}

impl CurlSource {
    pub fn new(timeout: Duration, headers: BrowserHeaders) -> Self {
        Self { timeout, headers }
    }
}

impl ImageSource for CurlSource {
    /// Performs a GET and returns the body. Follows redirects (libcurl
    /// default limit); non-2xx is `ProbeError::Http`.
    fn get(&self, url: &str) -> Result<Vec<u8>, ProbeError> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.timeout)?;
        easy.timeout(self.timeout)?;
        // Empty string: advertise every encoding libcurl can decode.
        easy.accept_encoding("")?;

        let mut list = curl::easy::List::new();
        for line in self.headers.lines() {
            list.append(&line)?;
        }
        easy.http_headers(list)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(ProbeError::Http(code));
        }
        Ok(body)
    }
}
