//! Browser-identifying request headers.

use crate::config::HeadersConfig;

/// The fixed header set sent with every GET. The origin rejects requests
/// that do not look like they come from a browser.
#[derive(Debug, Clone)]
pub struct BrowserHeaders {
    pub user_agent: String,
    pub referer: String,
}

impl Default for BrowserHeaders {
    fn default() -> Self {
        BrowserHeaders::from(&HeadersConfig::default())
    }
}

impl From<&HeadersConfig> for BrowserHeaders {
    fn from(cfg: &HeadersConfig) -> Self {
        Self {
            user_agent: cfg.user_agent.clone(),
            referer: cfg.referer.clone(),
        }
    }
}

impl BrowserHeaders {
    /// `Name: value` lines, excluding `Accept-Encoding`, which libcurl sets
    /// itself so that it can decode the body.
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("User-Agent: {}", self.user_agent),
            "Accept: text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8"
                .to_string(),
            "Accept-Language: en-US,en;q=0.9".to_string(),
            "DNT: 1".to_string(),
            "Connection: keep-alive".to_string(),
            "Upgrade-Insecure-Requests: 1".to_string(),
            format!("Referer: {}", self.referer),
        ]
    }
}
