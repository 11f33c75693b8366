//! The validated, immutable input of one run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// URL-construction convention of the origin the link was copied from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingMode {
    /// `{base}/{stem}{ext}?{token}`
    TokenQuery,
    /// `{base}/{stem}{ext}`; any token is ignored.
    PathOnly,
}

impl fmt::Display for NamingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingMode::TokenQuery => write!(f, "token"),
            NamingMode::PathOnly => write!(f, "path"),
        }
    }
}

impl FromStr for NamingMode {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "token" | "token-query" => Ok(NamingMode::TokenQuery),
            "path" | "path-only" => Ok(NamingMode::PathOnly),
            other => Err(RequestError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("base address is empty")]
    EmptyBase,
    #[error("base address is not a valid http(s) URL: {0}")]
    InvalidBase(String),
    #[error("file-name prefix is empty")]
    EmptyPrefix,
    #[error("token-query naming requires a non-empty access token")]
    MissingToken,
    #[error("start index must be at least 1")]
    ZeroStartIndex,
    #[error("digit width must be at least 1")]
    ZeroDigitWidth,
    #[error("unknown naming mode {0:?} (expected \"token\" or \"path\")")]
    UnknownMode(String),
}

/// Everything the engine needs to know about the remote sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    base_address: String,
    token: String,
    prefix: String,
    start_index: u64,
    digit_width: usize,
    naming_mode: NamingMode,
}

impl FetchRequest {
    /// Validates and builds a request. A trailing `/` on the base address is dropped
    /// so composed addresses never contain `//` before the file stem.
    pub fn new(
        base_address: &str,
        token: &str,
        prefix: &str,
        start_index: u64,
        digit_width: usize,
        naming_mode: NamingMode,
    ) -> Result<Self, RequestError> {
        let base = base_address.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(RequestError::EmptyBase);
        }
        match url::Url::parse(base) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
            _ => return Err(RequestError::InvalidBase(base.to_string())),
        }
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(RequestError::EmptyPrefix);
        }
        let token = token.trim();
        if naming_mode == NamingMode::TokenQuery && token.is_empty() {
            return Err(RequestError::MissingToken);
        }
        if start_index == 0 {
            return Err(RequestError::ZeroStartIndex);
        }
        if digit_width == 0 {
            return Err(RequestError::ZeroDigitWidth);
        }
        Ok(Self {
            base_address: base.to_string(),
            token: token.to_string(),
            prefix: prefix.to_string(),
            start_index,
            digit_width,
            naming_mode,
        })
    }

    pub fn base_address(&self) -> &str {
        &self.base_address
    }

    /// Access token, or empty in path-only mode.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn start_index(&self) -> u64 {
        self.start_index
    }

    pub fn digit_width(&self) -> usize {
        self.digit_width
    }

    pub fn naming_mode(&self) -> NamingMode {
        self.naming_mode
    }

    /// Remote address of `index` with the given candidate extension.
    pub fn address_for(&self, index: u64, extension: &str) -> String {
        crate::url_model::compose(
            &self.base_address,
            &self.token,
            &self.prefix,
            index,
            self.digit_width,
            extension,
            self.naming_mode,
        )
    }

    /// `{prefix}-{paddedIndex}` for `index`.
    pub fn file_stem(&self, index: u64) -> String {
        crate::url_model::file_stem(&self.prefix, index, self.digit_width)
    }
}
