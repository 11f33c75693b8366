//! Candidate extensions tried for every index.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtensionError {
    #[error("extension is empty")]
    Empty,
    #[error("extension {0:?} contains a character not allowed in a file name")]
    InvalidChar(String),
}

/// One recognized image extension, stored with its leading dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateExtension(String);

/// Default priority order: JPEG spellings first, then WebP, then PNG.
pub fn default_candidates() -> Vec<CandidateExtension> {
    [".jpg", ".jpeg", ".webp", ".png"]
        .iter()
        .map(|e| CandidateExtension((*e).to_string()))
        .collect()
}

impl CandidateExtension {
    /// The extension as it appears in the address, e.g. `".jpg"`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CandidateExtension {
    type Err = ExtensionError;

    /// Accepts `"jpg"` or `".jpg"`; the dot is added when missing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bare = s.trim().trim_start_matches('.');
        if bare.is_empty() {
            return Err(ExtensionError::Empty);
        }
        if bare
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '?' | '#' | '.') || c.is_whitespace() || c.is_control())
        {
            return Err(ExtensionError::InvalidChar(s.to_string()));
        }
        Ok(CandidateExtension(format!(".{}", bare)))
    }
}

impl fmt::Display for CandidateExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
