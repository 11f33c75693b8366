//! Fatal run errors.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Conditions that abort a run. Network and decode failures never surface
/// here; they only advance the probe to the next extension.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot create output directory {}: {source}", .path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {}: {source}", .path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("engine worker stopped unexpectedly: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl EngineError {
    /// True for filesystem problems the operator has to fix before re-running.
    pub fn is_environment(&self) -> bool {
        matches!(
            self,
            EngineError::CreateOutputDir { .. } | EngineError::WriteFile { .. }
        )
    }
}
