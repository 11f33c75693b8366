//! Progress narration sent from the engine to its caller.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Why a run ended. Neither is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The consecutive-failure threshold was reached: the sequence has ended.
    FailureStreak,
    /// The caller cancelled the run.
    Cancelled,
}

/// Final counters of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total_saved: u64,
    /// Last index whose probe completed, if any.
    pub last_index: Option<u64>,
    pub consecutive_failures: u32,
    pub reason: StopReason,
}

/// One line of narration. `Display` gives the human-readable text; the serde
/// form (`{"event": "saved", ...}`) is for machine consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    Started {
        start_index: u64,
        output_dir: PathBuf,
        failure_threshold: u32,
    },
    Attempt {
        index: u64,
        extension: String,
        url: String,
    },
    AttemptFailed {
        index: u64,
        extension: String,
        url: String,
        reason: String,
    },
    Converting {
        index: u64,
        from: String,
        to: String,
    },
    Saved {
        index: u64,
        path: PathBuf,
        total_saved: u64,
    },
    IndexExhausted {
        index: u64,
        consecutive_failures: u32,
    },
    Progress {
        next_index: u64,
        total_saved: u64,
    },
    Finished {
        summary: RunSummary,
    },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Started {
                start_index,
                output_dir,
                failure_threshold,
            } => write!(
                f,
                "Starting at index {} into {} (stops after {} consecutive missing indices)",
                start_index,
                output_dir.display(),
                failure_threshold
            ),
            ProgressEvent::Attempt { url, .. } => write!(f, "Attempting to download: {}", url),
            ProgressEvent::AttemptFailed {
                url,
                extension,
                reason,
                ..
            } => write!(
                f,
                "Failed to download: {} (Format: {}) Error: {}",
                url, extension, reason
            ),
            ProgressEvent::Converting { from, to, .. } => write!(f, "Converting {} to {}", from, to),
            ProgressEvent::Saved { path, .. } => write!(f, "Saved: {}", path.display()),
            ProgressEvent::IndexExhausted {
                index,
                consecutive_failures,
            } => write!(
                f,
                "No candidate format found for index {} ({} consecutive)",
                index, consecutive_failures
            ),
            ProgressEvent::Progress {
                next_index,
                total_saved,
            } => write!(f, "Progress: next index {}, {} saved", next_index, total_saved),
            ProgressEvent::Finished { summary } => {
                let head = match summary.reason {
                    StopReason::FailureStreak => "Download finished.",
                    StopReason::Cancelled => "Download cancelled.",
                };
                write!(f, "{} {} image(s) saved", head, summary.total_saved)?;
                if let Some(last) = summary.last_index {
                    write!(f, ", last index tried {}", last)?;
                }
                Ok(())
            }
        }
    }
}
