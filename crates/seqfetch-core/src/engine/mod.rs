//! Sequential fetch engine.
//!
//! For each index, starting at the request's start index, tries every
//! candidate extension in priority order: GET → decode → canonical encode →
//! persist. The first extension that survives all steps wins the index.
//! Indices where every extension failed extend a failure streak; the run ends
//! when the streak reaches the configured threshold, since the true length of
//! the sequence is never known in advance.
//!
//! One request is in flight at a time. The loop itself is synchronous
//! ([`Engine::run`]); [`Engine::spawn`] moves it to a blocking worker and
//! hands the caller a [`RunHandle`] for events, cancellation, and completion.

mod error;
mod event;
mod handle;
mod state;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use crate::config::{OutputConfig, SeqfetchConfig};
use crate::control::CancelToken;
use crate::convert;
use crate::http::ImageSource;
use crate::request::FetchRequest;
use crate::retry::{classify, run_with_backoff, ThrottlePolicy};
use crate::storage;
use crate::url_model::{self, CandidateExtension, ExtensionError};

pub use error::EngineError;
pub use event::{ProgressEvent, RunSummary, StopReason};
pub use handle::RunHandle;
pub use state::{FetchOutcome, RunState};

/// Tunables of one run (threshold, extension order, output encoding, throttle backoff).
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Consecutive fully-failed indices that end the run. Values below 1 act as 1.
    pub failure_threshold: u32,
    /// Tried in this order for every index.
    pub extensions: Vec<CandidateExtension>,
    pub output: OutputConfig,
    /// Backoff for 429/503 on the same address; `None` treats them as plain failures.
    pub throttle: Option<ThrottlePolicy>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            extensions: url_model::default_candidates(),
            output: OutputConfig::default(),
            throttle: None,
        }
    }
}

impl EngineOptions {
    pub fn from_config(cfg: &SeqfetchConfig) -> Result<Self, ExtensionError> {
        let extensions = cfg
            .extensions
            .iter()
            .map(|e| e.parse::<CandidateExtension>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            failure_threshold: cfg.failure_threshold,
            extensions,
            output: cfg.output.clone(),
            throttle: cfg.throttle_retry.as_ref().map(ThrottlePolicy::from),
        })
    }
}

/// The probe-and-save loop for one [`FetchRequest`].
pub struct Engine<S> {
    request: FetchRequest,
    output_dir: PathBuf,
    options: EngineOptions,
    source: S,
}

impl<S: ImageSource> Engine<S> {
    pub fn new(
        request: FetchRequest,
        output_dir: impl Into<PathBuf>,
        options: EngineOptions,
        source: S,
    ) -> Self {
        Self {
            request,
            output_dir: output_dir.into(),
            options,
            source,
        }
    }

    pub fn request(&self) -> &FetchRequest {
        &self.request
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Runs until the failure streak reaches the threshold or `cancel` is set.
    ///
    /// Every event is passed to `emit` in order, ending with `Finished`. The
    /// only errors are environment failures (output directory, file write),
    /// which abort immediately without a `Finished` event.
    pub fn run(
        &self,
        cancel: &CancelToken,
        emit: &mut dyn FnMut(ProgressEvent),
    ) -> Result<RunSummary, EngineError> {
        storage::ensure_output_dir(&self.output_dir).map_err(|source| {
            EngineError::CreateOutputDir {
                path: self.output_dir.clone(),
                source,
            }
        })?;

        let threshold = self.options.failure_threshold.max(1);
        let mut state = RunState::new(self.request.start_index());
        let mut last_index = None;

        tracing::info!(
            base = %self.request.base_address(),
            prefix = %self.request.prefix(),
            mode = %self.request.naming_mode(),
            start = self.request.start_index(),
            threshold,
            out = %self.output_dir.display(),
            "run started"
        );
        emit(ProgressEvent::Started {
            start_index: self.request.start_index(),
            output_dir: self.output_dir.clone(),
            failure_threshold: threshold,
        });

        let reason = loop {
            if state.streak_reached(threshold) {
                break StopReason::FailureStreak;
            }
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            let index = state.current_index();
            let Some(outcome) = self.probe_index(index, cancel, emit)? else {
                break StopReason::Cancelled;
            };
            state.record(&outcome);
            last_index = Some(index);
            match outcome {
                FetchOutcome::Saved(path) => {
                    tracing::info!(index, path = %path.display(), "saved");
                    emit(ProgressEvent::Saved {
                        index,
                        path,
                        total_saved: state.total_saved(),
                    });
                }
                FetchOutcome::ExhaustedFormats => {
                    tracing::warn!(
                        index,
                        streak = state.consecutive_failures(),
                        "no candidate extension succeeded"
                    );
                    emit(ProgressEvent::IndexExhausted {
                        index,
                        consecutive_failures: state.consecutive_failures(),
                    });
                }
            }
            state.advance();
            emit(ProgressEvent::Progress {
                next_index: state.current_index(),
                total_saved: state.total_saved(),
            });
        };

        let summary = RunSummary {
            total_saved: state.total_saved(),
            last_index,
            consecutive_failures: state.consecutive_failures(),
            reason,
        };
        tracing::info!(
            saved = summary.total_saved,
            last_index = ?summary.last_index,
            reason = ?summary.reason,
            "run finished"
        );
        emit(ProgressEvent::Finished {
            summary: summary.clone(),
        });
        Ok(summary)
    }

    /// Tries each extension for `index`. `Ok(None)` means cancelled mid-index;
    /// the index then counts neither as saved nor as failed.
    fn probe_index(
        &self,
        index: u64,
        cancel: &CancelToken,
        emit: &mut dyn FnMut(ProgressEvent),
    ) -> Result<Option<FetchOutcome>, EngineError> {
        let stem = self.request.file_stem(index);
        let file_name = url_model::local_file_name(&stem, self.options.output.format.extension());

        for ext in &self.options.extensions {
            if cancel.is_cancelled() {
                return Ok(None);
            }
            let url = self.request.address_for(index, ext.as_str());
            tracing::debug!(index, ext = %ext, "GET {}", url);
            emit(ProgressEvent::Attempt {
                index,
                extension: ext.to_string(),
                url: url.clone(),
            });

            let body = match run_with_backoff(self.options.throttle.as_ref(), cancel, || {
                self.source.get(&url)
            }) {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(index, ext = %ext, kind = ?classify(&e), "fetch failed: {}", e);
                    emit(attempt_failed(index, ext, &url, e.to_string()));
                    continue;
                }
            };

            let canonical = match convert::canonicalize(&body, &self.options.output) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(index, ext = %ext, bytes = body.len(), "{}", e);
                    emit(attempt_failed(index, ext, &url, e.to_string()));
                    continue;
                }
            };
            if canonical.converted(self.options.output.format) {
                emit(ProgressEvent::Converting {
                    index,
                    from: convert::format_name(canonical.source_format).to_string(),
                    to: self.options.output.format.extension().to_string(),
                });
            }

            let path = storage::persist(&self.output_dir, &file_name, &canonical.bytes).map_err(
                |source| EngineError::WriteFile {
                    path: self.output_dir.join(&file_name),
                    source,
                },
            )?;
            return Ok(Some(FetchOutcome::Saved(path)));
        }
        Ok(Some(FetchOutcome::ExhaustedFormats))
    }
}

impl<S: ImageSource + 'static> Engine<S> {
    /// Runs the loop on a dedicated blocking worker. Must be called inside a
    /// Tokio runtime.
    pub fn spawn(self) -> RunHandle {
        handle::spawn(self)
    }
}

fn attempt_failed(index: u64, ext: &CandidateExtension, url: &str, reason: String) -> ProgressEvent {
    ProgressEvent::AttemptFailed {
        index,
        extension: ext.to_string(),
        url: url.to_string(),
        reason,
    }
}
