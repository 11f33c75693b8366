//! Start / cancel / await contract around a running engine.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{Engine, EngineError, ProgressEvent, RunSummary};
use crate::control::CancelToken;
use crate::http::ImageSource;

/// Caller-side view of a run. Events arrive as immutable snapshots; the
/// engine's counters stay on the worker.
pub struct RunHandle {
    events: mpsc::UnboundedReceiver<ProgressEvent>,
    cancel: CancelToken,
    task: JoinHandle<Result<RunSummary, EngineError>>,
}

pub(super) fn spawn<S: ImageSource + 'static>(engine: Engine<S>) -> RunHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();
    let task = tokio::task::spawn_blocking(move || {
        let mut emit = |event: ProgressEvent| {
            // Receiver gone means nobody is listening; the run still completes.
            let _ = tx.send(event);
        };
        engine.run(&worker_cancel, &mut emit)
    });
    RunHandle {
        events: rx,
        cancel,
        task,
    }
}

impl RunHandle {
    /// Ask the run to stop before its next attempt.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this run, for use from another task (e.g. a signal handler).
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Next event, or `None` once the run has ended and all events were read.
    pub async fn next_event(&mut self) -> Option<ProgressEvent> {
        self.events.recv().await
    }

    /// Wait for the worker to finish. Unread events are dropped.
    pub async fn wait(self) -> Result<RunSummary, EngineError> {
        self.task.await?
    }
}
