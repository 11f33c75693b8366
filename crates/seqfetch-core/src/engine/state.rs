//! Per-run counters, owned by the engine loop.

use std::path::PathBuf;

/// Result of probing one index with every candidate extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// One extension fetched, decoded, and was persisted here.
    Saved(PathBuf),
    /// Every extension failed at the network or decode step.
    ExhaustedFormats,
}

/// Mutable run counters. Only the engine mutates them; observers see copies
/// inside progress events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    current_index: u64,
    consecutive_failures: u32,
    total_saved: u64,
}

impl RunState {
    pub(crate) fn new(start_index: u64) -> Self {
        Self {
            current_index: start_index,
            consecutive_failures: 0,
            total_saved: 0,
        }
    }

    pub fn current_index(&self) -> u64 {
        self.current_index
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn total_saved(&self) -> u64 {
        self.total_saved
    }

    /// Apply the outcome of the current index.
    pub(crate) fn record(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Saved(_) => {
                self.consecutive_failures = 0;
                self.total_saved += 1;
            }
            FetchOutcome::ExhaustedFormats => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            }
        }
    }

    pub(crate) fn advance(&mut self) {
        self.current_index = self.current_index.saturating_add(1);
    }

    /// True once the failure streak has reached `threshold`.
    pub fn streak_reached(&self, threshold: u32) -> bool {
        self.consecutive_failures >= threshold
    }
}
