//! Progress reporting from a running conversion to its caller.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Where a conversion currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStage {
    Idle,
    Parsing,
    Indexing,
    BuildingMetadata,
    Writing { channel: usize, level: u32 },
    Done,
    Failed,
}

impl ConversionStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConversionStage::Done | ConversionStage::Failed)
    }
}

impl fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionStage::Idle => f.write_str("idle"),
            ConversionStage::Parsing => f.write_str("parsing descriptor"),
            ConversionStage::Indexing => f.write_str("indexing pyramid"),
            ConversionStage::BuildingMetadata => f.write_str("building metadata"),
            ConversionStage::Writing { channel, level } => {
                write!(f, "writing channel {} level {}", channel, level)
            }
            ConversionStage::Done => f.write_str("done"),
            ConversionStage::Failed => f.write_str("failed"),
        }
    }
}

/// Receives notifications from a conversion. Called only from the thread
/// running the conversion.
pub trait ProgressSink: Send + Sync {
    /// Called once after every page write.
    fn on_progress(&self, completed: u64, total: u64);

    fn on_status(&self, _message: &str) {}

    fn on_stage(&self, _stage: ConversionStage) {}
}

/// Discards all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_progress(&self, _completed: u64, _total: u64) {}
}

#[derive(Debug)]
struct ProgressState {
    completed: AtomicU64,
    total: AtomicU64,
    status: Mutex<String>,
    stage: Mutex<ConversionStage>,
}

/// Progress counters that can be polled from another thread.
///
/// Reads are eventually consistent: a poll may miss intermediate values.
#[derive(Debug, Clone)]
pub struct SharedProgress {
    state: Arc<ProgressState>,
}

impl Default for SharedProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedProgress {
    pub fn new() -> Self {
        Self {
            state: Arc::new(ProgressState {
                completed: AtomicU64::new(0),
                total: AtomicU64::new(0),
                status: Mutex::new("Status: Idle".to_string()),
                stage: Mutex::new(ConversionStage::Idle),
            }),
        }
    }

    /// `(completed, total)` units as last observed.
    pub fn snapshot(&self) -> (u64, u64) {
        (
            self.state.completed.load(Ordering::Relaxed),
            self.state.total.load(Ordering::Relaxed),
        )
    }

    pub fn status(&self) -> String {
        self.state
            .status
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn stage(&self) -> ConversionStage {
        self.state
            .stage
            .lock()
            .map(|s| *s)
            .unwrap_or(ConversionStage::Failed)
    }
}

impl ProgressSink for SharedProgress {
    fn on_progress(&self, completed: u64, total: u64) {
        self.state.total.store(total, Ordering::Relaxed);
        self.state.completed.store(completed, Ordering::Relaxed);
    }

    fn on_status(&self, message: &str) {
        if let Ok(mut status) = self.state.status.lock() {
            *status = message.to_string();
        }
    }

    fn on_stage(&self, stage: ConversionStage) {
        if let Ok(mut current) = self.state.stage.lock() {
            *current = stage;
        }
    }
}
