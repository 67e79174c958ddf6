//! Progress tracking and reporting for batch operations

use std::sync::Arc;

use serde::Serialize;

use crate::downloader::batch::BatchSummary;

/// Progress callback for batch operations
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Phase of a single batch invocation
///
/// `Idle -> Enumerating -> {Failed | Downloading -> {Completed | Cancelled}}`.
/// There is no way back to `Idle`; every invocation is one-shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BatchPhase {
    #[default]
    Idle,
    Enumerating,
    Downloading,
    Completed,
    Failed,
    Cancelled,
}

impl BatchPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BatchPhase::Completed | BatchPhase::Failed | BatchPhase::Cancelled)
    }
}

/// Events emitted during a batch
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    EnumerationStarted {
        source_url: String,
    },
    EnumerationComplete {
        total: usize,
    },
    /// `index` is 1-based, `total` counts every enumerated entry
    ItemStarted {
        index: usize,
        total: usize,
        label: String,
    },
    ItemComplete {
        index: usize,
        label: String,
    },
    ItemFailed {
        index: usize,
        item: String,
        error: String,
    },
    RetryAttempt {
        item: String,
        attempt: usize,
        max_attempts: usize,
    },
    Warning {
        message: String,
    },
    BatchComplete {
        summary: BatchSummary,
    },
    BatchCancelled {
        summary: BatchSummary,
    },
    BatchFailed {
        error: String,
    },
}

/// Observable state of a batch, folded from its events
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressState {
    pub current_index: usize,
    pub total: usize,
    pub current_label: String,
    pub phase: BatchPhase,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an event to the state
    ///
    /// Events arriving after a terminal phase are ignored.
    pub fn apply(&mut self, event: &ProgressEvent) {
        if self.phase.is_terminal() {
            return;
        }

        match event {
            ProgressEvent::EnumerationStarted { source_url } => {
                self.phase = BatchPhase::Enumerating;
                self.current_label = source_url.clone();
            }
            ProgressEvent::EnumerationComplete { total } => {
                self.total = *total;
            }
            ProgressEvent::ItemStarted { index, total, label } => {
                self.phase = BatchPhase::Downloading;
                self.current_index = *index;
                self.total = *total;
                self.current_label = label.clone();
            }
            ProgressEvent::BatchComplete { .. } => {
                self.phase = BatchPhase::Completed;
            }
            ProgressEvent::BatchCancelled { .. } => {
                self.phase = BatchPhase::Cancelled;
            }
            ProgressEvent::BatchFailed { error } => {
                self.phase = BatchPhase::Failed;
                self.current_label = error.clone();
            }
            ProgressEvent::ItemComplete { .. }
            | ProgressEvent::ItemFailed { .. }
            | ProgressEvent::RetryAttempt { .. }
            | ProgressEvent::Warning { .. } => {}
        }
    }
}

/// Trait for progress reporting with more granular control
pub trait ProgressReporter: Send + Sync {
    fn on_enumeration_started(&self, _source_url: &str) {}
    fn on_enumeration_complete(&self, _total: usize) {}
    fn on_item_started(&self, _index: usize, _total: usize, _label: &str) {}
    fn on_item_complete(&self, _index: usize, _label: &str) {}
    fn on_item_failed(&self, _index: usize, _item: &str, _error: &str) {}
    fn on_retry_attempt(&self, _item: &str, _attempt: usize, _max_attempts: usize) {}
    fn on_warning(&self, _message: &str) {}
    fn on_batch_complete(&self, _summary: &BatchSummary) {}
    fn on_batch_cancelled(&self, _summary: &BatchSummary) {}
    fn on_batch_failed(&self, _error: &str) {}
}

/// Extension trait to convert ProgressReporter to ProgressCallback
pub trait IntoProgressCallback {
    fn into_callback(self) -> ProgressCallback;
}

impl<T: ProgressReporter + 'static> IntoProgressCallback for T {
    fn into_callback(self) -> ProgressCallback {
        Arc::new(move |event| match event {
            ProgressEvent::EnumerationStarted { source_url } => {
                self.on_enumeration_started(&source_url);
            }
            ProgressEvent::EnumerationComplete { total } => {
                self.on_enumeration_complete(total);
            }
            ProgressEvent::ItemStarted { index, total, label } => {
                self.on_item_started(index, total, &label);
            }
            ProgressEvent::ItemComplete { index, label } => {
                self.on_item_complete(index, &label);
            }
            ProgressEvent::ItemFailed { index, item, error } => {
                self.on_item_failed(index, &item, &error);
            }
            ProgressEvent::RetryAttempt { item, attempt, max_attempts } => {
                self.on_retry_attempt(&item, attempt, max_attempts);
            }
            ProgressEvent::Warning { message } => {
                self.on_warning(&message);
            }
            ProgressEvent::BatchComplete { summary } => {
                self.on_batch_complete(&summary);
            }
            ProgressEvent::BatchCancelled { summary } => {
                self.on_batch_cancelled(&summary);
            }
            ProgressEvent::BatchFailed { error } => {
                self.on_batch_failed(&error);
            }
        })
    }
}

/// Simple console progress reporter implementation
#[derive(Debug, Default)]
pub struct ConsoleProgressReporter {
    pub verbose: bool,
}

impl ConsoleProgressReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn on_enumeration_started(&self, source_url: &str) {
        if self.verbose {
            println!("🔎 Listing items of {}", source_url);
        }
    }

    fn on_enumeration_complete(&self, total: usize) {
        println!("📋 Total: {}", total);
    }

    fn on_item_started(&self, index: usize, total: usize, label: &str) {
        println!("⏬ Downloading {} of {}: {}", index, total, label);
    }

    fn on_item_complete(&self, index: usize, label: &str) {
        if self.verbose {
            println!("✅ #{} done: {}", index, label);
        }
    }

    fn on_item_failed(&self, index: usize, item: &str, error: &str) {
        eprintln!("❌ #{} {}: {}", index, item, error);
    }

    fn on_retry_attempt(&self, item: &str, attempt: usize, max_attempts: usize) {
        println!("🔄 Retry {}/{} for: {}", attempt, max_attempts, item);
    }

    fn on_warning(&self, message: &str) {
        eprintln!("⚠️  {}", message);
    }

    fn on_batch_complete(&self, summary: &BatchSummary) {
        println!(
            "🏁 Download complete! {} succeeded, {} failed, {} listed",
            summary.succeeded, summary.failed, summary.total_listed
        );
    }

    fn on_batch_cancelled(&self, summary: &BatchSummary) {
        println!(
            "🛑 Cancelled after {} of {} items",
            summary.attempted, summary.total_listed
        );
    }

    fn on_batch_failed(&self, error: &str) {
        eprintln!("❌ Batch failed: {}", error);
    }
}

/// Null progress reporter that does nothing
#[derive(Debug, Default)]
pub struct NullProgressReporter;

impl ProgressReporter for NullProgressReporter {}

/// Composite progress reporter that forwards events to multiple reporters
pub struct CompositeProgressReporter {
    reporters: Vec<Box<dyn ProgressReporter>>,
}

impl std::fmt::Debug for CompositeProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeProgressReporter")
            .field("reporters_count", &self.reporters.len())
            .finish()
    }
}

impl CompositeProgressReporter {
    pub fn new() -> Self {
        Self {
            reporters: Vec::new(),
        }
    }

    pub fn add_reporter<R: ProgressReporter + 'static>(mut self, reporter: R) -> Self {
        self.reporters.push(Box::new(reporter));
        self
    }
}

impl Default for CompositeProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for CompositeProgressReporter {
    fn on_enumeration_started(&self, source_url: &str) {
        for reporter in &self.reporters {
            reporter.on_enumeration_started(source_url);
        }
    }

    fn on_enumeration_complete(&self, total: usize) {
        for reporter in &self.reporters {
            reporter.on_enumeration_complete(total);
        }
    }

    fn on_item_started(&self, index: usize, total: usize, label: &str) {
        for reporter in &self.reporters {
            reporter.on_item_started(index, total, label);
        }
    }

    fn on_item_complete(&self, index: usize, label: &str) {
        for reporter in &self.reporters {
            reporter.on_item_complete(index, label);
        }
    }

    fn on_item_failed(&self, index: usize, item: &str, error: &str) {
        for reporter in &self.reporters {
            reporter.on_item_failed(index, item, error);
        }
    }

    fn on_retry_attempt(&self, item: &str, attempt: usize, max_attempts: usize) {
        for reporter in &self.reporters {
            reporter.on_retry_attempt(item, attempt, max_attempts);
        }
    }

    fn on_warning(&self, message: &str) {
        for reporter in &self.reporters {
            reporter.on_warning(message);
        }
    }

    fn on_batch_complete(&self, summary: &BatchSummary) {
        for reporter in &self.reporters {
            reporter.on_batch_complete(summary);
        }
    }

    fn on_batch_cancelled(&self, summary: &BatchSummary) {
        for reporter in &self.reporters {
            reporter.on_batch_cancelled(summary);
        }
    }

    fn on_batch_failed(&self, error: &str) {
        for reporter in &self.reporters {
            reporter.on_batch_failed(error);
        }
    }
}
