//! Plain-text status labels for front-ends
//!
//! Front-ends that only show two lines of text (what is happening now, and a
//! running total) can hand a [`StatusLabels`] reporter to the downloader and
//! read the labels back whenever they redraw.

use std::sync::{Arc, RwLock};

use crate::downloader::{BatchSummary, ProgressReporter};

/// Label shown before any batch has started
pub const IDLE_LABEL: &str = "Waiting for download to start...";
/// Label shown once a batch has finished
pub const COMPLETE_LABEL: &str = "Download complete!";

/// Whether label changes are also echoed to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    /// Only update the stored labels
    Silent,
    /// Print every current-label change on its own line
    Echo,
}

#[derive(Debug, Clone)]
struct Labels {
    current: String,
    summary: String,
}

/// Reporter that keeps a current label and a summary text up to date
///
/// Clones share the same labels, so one clone can be given to the downloader
/// while another is polled by the UI.
#[derive(Debug, Clone)]
pub struct StatusLabels {
    labels: Arc<RwLock<Labels>>,
    style: LabelStyle,
}

impl StatusLabels {
    pub fn new() -> Self {
        Self::with_style(LabelStyle::Silent)
    }

    pub fn with_style(style: LabelStyle) -> Self {
        Self {
            labels: Arc::new(RwLock::new(Labels {
                current: IDLE_LABEL.to_string(),
                summary: "0 / 0".to_string(),
            })),
            style,
        }
    }

    /// What the batch is doing right now
    pub fn current_label(&self) -> String {
        self.read().current
    }

    /// Running total or final counts
    pub fn summary_text(&self) -> String {
        self.read().summary
    }

    fn read(&self) -> Labels {
        self.labels
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_current(&self, text: String) {
        if self.style == LabelStyle::Echo {
            println!("{}", text);
        }
        self.labels
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .current = text;
    }

    fn set_summary(&self, text: String) {
        self.labels
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .summary = text;
    }
}

impl Default for StatusLabels {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for StatusLabels {
    fn on_enumeration_started(&self, source_url: &str) {
        self.set_current(format!("Listing {}", source_url));
    }

    fn on_enumeration_complete(&self, total: usize) {
        self.set_summary(format!("Total: {}", total));
    }

    fn on_item_started(&self, index: usize, total: usize, label: &str) {
        self.set_current(format!("Downloading {} of {}: {}", index, total, label));
    }

    fn on_batch_complete(&self, summary: &BatchSummary) {
        self.set_current(COMPLETE_LABEL.to_string());
        self.set_summary(format!(
            "Total: {}, downloaded: {}, failed: {}",
            summary.total_listed, summary.succeeded, summary.failed
        ));
    }

    fn on_batch_cancelled(&self, summary: &BatchSummary) {
        self.set_current("Download cancelled".to_string());
        self.set_summary(format!(
            "Total: {}, downloaded: {}, failed: {}",
            summary.total_listed, summary.succeeded, summary.failed
        ));
    }

    fn on_batch_failed(&self, error: &str) {
        self.set_current(format!("Error: {}", error));
    }
}
