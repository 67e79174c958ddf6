//! Downloader module
//!
//! This module contains all the batch download functionality including
//! core types, configuration, the external tool seam and batch operations.

pub mod args;
pub mod backends;
pub mod batch;
pub mod batch_downloader;
pub mod config;
pub mod core;
pub mod settings;
pub mod tool;

// Re-export main types for convenience
pub use batch_downloader::{BatchDownloader, BatchHandle};
pub use core::{
    BatchPhase, CompositeProgressReporter, ConsoleProgressReporter, DateFilter, DownloadError,
    DownloadRequest, ErrorSeverity, FileOperation, IntoProgressCallback, ItemList, MediaKind,
    NullProgressReporter, ProgressCallback, ProgressEvent, ProgressReporter, ProgressState,
    Result,
};
pub use config::DownloadConfig;
pub use settings::{DateFilterMode, Settings};
pub use batch::{BatchSummary, DownloadMetrics, DownloadMetricsSnapshot, ItemFailure};
pub use backends::ProcessTool;
pub use tool::ExternalTool;
