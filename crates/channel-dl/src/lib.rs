//! Channel Downloader Library
//!
//! This library downloads every item of a channel or playlist by driving an
//! external fetch tool (yt-dlp or compatible). It lists the source, then
//! downloads items one by one into a `video/` or `audio/` folder, recording
//! each item's title in a log next to the downloads.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use channel_dl::{
//!     BatchDownloader, DateFilter, DownloadConfig, DownloadRequest, MediaKind, ProgressEvent,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> channel_dl::Result<()> {
//! // Create the downloader with the default yt-dlp on PATH
//! let downloader = BatchDownloader::new(DownloadConfig::default())?;
//!
//! // Audio only, items uploaded on or after 1 January 2024
//! let request = DownloadRequest::new(
//!     "https://www.youtube.com/@somechannel/videos",
//!     "/path/to/somechannel",
//! )
//! .with_media_kind(MediaKind::Audio)
//! .with_date_filter(DateFilter::parse("20240101"));
//!
//! // Set up progress callback (optional)
//! let progress_callback = Arc::new(|event: ProgressEvent| match event {
//!     ProgressEvent::EnumerationComplete { total } => println!("Total: {}", total),
//!     ProgressEvent::ItemStarted { index, total, label } => {
//!         println!("Downloading {} of {}: {}", index, total, label);
//!     }
//!     ProgressEvent::ItemFailed { item, error, .. } => println!("{} failed: {}", item, error),
//!     _ => {}
//! });
//!
//! let summary = downloader.run(&request, Some(progress_callback)).await?;
//! println!("{} downloaded, {} failed", summary.succeeded, summary.failed);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Enumeration**: flat listing of a source with an optional upload-date lower bound
//! - **Sequential downloads**: one item at a time, a failing item never stops the batch
//! - **Video or audio**: merged best video+audio, or audio-only extraction
//! - **Title log**: every processed item's title appended to `names.txt`
//! - **Background runs**: cancellable batches with an observable state
//! - **Timeouts and retries**: per-invocation bounds and optional exponential backoff
//! - **Persisted settings**: media kind and date filter saved as TOML

pub mod downloader;
pub mod integrations;

// Re-export commonly used types for convenience
pub use downloader::{
    BatchDownloader, BatchHandle, BatchPhase, BatchSummary, DateFilter, DownloadConfig,
    DownloadError, DownloadRequest, ExternalTool, ItemList, MediaKind, ProcessTool,
    ProgressCallback, ProgressEvent, ProgressState, Result, Settings,
};
pub use integrations::{ChannelDownloadBuilder, StatusLabels};
