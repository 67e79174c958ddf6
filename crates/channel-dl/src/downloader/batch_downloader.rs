//! Main entry point for batch downloads
//!
//! The call chain flows as follows:
//!
//! User Code
//! ↓
//! BatchDownloader / BatchHandle (this file)
//! ↓
//! batch:: functions (batch/mod.rs)
//! ↓
//! ExternalTool (tool.rs) → ProcessTool (backends/process.rs)
//! ↓
//! Core types (core/*)

use crate::downloader::{
    batch::{self, BatchSummary, DownloadMetrics},
    backends::ProcessTool,
    config::DownloadConfig,
    core::{
        DownloadError, DownloadRequest, ItemList, ProgressCallback, ProgressEvent, ProgressState,
        Result,
    },
    tool::ExternalTool,
};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info_span, Instrument};

/// Sequential batch downloader driving an external fetch tool
///
/// Cloning is cheap and clones share the tool, the metrics and the run lock,
/// so batches started from any clone never interleave their directory setup
/// or title log writes.
#[derive(Clone)]
pub struct BatchDownloader {
    tool: Arc<dyn ExternalTool>,
    config: DownloadConfig,
    metrics: Arc<DownloadMetrics>,
    run_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for BatchDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchDownloader")
            .field("tool", &self.tool.name())
            .field("config", &self.config)
            .finish()
    }
}

impl BatchDownloader {
    /// Create a downloader running the configured tool as a child process
    pub fn new(config: DownloadConfig) -> Result<Self> {
        config.validate()?;
        let tool = Arc::new(ProcessTool::from_config(&config));
        Ok(Self::with_tool(tool, config))
    }

    /// Create a downloader with a custom tool implementation
    pub fn with_tool(tool: Arc<dyn ExternalTool>, config: DownloadConfig) -> Self {
        Self {
            tool,
            config,
            metrics: Arc::new(DownloadMetrics::default()),
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Get access to counters accumulated over every batch
    pub fn metrics(&self) -> &DownloadMetrics {
        &self.metrics
    }

    /// List the item identifiers of the request's source
    pub async fn enumerate(&self, request: &DownloadRequest) -> Result<ItemList> {
        batch::enumerate(self.tool.as_ref(), &self.config, request).await
    }

    /// Download every item of an already enumerated list
    pub async fn download_all(
        &self,
        request: &DownloadRequest,
        items: &ItemList,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<BatchSummary> {
        self.download_all_with_cancel(request, items, progress_callback, &CancellationToken::new())
            .await
    }

    /// Like [`download_all`](Self::download_all), stopping between items once `cancel` fires
    pub async fn download_all_with_cancel(
        &self,
        request: &DownloadRequest,
        items: &ItemList,
        progress_callback: Option<ProgressCallback>,
        cancel: &CancellationToken,
    ) -> Result<BatchSummary> {
        let _guard = self.run_lock.lock().await;

        let summary = batch::download_all(
            self.tool.as_ref(),
            &self.config,
            request,
            items,
            progress_callback.as_ref(),
            cancel,
        )
        .await?;

        self.metrics.record_summary(&summary);
        Ok(summary)
    }

    /// Enumerate the source, then download every item
    ///
    /// Pre-flight and enumeration failures are returned as `Err` after a
    /// `BatchFailed` event; per-item failures end up in the summary.
    pub async fn run(
        &self,
        request: &DownloadRequest,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<BatchSummary> {
        self.run_with_cancel(request, progress_callback, &CancellationToken::new())
            .await
    }

    pub async fn run_with_cancel(
        &self,
        request: &DownloadRequest,
        progress_callback: Option<ProgressCallback>,
        cancel: &CancellationToken,
    ) -> Result<BatchSummary> {
        let span = info_span!("batch", source = %request.source_url, media = %request.media_kind);

        async move {
            self.metrics.record_batch_started();
            let emit = |event: ProgressEvent| {
                if let Some(callback) = &progress_callback {
                    callback(event);
                }
            };

            emit(ProgressEvent::EnumerationStarted {
                source_url: request.source_url.clone(),
            });

            let items = match self.enumerate(request).await {
                Ok(items) => items,
                Err(e) => {
                    error!("{}", batch::error_chain(&e));
                    self.metrics.record_batch_failed();
                    emit(ProgressEvent::BatchFailed {
                        error: batch::error_chain(&e),
                    });
                    return Err(e);
                }
            };

            emit(ProgressEvent::EnumerationComplete { total: items.len() });

            let result = self
                .download_all_with_cancel(request, &items, progress_callback.clone(), cancel)
                .await;
            if result.is_err() {
                self.metrics.record_batch_failed();
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Run a batch on a background task
    ///
    /// The returned handle can cancel the batch, observe its state and wait
    /// for its summary.
    pub fn spawn(
        &self,
        request: DownloadRequest,
        progress_callback: Option<ProgressCallback>,
    ) -> BatchHandle {
        let cancel = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(ProgressState::new());

        let observed: ProgressCallback = Arc::new(move |event: ProgressEvent| {
            state_tx.send_modify(|state| state.apply(&event));
            if let Some(callback) = &progress_callback {
                callback(event);
            }
        });

        let downloader = self.clone();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            downloader
                .run_with_cancel(&request, Some(observed), &task_cancel)
                .await
        });

        BatchHandle {
            task,
            cancel,
            state: state_rx,
        }
    }
}

/// Handle to a batch running on a background task
#[derive(Debug)]
pub struct BatchHandle {
    task: JoinHandle<Result<BatchSummary>>,
    cancel: CancellationToken,
    state: watch::Receiver<ProgressState>,
}

impl BatchHandle {
    /// Ask the batch to stop before its next item
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Receiver that changes whenever the batch state does
    pub fn state(&self) -> watch::Receiver<ProgressState> {
        self.state.clone()
    }

    pub fn current_state(&self) -> ProgressState {
        self.state.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the batch to finish
    ///
    /// A panic inside the batch task is resumed on the caller.
    pub async fn join(self) -> Result<BatchSummary> {
        match self.task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(DownloadError::Cancelled {
                reason: format!("batch task was aborted: {}", e),
            }),
        }
    }
}
