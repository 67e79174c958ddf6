//! Batch operations: enumerate a source, then download its items one by one
//!
//! Everything here is strictly sequential. A failing item is recorded in the
//! [`BatchSummary`] and the loop moves on; only pre-flight, enumeration and
//! directory setup errors end a batch.

pub mod metrics;

pub use metrics::{BatchSummary, DownloadMetrics, DownloadMetricsSnapshot, ItemFailure};

use std::error::Error;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio_retry::Retry;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::downloader::{
    args,
    config::DownloadConfig,
    core::{
        DownloadError, DownloadRequest, ItemList, MediaKind, ProgressCallback, ProgressEvent,
        Result, append_title, ensure_media_dirs,
    },
    tool::ExternalTool,
};

fn emit(progress_callback: Option<&ProgressCallback>, event: ProgressEvent) {
    if let Some(callback) = progress_callback {
        callback(event);
    }
}

/// Render an error with its whole source chain on one line
pub fn error_chain(error: &DownloadError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// List the item identifiers of a source
///
/// The request is validated first; a malformed date filter fails with
/// `InvalidDateFormat` without running the tool. Any tool failure is wrapped
/// in `EnumerationFailed`. Output is split on newlines as-is, so the list
/// usually ends with an empty entry.
pub async fn enumerate(
    tool: &dyn ExternalTool,
    config: &DownloadConfig,
    request: &DownloadRequest,
) -> Result<ItemList> {
    request.validate()?;
    let args = args::enumeration_args(request)?;

    info!("Enumerating items of {}", request.source_url);
    debug!("Enumeration args: {:?}", args);

    let output = tool
        .capture(&args, config.enumeration_timeout)
        .await
        .map_err(|cause| DownloadError::EnumerationFailed {
            url: request.source_url.clone(),
            cause: Box::new(cause),
        })?;

    let items = ItemList::from_output(&output);
    info!(
        "Enumerated {} entries ({} non-empty) from {}",
        items.len(),
        items.non_empty_count(),
        request.source_url
    );
    Ok(items)
}

/// Look up the human-readable title of one item
pub async fn resolve_title(
    tool: &dyn ExternalTool,
    config: &DownloadConfig,
    item: &str,
) -> Result<String> {
    let output = tool
        .capture(&args::title_args(item), config.title_timeout)
        .await
        .map_err(|cause| DownloadError::TitleResolutionFailed {
            item: item.to_string(),
            cause: Box::new(cause),
        })?;

    let title = output.trim();
    if title.is_empty() {
        Ok(item.to_string())
    } else {
        Ok(title.to_string())
    }
}

/// Download one item into `folder`, retrying as configured
///
/// Returns the number of retries used alongside the outcome.
pub async fn download_item(
    tool: &dyn ExternalTool,
    config: &DownloadConfig,
    media_kind: MediaKind,
    folder: &Path,
    item: &str,
    progress_callback: Option<&ProgressCallback>,
) -> (usize, Result<()>) {
    let args = args::download_args(config, media_kind, folder, item);
    debug!("Download args: {:?}", args);

    let args = &args;
    let max_retries = config.item_retries;
    let timeout = config.item_timeout;
    let attempts = AtomicUsize::new(0);
    let attempts_ref = &attempts;
    let strategy = (0..max_retries).map(|n| config.get_retry_delay(n));

    let result = Retry::start(strategy, move || {
        let attempt = attempts_ref.fetch_add(1, Ordering::Relaxed);
        if attempt > 0 {
            emit(
                progress_callback,
                ProgressEvent::RetryAttempt {
                    item: item.to_string(),
                    attempt,
                    max_attempts: max_retries,
                },
            );
        }
        tool.run_streaming(args, timeout)
    })
    .await;

    let retries = attempts.load(Ordering::Relaxed).saturating_sub(1);
    let result = result.map_err(|cause| DownloadError::ItemDownloadFailed {
        item: item.to_string(),
        cause: Box::new(cause),
    });
    (retries, result)
}

/// Download every non-empty item of `items` for `request`
///
/// Creates the video and audio folders, then walks the list in order. Empty
/// entries are skipped but still count toward the reported total, which is
/// fixed at `items.len()`. The token is checked between items.
pub async fn download_all(
    tool: &dyn ExternalTool,
    config: &DownloadConfig,
    request: &DownloadRequest,
    items: &ItemList,
    progress_callback: Option<&ProgressCallback>,
    cancel: &CancellationToken,
) -> Result<BatchSummary> {
    if let Err(e) = ensure_media_dirs(&request.destination_root).await {
        emit(progress_callback, ProgressEvent::BatchFailed { error: error_chain(&e) });
        return Err(e);
    }

    let folder = request.active_dir();
    let log_path = folder.join(&config.title_log_name);
    let total = items.len();
    let mut summary = BatchSummary::new(total);
    summary.skipped_empty = total - items.non_empty_count();

    info!(
        "Downloading {} items as {} into {}",
        items.non_empty_count(),
        request.media_kind,
        folder.display()
    );

    for (position, item) in items.items() {
        if cancel.is_cancelled() {
            info!("Batch cancelled before item {} of {}", position + 1, total);
            summary.cancelled = true;
            break;
        }

        let index = position + 1;

        let title = if config.resolve_titles {
            match resolve_title(tool, config, item).await {
                Ok(title) => title,
                Err(e) => {
                    let message = error_chain(&e);
                    warn!("Skipping item {} of {}: {}", index, total, message);
                    emit(
                        progress_callback,
                        ProgressEvent::ItemFailed {
                            index,
                            item: item.to_string(),
                            error: message.clone(),
                        },
                    );
                    summary.record_failure(index, item, message);
                    continue;
                }
            }
        } else {
            item.to_string()
        };

        emit(
            progress_callback,
            ProgressEvent::ItemStarted {
                index,
                total,
                label: title.clone(),
            },
        );

        let (retries, outcome) =
            download_item(tool, config, request.media_kind, &folder, item, progress_callback).await;
        summary.retries_attempted += retries;

        match outcome {
            Ok(()) => {
                summary.record_success();
                emit(progress_callback, ProgressEvent::ItemComplete { index, label: title.clone() });
            }
            Err(e) => {
                let message = error_chain(&e);
                warn!("Item {} of {} failed: {}", index, total, message);
                emit(
                    progress_callback,
                    ProgressEvent::ItemFailed {
                        index,
                        item: item.to_string(),
                        error: message.clone(),
                    },
                );
                summary.record_failure(index, item, message);
            }
        }

        // The title is logged whatever the download outcome was
        if config.record_titles {
            if let Err(e) = append_title(&log_path, &title).await {
                let message = error_chain(&e);
                warn!("{}", message);
                summary.log_write_failures += 1;
                emit(progress_callback, ProgressEvent::Warning { message });
            }
        }
    }

    if summary.cancelled {
        emit(progress_callback, ProgressEvent::BatchCancelled { summary: summary.clone() });
    } else {
        info!(
            "Batch complete: {} succeeded, {} failed, {} skipped",
            summary.succeeded, summary.failed, summary.skipped_empty
        );
        emit(progress_callback, ProgressEvent::BatchComplete { summary: summary.clone() });
    }

    Ok(summary)
}
