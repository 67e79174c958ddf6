//! Example demonstrating a background channel download
//!
//! This example lists a channel, downloads its audio into a temporary
//! directory and prints plain-text status labels while the batch runs.
//! Ctrl-C stops the batch after the current item.
//!
//! Run this example with:
//! ```
//! CHANNEL_URL=https://www.youtube.com/@somechannel/videos cargo run --example batch_download_example
//! ```

use channel_dl::{
    ChannelDownloadBuilder, DateFilter, DownloadConfig, MediaKind, StatusLabels,
    downloader::IntoProgressCallback,
};
use std::time::Duration;
use tempfile::tempdir;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let url = std::env::var("CHANNEL_URL")
        .unwrap_or_else(|_| "https://www.youtube.com/@somechannel/videos".to_string());
    let since = std::env::var("CHANNEL_SINCE").unwrap_or_default();

    println!("🚀 Starting channel download example");

    let temp_dir = tempdir()?;
    println!("📁 Download directory: {}", temp_dir.path().display());

    let config = DownloadConfig::default()
        .with_item_timeout(Some(Duration::from_secs(600)))
        .with_item_retries(1);

    let labels = StatusLabels::new();
    let builder = ChannelDownloadBuilder::new(url)
        .output_base(temp_dir.path())
        .media_kind(MediaKind::Audio)
        .date_filter(DateFilter::parse(&since))
        .config(config)
        .with_progress_callback(labels.clone().into_callback());

    println!("📦 Channel folder: {}", builder.destination_root().display());

    let handle = builder.spawn()?;

    let cancel = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("🛑 Stopping after the current item");
            cancel.cancel();
        }
    });

    // Redraw the labels whenever the batch state changes
    let mut state = handle.state();
    while state.changed().await.is_ok() {
        let phase = state.borrow_and_update().phase;
        println!("[{:?}] {} | {}", phase, labels.current_label(), labels.summary_text());
        if phase.is_terminal() {
            break;
        }
    }

    match handle.join().await {
        Ok(summary) => {
            println!("\n📊 Batch Summary:");
            println!("   Listed:      {}", summary.total_listed);
            println!("   Downloaded:  {}", summary.succeeded);
            println!("   Failed:      {}", summary.failed);
            println!("   Empty:       {}", summary.skipped_empty);
            println!("   Retries:     {}", summary.retries_attempted);
            println!("   Success:     {:.1}%", summary.success_rate() * 100.0);
            for failure in &summary.failures {
                println!("   ❌ #{} {}: {}", failure.index, failure.item, failure.error);
            }
            if summary.cancelled {
                println!("   (cancelled before the end of the list)");
            }
        }
        Err(e) => {
            eprintln!("💥 {}", e.detailed_report());
            eprintln!("   Last status: {}", labels.current_label());
        }
    }

    Ok(())
}
