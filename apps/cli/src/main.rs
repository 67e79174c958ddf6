use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use channel_dl::downloader::core::{dedupe_title_log, validate_date_filter};
use channel_dl::downloader::{DateFilterMode, DownloadConfig};
use channel_dl::{ChannelDownloadBuilder, DateFilter, MediaKind, Settings};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{Level, info, warn};

#[derive(Debug, Parser)]
#[command(author, version, about = "Download every item of a channel or playlist with yt-dlp", long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
    #[arg(long, global = true, env = "CHANNEL_DL_SETTINGS", default_value = "settings.toml")]
    /// Settings file remembering media kind and date filter
    settings: PathBuf,
    #[arg(short, long, global = true, action = ArgAction::Count)]
    /// More log output (-v info, -vv debug)
    verbose: u8,
    #[arg(short, long, global = true)]
    /// Only log errors
    quiet: bool,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    #[command(about = "Download every item of a source")]
    Download {
        /// Channel or playlist URL
        url: String,
        #[arg(short, long, env = "CHANNEL_DL_OUTPUT", default_value = ".")]
        /// Directory the per-channel folder is created in
        output: PathBuf,
        #[arg(short, long)]
        /// `video` or `audio`, defaults to the saved setting
        media: Option<MediaKind>,
        #[arg(long, conflicts_with = "all")]
        /// Only items uploaded on or after this date (YYYYMMDD)
        since: Option<String>,
        #[arg(long)]
        /// Ignore the saved date filter
        all: bool,
        #[arg(long, env = "CHANNEL_DL_TOOL")]
        /// Path of the yt-dlp executable
        tool: Option<PathBuf>,
        #[arg(long)]
        /// Skip the title lookup before each download
        no_titles: bool,
        #[arg(long)]
        /// Do not append titles to names.txt
        no_log: bool,
        #[arg(long)]
        /// Give up on a single item after this many seconds
        item_timeout: Option<u64>,
        #[arg(long)]
        /// Extra attempts for a failed item
        retries: Option<usize>,
        #[arg(long)]
        /// Print the batch summary as JSON
        json: bool,
    },
    #[command(about = "Show or change the saved settings")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    #[command(about = "Remove duplicate lines from a title log")]
    Dedupe {
        /// Title log to clean up, usually names.txt
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigAction {
    Show,
    Set {
        #[arg(short, long)]
        media: Option<MediaKind>,
        #[arg(short, long)]
        /// `all` or `since`
        filter: Option<DateFilterMode>,
        #[arg(short, long)]
        /// Date used in `since` mode (YYYYMMDD)
        date: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv::dotenv().ok();
    let args = CliArgs::parse();

    let level = match (args.quiet, args.verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, _) => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Download {
            url,
            output,
            media,
            since,
            all,
            tool,
            no_titles,
            no_log,
            item_timeout,
            retries,
            json,
        } => {
            let settings = Settings::load_or_default(&args.settings)
                .await
                .with_context(|| format!("loading settings from {}", args.settings.display()))?;

            let date_filter = if all {
                DateFilter::All
            } else if let Some(since) = since {
                DateFilter::parse(&since)
            } else {
                settings.date_filter()
            };

            let mut config = DownloadConfig::default()
                .with_resolve_titles(!no_titles)
                .with_record_titles(!no_log)
                .with_item_timeout(item_timeout.map(Duration::from_secs));
            if let Some(tool) = tool {
                config = config.with_tool_path(tool);
            }
            if let Some(retries) = retries {
                config = config.with_item_retries(retries);
            }

            let mut builder = ChannelDownloadBuilder::new(url)
                .output_base(&output)
                .media_kind(media.unwrap_or(settings.media_kind))
                .date_filter(date_filter)
                .config(config);
            if !json {
                builder = builder.with_console_progress(args.verbose > 0);
            }

            info!("Downloading into {}", builder.destination_root().display());
            run_download(builder, json).await
        }
        Command::Config { action } => {
            configure(&args.settings, action).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Dedupe { file } => {
            let removed = dedupe_title_log(&file)
                .await
                .with_context(|| format!("deduplicating {}", file.display()))?;
            println!("Removed {} duplicate line(s) from {}", removed, file.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_download(builder: ChannelDownloadBuilder, json: bool) -> Result<ExitCode> {
    let handle = match builder.spawn() {
        Ok(handle) => handle,
        Err(e) => {
            eprint!("{}", e.detailed_report());
            return Ok(ExitCode::from(1));
        }
    };

    let cancel = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current item");
            cancel.cancel();
        }
    });

    match handle.join().await {
        Ok(summary) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            if summary.has_failures() {
                Ok(ExitCode::from(2))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Err(e) => {
            if json {
                let report = serde_json::json!({
                    "error": e.to_string(),
                    "category": e.category(),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            eprint!("{}", e.detailed_report());
            Ok(ExitCode::from(1))
        }
    }
}

async fn configure(path: &Path, action: ConfigAction) -> Result<()> {
    let mut settings = Settings::load_or_default(path)
        .await
        .with_context(|| format!("loading settings from {}", path.display()))?;

    match action {
        ConfigAction::Show => {}
        ConfigAction::Set { media, filter, date } => {
            if let Some(media) = media {
                settings.media_kind = media;
            }
            if let Some(filter) = filter {
                settings.set_date_filter_mode(filter);
            }
            if let Some(date) = date {
                validate_date_filter(&DateFilter::after(date.trim()))?;
                settings.date_value = date.trim().to_string();
            }
            settings
                .save(path)
                .await
                .with_context(|| format!("saving settings to {}", path.display()))?;
        }
    }

    println!("settings:    {}", path.display());
    println!("media:       {}", settings.media_kind);
    match settings.date_filter() {
        DateFilter::All => println!("date filter: all"),
        DateFilter::After(date) => println!("date filter: since {}", date),
    }
    Ok(())
}
