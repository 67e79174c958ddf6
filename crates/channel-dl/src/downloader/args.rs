//! Argument lists for the external fetch tool

use std::path::Path;

use crate::downloader::config::DownloadConfig;
use crate::downloader::core::{DownloadRequest, MediaKind, Result, validate_date_filter};

/// Output template appended to the active folder; the tool fills in title and extension
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Arguments listing the item URLs of a source, flat and uncached
///
/// Fails with `InvalidDateFormat` when the date filter is malformed.
pub fn enumeration_args(request: &DownloadRequest) -> Result<Vec<String>> {
    let mut args = vec![
        "--flat-playlist".to_string(),
        "--print".to_string(),
        "url".to_string(),
        "--no-cache-dir".to_string(),
    ];

    if let Some(date) = validate_date_filter(&request.date_filter)? {
        args.push(format!("--dateafter={}", date));
    }

    args.push(request.source_url.clone());
    Ok(args)
}

/// Arguments printing the title of a single item
pub fn title_args(item: &str) -> Vec<String> {
    vec!["--get-title".to_string(), item.to_string()]
}

/// Arguments downloading a single item into `folder`
pub fn download_args(
    config: &DownloadConfig,
    media_kind: MediaKind,
    folder: &Path,
    item: &str,
) -> Vec<String> {
    let mut args: Vec<String> = match media_kind {
        MediaKind::Video => vec![
            "-f".into(),
            "bestvideo+bestaudio/best".into(),
            "--merge-output-format".into(),
            config.merge_format.clone(),
        ],
        MediaKind::Audio => vec![
            "-x".into(),
            "--audio-format".into(),
            config.audio_format.clone(),
            "--audio-quality".into(),
            config.audio_quality.clone(),
        ],
    };

    args.push("-o".into());
    args.push(output_template(folder));
    args.push(item.to_string());
    args
}

/// Output path template for `folder`
pub fn output_template(folder: &Path) -> String {
    folder.join(OUTPUT_TEMPLATE).to_string_lossy().into_owned()
}
