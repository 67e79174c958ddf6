//! File operation utilities
//!
//! Destination layout, the per-folder title log and folder naming.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::downloader::core::error::{DownloadError, FileOperation, Result};

/// Subdirectory receiving video downloads
pub const VIDEO_DIR: &str = "video";
/// Subdirectory receiving audio downloads
pub const AUDIO_DIR: &str = "audio";
/// Folder name used when a source URL carries no channel marker
pub const DEFAULT_FOLDER_NAME: &str = "default";

static CHANNEL_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@([a-zA-Z0-9_-]+)").expect("channel marker pattern is valid"));

/// Derive the destination folder name from a source URL
///
/// `https://www.youtube.com/@somechannel/videos` gives `somechannel`.
pub fn folder_name_from_url(url: &str) -> String {
    CHANNEL_MARKER
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_FOLDER_NAME.to_string())
}

/// Create the video and audio directories under `root`
///
/// Idempotent: directories that already exist are not an error.
pub async fn ensure_media_dirs(root: &Path) -> Result<(PathBuf, PathBuf)> {
    let video = root.join(VIDEO_DIR);
    let audio = root.join(AUDIO_DIR);

    for dir in [&video, &audio] {
        fs::create_dir_all(dir)
            .await
            .map_err(|source| DownloadError::FileSystem {
                path: dir.clone(),
                operation: FileOperation::CreateDir,
                source,
            })?;
    }

    debug!("Media directories ready under {}", root.display());
    Ok((video, audio))
}

/// Append one title line to an append-only log, creating it if needed
pub async fn append_title(log_path: &Path, title: &str) -> Result<()> {
    let write = async {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .await?;
        file.write_all(format!("{}\n", title).as_bytes()).await?;
        file.flush().await
    };

    write.await.map_err(|source| DownloadError::LogWriteFailed {
        path: log_path.to_path_buf(),
        source,
    })
}

/// Remove duplicate lines from a title log, keeping first occurrences in order
///
/// Returns the number of lines removed.
pub async fn dedupe_title_log(log_path: &Path) -> Result<usize> {
    let content = fs::read_to_string(log_path)
        .await
        .map_err(|source| DownloadError::FileSystem {
            path: log_path.to_path_buf(),
            operation: FileOperation::Read,
            source,
        })?;

    let (unique, removed) = dedupe_lines(&content);
    if removed == 0 {
        return Ok(0);
    }

    fs::write(log_path, unique)
        .await
        .map_err(|source| DownloadError::FileSystem {
            path: log_path.to_path_buf(),
            operation: FileOperation::Write,
            source,
        })?;

    debug!("Removed {} duplicate titles from {}", removed, log_path.display());
    Ok(removed)
}

fn dedupe_lines(content: &str) -> (String, usize) {
    let mut seen = std::collections::HashSet::new();
    let mut unique = String::with_capacity(content.len());
    let mut removed = 0;

    for line in content.split_inclusive('\n') {
        let key = line.trim_end_matches(['\n', '\r']);
        if seen.insert(key) {
            unique.push_str(line);
        } else {
            removed += 1;
        }
    }

    (unique, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_folder_name_with_channel_marker() {
        assert_eq!(folder_name_from_url("https://www.youtube.com/@somechannel"), "somechannel");
        assert_eq!(
            folder_name_from_url("https://www.youtube.com/@some_chan-2/videos"),
            "some_chan-2"
        );
    }

    #[test]
    fn test_folder_name_without_marker() {
        assert_eq!(
            folder_name_from_url("https://www.youtube.com/playlist?list=PL123"),
            DEFAULT_FOLDER_NAME
        );
        assert_eq!(folder_name_from_url(""), "default");
    }

    #[tokio::test]
    async fn test_ensure_media_dirs_is_idempotent() {
        let root = tempdir().unwrap();
        let (video, audio) = ensure_media_dirs(root.path()).await.unwrap();
        assert!(video.is_dir());
        assert!(audio.is_dir());

        let again = ensure_media_dirs(root.path()).await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn test_append_title_appends_lines() {
        let root = tempdir().unwrap();
        let log = root.path().join("names.txt");

        append_title(&log, "First").await.unwrap();
        append_title(&log, "Second").await.unwrap();

        let content = tokio::fs::read_to_string(&log).await.unwrap();
        assert_eq!(content, "First\nSecond\n");
    }

    #[tokio::test]
    async fn test_append_title_reports_log_write_failure() {
        let root = tempdir().unwrap();
        let log = root.path().join("missing").join("names.txt");

        match append_title(&log, "Title").await {
            Err(DownloadError::LogWriteFailed { path, .. }) => assert_eq!(path, log),
            other => panic!("expected LogWriteFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dedupe_title_log_keeps_first_occurrence() {
        let root = tempdir().unwrap();
        let log = root.path().join("names.txt");
        tokio::fs::write(&log, "b\na\nb\nc\na\n").await.unwrap();

        let removed = dedupe_title_log(&log).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(tokio::fs::read_to_string(&log).await.unwrap(), "b\na\nc\n");

        assert_eq!(dedupe_title_log(&log).await.unwrap(), 0);
    }

    #[test]
    fn test_dedupe_lines_treats_missing_final_newline_as_same_line() {
        let (unique, removed) = dedupe_lines("x\ny\nx");
        assert_eq!(unique, "x\ny\n");
        assert_eq!(removed, 1);
    }
}
