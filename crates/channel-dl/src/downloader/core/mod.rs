//! Core types used throughout the downloader system
//!
//! This module contains the fundamental types that all other modules depend on.
//! By organizing these in a core module, we make the dependency relationships clear.

pub mod error;
pub mod files;
pub mod progress;
pub mod validation;

// Re-export main types for convenience
pub use error::{DownloadError, ErrorSeverity, FileOperation, Result};
pub use files::{append_title, dedupe_title_log, ensure_media_dirs, folder_name_from_url};
pub use progress::{
    BatchPhase, CompositeProgressReporter, ConsoleProgressReporter, IntoProgressCallback,
    NullProgressReporter, ProgressCallback, ProgressEvent, ProgressReporter, ProgressState,
};
pub use validation::{DateFilter, is_valid_date, validate_date_filter, validate_source_url};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Download profile and destination folder selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Best video and audio merged into one container
    #[default]
    Video,
    /// Audio-only extraction
    Audio,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Audio => write!(f, "audio"),
        }
    }
}

impl std::str::FromStr for MediaKind {
    type Err = DownloadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(MediaKind::Video),
            "audio" => Ok(MediaKind::Audio),
            other => Err(DownloadError::Configuration {
                message: format!("unknown media kind '{}'", other),
                field: Some("media_kind".to_string()),
                suggestion: Some("Use 'video' or 'audio'".to_string()),
            }),
        }
    }
}

/// A batch request: one source, one destination, one media kind
///
/// This is the explicit configuration value passed into the pipeline at
/// invocation time.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Channel or playlist URL to enumerate
    pub source_url: String,
    /// Root under which `video/` and `audio/` are created
    pub destination_root: PathBuf,
    pub media_kind: MediaKind,
    pub date_filter: DateFilter,
}

impl DownloadRequest {
    /// Create a new request for all videos of a source
    pub fn new<S: Into<String>, P: Into<PathBuf>>(source_url: S, destination_root: P) -> Self {
        Self {
            source_url: source_url.into(),
            destination_root: destination_root.into(),
            media_kind: MediaKind::default(),
            date_filter: DateFilter::default(),
        }
    }

    pub fn with_media_kind(mut self, media_kind: MediaKind) -> Self {
        self.media_kind = media_kind;
        self
    }

    pub fn with_date_filter(mut self, date_filter: DateFilter) -> Self {
        self.date_filter = date_filter;
        self
    }

    /// Check everything that can be checked without running the tool
    pub fn validate(&self) -> Result<()> {
        validate_source_url(&self.source_url)?;
        validate_date_filter(&self.date_filter)?;
        Ok(())
    }

    pub fn video_dir(&self) -> PathBuf {
        self.destination_root.join(files::VIDEO_DIR)
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.destination_root.join(files::AUDIO_DIR)
    }

    /// Folder that receives downloads for this request's media kind
    pub fn active_dir(&self) -> PathBuf {
        match self.media_kind {
            MediaKind::Video => self.video_dir(),
            MediaKind::Audio => self.audio_dir(),
        }
    }
}

/// Raw item identifiers of a source, in enumeration order
///
/// Entries are kept exactly as split from the tool output, blank lines
/// included. The newline ending the last line does not start another entry.
/// [`ItemList::len`] counts every entry; [`ItemList::items`] skips the empty ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemList {
    entries: Vec<String>,
}

impl ItemList {
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    /// Split tool output into lines
    ///
    /// A trailing `\r` is removed from each line; blank lines are kept, so
    /// `"a\nb\n\n"` gives three entries.
    pub fn from_output(output: &str) -> Self {
        let entries = output.lines().map(str::to_string).collect();
        Self { entries }
    }

    /// Number of raw entries, empty ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Non-empty identifiers with their 0-based position in the raw list
    pub fn items(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.is_empty())
            .map(|(index, entry)| (index, entry.as_str()))
    }

    pub fn non_empty_count(&self) -> usize {
        self.items().count()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl From<Vec<String>> for ItemList {
    fn from(entries: Vec<String>) -> Self {
        Self::new(entries)
    }
}
