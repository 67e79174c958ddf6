//! High-level channel download API
//!
//! Provides a fluent API for downloading a whole channel with sensible
//! defaults: the destination folder is named after the channel and missing
//! options fall back to the persisted settings.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::downloader::{
    BatchDownloader, BatchHandle, BatchSummary, ConsoleProgressReporter, DateFilter,
    DownloadConfig, DownloadRequest, IntoProgressCallback, MediaKind, ProgressCallback,
    ProgressEvent, Result, Settings, core::folder_name_from_url,
};

/// Fluent API builder for channel downloads
pub struct ChannelDownloadBuilder {
    source_url: String,
    output_base: PathBuf,
    media_kind: MediaKind,
    date_filter: DateFilter,
    config: DownloadConfig,
    progress_callback: Option<ProgressCallback>,
}

impl ChannelDownloadBuilder {
    /// Create a new builder for the given channel URL, downloading below the current directory
    pub fn new<S: Into<String>>(source_url: S) -> Self {
        Self {
            source_url: source_url.into(),
            output_base: PathBuf::from("."),
            media_kind: MediaKind::default(),
            date_filter: DateFilter::default(),
            config: DownloadConfig::default(),
            progress_callback: None,
        }
    }

    /// Take media kind and date filter from persisted settings
    pub fn settings(mut self, settings: &Settings) -> Self {
        self.media_kind = settings.media_kind;
        self.date_filter = settings.date_filter();
        self
    }

    /// Directory under which the per-channel folder is created
    pub fn output_base<P: AsRef<Path>>(mut self, output_base: P) -> Self {
        self.output_base = output_base.as_ref().to_path_buf();
        self
    }

    pub fn media_kind(mut self, media_kind: MediaKind) -> Self {
        self.media_kind = media_kind;
        self
    }

    pub fn date_filter(mut self, date_filter: DateFilter) -> Self {
        self.date_filter = date_filter;
        self
    }

    pub fn config(mut self, config: DownloadConfig) -> Self {
        self.config = config;
        self
    }

    /// Use the built-in console progress reporter
    pub fn with_console_progress(mut self, verbose: bool) -> Self {
        self.progress_callback = Some(ConsoleProgressReporter::new(verbose).into_callback());
        self
    }

    /// Use a custom progress callback
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressEvent) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Folder the channel's `video/` and `audio/` directories go into
    pub fn destination_root(&self) -> PathBuf {
        self.output_base.join(folder_name_from_url(&self.source_url))
    }

    /// The request this builder would run
    pub fn build_request(&self) -> DownloadRequest {
        DownloadRequest::new(self.source_url.clone(), self.destination_root())
            .with_media_kind(self.media_kind)
            .with_date_filter(self.date_filter.clone())
    }

    /// Run the batch to completion on the current task
    pub async fn run(self) -> Result<BatchSummary> {
        let request = self.build_request();
        let downloader = BatchDownloader::new(self.config)?;
        downloader.run(&request, self.progress_callback).await
    }

    /// Run the batch on a background task
    pub fn spawn(self) -> Result<BatchHandle> {
        let request = self.build_request();
        let downloader = BatchDownloader::new(self.config)?;
        Ok(downloader.spawn(request, self.progress_callback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::DateFilterMode;

    #[test]
    fn test_destination_is_named_after_channel() {
        let builder = ChannelDownloadBuilder::new("https://www.youtube.com/@somechannel/videos")
            .output_base("/downloads");
        assert_eq!(builder.destination_root(), PathBuf::from("/downloads/somechannel"));

        let builder = ChannelDownloadBuilder::new("https://www.youtube.com/playlist?list=PL1")
            .output_base("/downloads");
        assert_eq!(builder.destination_root(), PathBuf::from("/downloads/default"));
    }

    #[test]
    fn test_settings_feed_the_request() {
        let settings = Settings {
            media_kind: MediaKind::Audio,
            date_filter_mode: DateFilterMode::Since,
            date_value: "20240101".to_string(),
        };

        let request = ChannelDownloadBuilder::new("https://www.youtube.com/@chan")
            .settings(&settings)
            .output_base("/downloads")
            .build_request();

        assert_eq!(request.media_kind, MediaKind::Audio);
        assert_eq!(request.date_filter, DateFilter::after("20240101"));
        assert_eq!(request.active_dir(), PathBuf::from("/downloads/chan/audio"));
    }

    #[test]
    fn test_explicit_options_override_settings() {
        let settings = Settings {
            media_kind: MediaKind::Audio,
            ..Settings::default()
        };

        let request = ChannelDownloadBuilder::new("https://www.youtube.com/@chan")
            .settings(&settings)
            .media_kind(MediaKind::Video)
            .build_request();

        assert_eq!(request.media_kind, MediaKind::Video);
    }
}
