//! Configuration types for the downloader system

use std::path::PathBuf;
use std::time::Duration;

use crate::downloader::core::{DownloadError, Result};

/// Runtime configuration for batch operations
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Program used as the external fetch tool
    pub tool_path: PathBuf,
    /// Arguments placed before every invocation (e.g. `-m yt_dlp` for python)
    pub tool_base_args: Vec<String>,
    /// Upper bound for the listing step; `None` waits forever
    pub enumeration_timeout: Option<Duration>,
    /// Upper bound for a single title lookup
    pub title_timeout: Option<Duration>,
    /// Upper bound for a single item download
    pub item_timeout: Option<Duration>,
    /// Look up each item's title before downloading it
    pub resolve_titles: bool,
    /// Append each item's title to the title log of the active folder
    pub record_titles: bool,
    /// File name of the title log
    pub title_log_name: String,
    /// Container for merged video downloads
    pub merge_format: String,
    /// Format for audio extraction
    pub audio_format: String,
    /// Audio quality passed to the tool, 0 being best
    pub audio_quality: String,
    /// Extra attempts for a failed item download (0 disables retries)
    pub item_retries: usize,
    /// Initial delay between retries (doubles each retry)
    pub retry_delay: Duration,
    /// Maximum retry delay cap
    pub max_retry_delay: Duration,
}

impl DownloadConfig {
    /// Calculate retry delay for the given attempt using exponential backoff
    ///
    /// Saturates instead of overflowing, so any attempt number yields at most
    /// `max_retry_delay`.
    pub fn get_retry_delay(&self, attempt: usize) -> Duration {
        let factor = u32::try_from(attempt)
            .ok()
            .and_then(|exp| 2_u64.checked_pow(exp))
            .unwrap_or(u64::MAX);
        let delay = (self.retry_delay.as_millis() as u64).saturating_mul(factor);
        Duration::from_millis(delay.min(self.max_retry_delay.as_millis() as u64))
    }

    /// Reject settings the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.tool_path.as_os_str().is_empty() {
            return Err(DownloadError::Configuration {
                message: "tool path is empty".to_string(),
                field: Some("tool_path".to_string()),
                suggestion: Some("Point tool_path at a yt-dlp executable".to_string()),
            });
        }

        if self.record_titles && self.title_log_name.trim().is_empty() {
            return Err(DownloadError::Configuration {
                message: "title log name is empty".to_string(),
                field: Some("title_log_name".to_string()),
                suggestion: Some("Use a file name such as names.txt".to_string()),
            });
        }

        for (field, value) in [
            ("merge_format", &self.merge_format),
            ("audio_format", &self.audio_format),
            ("audio_quality", &self.audio_quality),
        ] {
            if value.trim().is_empty() {
                return Err(DownloadError::Configuration {
                    message: format!("{} is empty", field),
                    field: Some(field.to_string()),
                    suggestion: None,
                });
            }
        }

        Ok(())
    }

    pub fn with_tool_path<P: Into<PathBuf>>(mut self, tool_path: P) -> Self {
        self.tool_path = tool_path.into();
        self
    }

    pub fn with_item_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.item_timeout = timeout;
        self
    }

    pub fn with_item_retries(mut self, retries: usize) -> Self {
        self.item_retries = retries;
        self
    }

    pub fn with_resolve_titles(mut self, resolve: bool) -> Self {
        self.resolve_titles = resolve;
        self
    }

    pub fn with_record_titles(mut self, record: bool) -> Self {
        self.record_titles = record;
        self
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        let tool_path = if cfg!(windows) { "yt-dlp.exe" } else { "yt-dlp" };

        Self {
            tool_path: PathBuf::from(tool_path),
            tool_base_args: Vec::new(),
            enumeration_timeout: Some(Duration::from_secs(300)),
            title_timeout: Some(Duration::from_secs(120)),
            item_timeout: None,
            resolve_titles: true,
            record_titles: true,
            title_log_name: "names.txt".to_string(),
            merge_format: "mp4".to_string(),
            audio_format: "mp3".to_string(),
            audio_quality: "0".to_string(),
            item_retries: 0,
            retry_delay: Duration::from_millis(1000), // Start with 1 second
            max_retry_delay: Duration::from_secs(60), // Cap at 1 minute
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(DownloadConfig::default().validate().is_ok());
    }

    #[test]
    fn test_retry_delay_is_capped() {
        let config = DownloadConfig::default();
        assert_eq!(config.get_retry_delay(0), Duration::from_secs(1));
        assert_eq!(config.get_retry_delay(2), Duration::from_secs(4));
        assert_eq!(config.get_retry_delay(10), Duration::from_secs(60));
    }

    #[test]
    fn test_retry_delay_never_overflows() {
        let config = DownloadConfig::default();
        for attempt in [53, 54, 63, 64, 65, 1000, usize::MAX] {
            assert_eq!(config.get_retry_delay(attempt), Duration::from_secs(60));
        }

        let config = DownloadConfig {
            retry_delay: Duration::ZERO,
            ..DownloadConfig::default()
        };
        assert_eq!(config.get_retry_delay(64), Duration::ZERO);
    }

    #[test]
    fn test_empty_tool_path_rejected() {
        let config = DownloadConfig::default().with_tool_path("");
        match config.validate() {
            Err(DownloadError::Configuration { field, .. }) => {
                assert_eq!(field.as_deref(), Some("tool_path"))
            }
            other => panic!("expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_log_name_only_matters_when_recording() {
        let mut config = DownloadConfig::default();
        config.title_log_name = String::new();
        assert!(config.validate().is_err());

        config.record_titles = false;
        assert!(config.validate().is_ok());
    }
}
