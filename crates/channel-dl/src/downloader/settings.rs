//! Persisted user settings
//!
//! The pipeline never reads or writes this file. Callers load it, build a
//! [`DownloadRequest`](crate::DownloadRequest) from it and save it back when
//! the user changes something.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::downloader::core::{DateFilter, DownloadError, FileOperation, MediaKind, Result};

/// Whether the date filter is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFilterMode {
    #[default]
    All,
    Since,
}

impl std::str::FromStr for DateFilterMode {
    type Err = DownloadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(DateFilterMode::All),
            "since" => Ok(DateFilterMode::Since),
            other => Err(DownloadError::Configuration {
                message: format!("unknown date filter mode '{}'", other),
                field: Some("date_filter_mode".to_string()),
                suggestion: Some("Use 'all' or 'since'".to_string()),
            }),
        }
    }
}

/// Settings remembered between runs
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub media_kind: MediaKind,
    pub date_filter_mode: DateFilterMode,
    /// `YYYYMMDD`, only used in `Since` mode
    pub date_value: String,
}

impl Settings {
    /// Load settings, writing defaults when the file does not exist yet
    pub async fn load_or_default(path: &Path) -> Result<Self> {
        match fs::read_to_string(path).await {
            Ok(content) => {
                let settings = toml::from_str(&content).map_err(|source| DownloadError::ConfigParse {
                    path: path.to_path_buf(),
                    source,
                })?;
                debug!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let settings = Settings::default();
                settings.save(path).await?;
                info!("Created default settings at {}", path.display());
                Ok(settings)
            }
            Err(source) => Err(DownloadError::FileSystem {
                path: path.to_path_buf(),
                operation: FileOperation::Read,
                source,
            }),
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| DownloadError::FileSystem {
                    path: parent.to_path_buf(),
                    operation: FileOperation::CreateDir,
                    source,
                })?;
        }

        fs::write(path, content)
            .await
            .map_err(|source| DownloadError::FileSystem {
                path: path.to_path_buf(),
                operation: FileOperation::Write,
                source,
            })
    }

    /// Date filter described by these settings
    ///
    /// `Since` without a date behaves like `All`.
    pub fn date_filter(&self) -> DateFilter {
        match self.date_filter_mode {
            DateFilterMode::All => DateFilter::All,
            DateFilterMode::Since => DateFilter::parse(&self.date_value),
        }
    }

    /// Switch the filter mode; leaving `Since` clears the stored date
    pub fn set_date_filter_mode(&mut self, mode: DateFilterMode) {
        if mode == DateFilterMode::All {
            self.date_value.clear();
        }
        self.date_filter_mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let settings = Settings::load_or_default(&path).await.unwrap();
        assert_eq!(settings, Settings::default());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let settings = Settings {
            media_kind: MediaKind::Audio,
            date_filter_mode: DateFilterMode::Since,
            date_value: "20240115".to_string(),
        };
        settings.save(&path).await.unwrap();

        let loaded = Settings::load_or_default(&path).await.unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.date_filter(), DateFilter::after("20240115"));
    }

    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        tokio::fs::write(&path, "media_kind = \"audio\"\n").await.unwrap();

        let loaded = Settings::load_or_default(&path).await.unwrap();
        assert_eq!(loaded.media_kind, MediaKind::Audio);
        assert_eq!(loaded.date_filter_mode, DateFilterMode::All);
    }

    #[tokio::test]
    async fn test_malformed_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        tokio::fs::write(&path, "media_kind = [").await.unwrap();

        match Settings::load_or_default(&path).await {
            Err(DownloadError::ConfigParse { .. }) => {}
            other => panic!("expected ConfigParse, got {:?}", other),
        }
    }

    #[test]
    fn test_date_filter_mapping() {
        let mut settings = Settings::default();
        assert_eq!(settings.date_filter(), DateFilter::All);

        settings.date_filter_mode = DateFilterMode::Since;
        assert_eq!(settings.date_filter(), DateFilter::All);

        settings.date_value = "20230101".to_string();
        assert_eq!(settings.date_filter(), DateFilter::after("20230101"));

        settings.set_date_filter_mode(DateFilterMode::All);
        assert!(settings.date_value.is_empty());
        assert_eq!(settings.date_filter(), DateFilter::All);
    }
}
