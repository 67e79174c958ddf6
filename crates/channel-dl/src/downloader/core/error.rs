//! Error types for the batch downloader with context and recovery information

use std::error::Error;
use std::path::PathBuf;
use thiserror::Error;

/// Error taxonomy for enumeration, per-item downloads and the surrounding plumbing
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Date filter is not exactly eight ASCII digits
    #[error("Invalid date filter '{value}': expected YYYYMMDD (8 digits)")]
    InvalidDateFormat { value: String },

    /// Listing the items of a source failed; nothing was downloaded
    #[error("Failed to enumerate items of '{url}'")]
    EnumerationFailed {
        url: String,
        #[source]
        cause: Box<DownloadError>,
    },

    /// A single item could not be downloaded
    #[error("Failed to download '{item}'")]
    ItemDownloadFailed {
        item: String,
        #[source]
        cause: Box<DownloadError>,
    },

    /// The title of a single item could not be resolved
    #[error("Failed to resolve the title of '{item}'")]
    TitleResolutionFailed {
        item: String,
        #[source]
        cause: Box<DownloadError>,
    },

    /// Appending to the title log failed
    #[error("Failed to append to title log '{path}'")]
    LogWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external tool could not be started
    #[error("Failed to start '{program}'")]
    ToolSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external tool exited unsuccessfully
    #[error("'{program}' exited with {}", exit_description(.code))]
    ToolExited {
        program: String,
        code: Option<i32>,
        output: String,
    },

    /// The external tool did not finish in time and was killed
    #[error("'{program}' timed out after {timeout_secs}s")]
    ToolTimeout { program: String, timeout_secs: u64 },

    /// File system I/O errors with file context
    #[error("File operation failed on '{path}' ({operation})")]
    FileSystem {
        path: PathBuf,
        operation: FileOperation,
        #[source]
        source: std::io::Error,
    },

    /// Source URL could not be parsed
    #[error("Invalid URL '{url}': {suggestion}")]
    InvalidUrl {
        url: String,
        suggestion: String,
        #[source]
        source: url::ParseError,
    },

    /// Configuration errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
        suggestion: Option<String>,
    },

    /// Persisted settings could not be parsed
    #[error("Failed to parse settings file '{path}'")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Settings could not be serialized
    #[error("Failed to serialize settings")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Batch cancelled by the caller
    #[error("Batch cancelled: {reason}")]
    Cancelled { reason: String },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Types of file operations for error context
#[derive(Debug, Clone, PartialEq)]
pub enum FileOperation {
    Read,
    Write,
    CreateDir,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Read => write!(f, "reading"),
            FileOperation::Write => write!(f, "writing"),
            FileOperation::CreateDir => write!(f, "creating directory"),
        }
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;

impl DownloadError {
    /// Whether this error aborts the whole batch
    ///
    /// Pre-flight and enumeration failures are terminal. Everything that
    /// happens to one item is recorded and the batch moves on.
    pub fn is_batch_fatal(&self) -> bool {
        match self {
            DownloadError::InvalidDateFormat { .. } => true,
            DownloadError::EnumerationFailed { .. } => true,
            DownloadError::InvalidUrl { .. } => true,
            DownloadError::Configuration { .. } => true,
            DownloadError::Cancelled { .. } => true,
            DownloadError::FileSystem { .. } => true,
            DownloadError::ItemDownloadFailed { .. } => false,
            DownloadError::TitleResolutionFailed { .. } => false,
            DownloadError::LogWriteFailed { .. } => false,
            DownloadError::ToolSpawn { .. } => false,
            DownloadError::ToolExited { .. } => false,
            DownloadError::ToolTimeout { .. } => false,
            DownloadError::ConfigParse { .. } => true,
            DownloadError::ConfigSerialize(_) => true,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            DownloadError::InvalidDateFormat { .. } => "invalid_date_format",
            DownloadError::EnumerationFailed { .. } => "enumeration_failed",
            DownloadError::ItemDownloadFailed { .. } => "item_download_failed",
            DownloadError::TitleResolutionFailed { .. } => "title_resolution_failed",
            DownloadError::LogWriteFailed { .. } => "log_write_failed",
            DownloadError::ToolSpawn { .. } => "tool_spawn",
            DownloadError::ToolExited { .. } => "tool_exited",
            DownloadError::ToolTimeout { .. } => "tool_timeout",
            DownloadError::FileSystem { .. } => "file_system",
            DownloadError::InvalidUrl { .. } => "invalid_url",
            DownloadError::Configuration { .. } => "configuration",
            DownloadError::ConfigParse { .. } => "config_parse",
            DownloadError::ConfigSerialize(_) => "config_serialize",
            DownloadError::Cancelled { .. } => "cancelled",
        }
    }

    /// Get severity level for error prioritization
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DownloadError::InvalidDateFormat { .. } => ErrorSeverity::High,
            DownloadError::EnumerationFailed { .. } => ErrorSeverity::High,
            DownloadError::ItemDownloadFailed { .. } => ErrorSeverity::Medium,
            DownloadError::TitleResolutionFailed { .. } => ErrorSeverity::Medium,
            DownloadError::LogWriteFailed { .. } => ErrorSeverity::Low,
            DownloadError::ToolSpawn { .. } => ErrorSeverity::Critical,
            DownloadError::ToolExited { .. } => ErrorSeverity::Medium,
            DownloadError::ToolTimeout { .. } => ErrorSeverity::Medium,
            DownloadError::FileSystem { .. } => ErrorSeverity::High,
            DownloadError::InvalidUrl { .. } => ErrorSeverity::High,
            DownloadError::Configuration { .. } => ErrorSeverity::High,
            DownloadError::ConfigParse { .. } => ErrorSeverity::High,
            DownloadError::ConfigSerialize(_) => ErrorSeverity::High,
            DownloadError::Cancelled { .. } => ErrorSeverity::Low,
        }
    }

    /// Get user-friendly suggestion for resolving the error
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            DownloadError::InvalidDateFormat { .. } => {
                Some("Use an 8-digit date such as 20240131, or 'all' to disable the filter")
            }
            DownloadError::ToolSpawn { .. } => {
                Some("Check that yt-dlp is installed and the tool path is correct")
            }
            DownloadError::ToolTimeout { .. } => {
                Some("Increase the timeout or check your network connection")
            }
            DownloadError::InvalidUrl { suggestion, .. } => Some(suggestion),
            DownloadError::Configuration { suggestion, .. } => suggestion.as_deref(),
            DownloadError::EnumerationFailed { cause, .. }
            | DownloadError::ItemDownloadFailed { cause, .. }
            | DownloadError::TitleResolutionFailed { cause, .. } => cause.suggestion(),
            _ => None,
        }
    }

    /// Create a detailed error report for debugging
    pub fn detailed_report(&self) -> String {
        let mut report = format!("Error: {}\n", self);
        report.push_str(&format!("Category: {}\n", self.category()));
        report.push_str(&format!("Severity: {:?}\n", self.severity()));
        report.push_str(&format!("Batch fatal: {}\n", self.is_batch_fatal()));

        if let Some(suggestion) = self.suggestion() {
            report.push_str(&format!("Suggestion: {}\n", suggestion));
        }

        if let Some(source) = self.source() {
            report.push_str(&format!("Root cause: {}\n", source));
        }

        if let Some(output) = self.tool_output() {
            if !output.trim().is_empty() {
                report.push_str(&format!("Tool output:\n{}\n", output.trim_end()));
            }
        }

        report
    }

    /// Captured output of a failed tool invocation, if any
    pub fn tool_output(&self) -> Option<&str> {
        match self {
            DownloadError::ToolExited { output, .. } => Some(output),
            DownloadError::EnumerationFailed { cause, .. }
            | DownloadError::ItemDownloadFailed { cause, .. }
            | DownloadError::TitleResolutionFailed { cause, .. } => cause.tool_output(),
            _ => None,
        }
    }
}

/// Error severity levels for prioritization
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl From<url::ParseError> for DownloadError {
    fn from(error: url::ParseError) -> Self {
        let suggestion = match error {
            url::ParseError::EmptyHost => "URL must have a valid hostname",
            url::ParseError::InvalidPort => "Port number must be between 1 and 65535",
            url::ParseError::RelativeUrlWithoutBase => "URL must be absolute (include https://)",
            _ => "Check URL format and try again",
        }
        .to_string();

        DownloadError::InvalidUrl {
            url: "<unparseable>".to_string(),
            suggestion,
            source: error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_item_errors_are_not_fatal() {
        let exited = DownloadError::ToolExited {
            program: "yt-dlp".to_string(),
            code: Some(1),
            output: String::new(),
        };
        let item = DownloadError::ItemDownloadFailed {
            item: "https://example.com/watch?v=1".to_string(),
            cause: Box::new(exited),
        };
        assert!(!item.is_batch_fatal());
        assert_eq!(item.category(), "item_download_failed");

        let log = DownloadError::LogWriteFailed {
            path: PathBuf::from("names.txt"),
            source: std::io::Error::other("disk full"),
        };
        assert!(!log.is_batch_fatal());
    }

    #[test]
    fn test_enumeration_failure_is_fatal_and_reports_cause() {
        let err = DownloadError::EnumerationFailed {
            url: "https://example.com/@chan".to_string(),
            cause: Box::new(DownloadError::ToolExited {
                program: "yt-dlp".to_string(),
                code: Some(2),
                output: "ERROR: no such channel\n".to_string(),
            }),
        };
        assert!(err.is_batch_fatal());

        let report = err.detailed_report();
        assert!(report.contains("Category: enumeration_failed"));
        assert!(report.contains("Root cause: 'yt-dlp' exited with status 2"));
        assert!(report.contains("ERROR: no such channel"));
    }

    #[test]
    fn test_invalid_date_has_suggestion() {
        let err = DownloadError::InvalidDateFormat { value: "2024-01".to_string() };
        assert!(err.to_string().contains("2024-01"));
        assert!(err.suggestion().is_some());
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_signal_exit_description() {
        let err = DownloadError::ToolExited {
            program: "yt-dlp".to_string(),
            code: None,
            output: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }
}
