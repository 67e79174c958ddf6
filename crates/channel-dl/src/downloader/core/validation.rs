//! Pre-flight validation of requests
//!
//! Everything here runs before the external tool is invoked, so a rejected
//! request never spawns a process.

use serde::{Deserialize, Serialize};

use crate::downloader::core::error::{DownloadError, Result};

/// Lower bound on the publish date of enumerated items
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateFilter {
    /// No bound, every item of the source is listed
    #[default]
    All,
    /// Only items published on or after this `YYYYMMDD` date
    After(String),
}

impl DateFilter {
    /// Sentinel accepted by [`DateFilter::parse`] for "all items"
    pub const ALL_SENTINEL: &'static str = "all";

    /// Interpret user input as a date filter
    ///
    /// Empty input and the `all` sentinel (any case) mean no filter. Any other
    /// value is kept verbatim and only checked by [`validate_date_filter`],
    /// so malformed dates still surface as `InvalidDateFormat`.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(Self::ALL_SENTINEL) {
            DateFilter::All
        } else {
            DateFilter::After(trimmed.to_string())
        }
    }

    pub fn after<S: Into<String>>(date: S) -> Self {
        DateFilter::After(date.into())
    }

    pub fn as_date(&self) -> Option<&str> {
        match self {
            DateFilter::All => None,
            DateFilter::After(date) => Some(date),
        }
    }
}

/// Check that a date is exactly eight ASCII digits
pub fn is_valid_date(date: &str) -> bool {
    date.len() == 8 && date.bytes().all(|b| b.is_ascii_digit())
}

/// Validate a date filter, returning the date to pass on the command line
pub fn validate_date_filter(filter: &DateFilter) -> Result<Option<&str>> {
    match filter {
        DateFilter::All => Ok(None),
        DateFilter::After(date) if is_valid_date(date) => Ok(Some(date)),
        DateFilter::After(date) => Err(DownloadError::InvalidDateFormat {
            value: date.clone(),
        }),
    }
}

/// Validate the source URL of a request
pub fn validate_source_url(source_url: &str) -> Result<()> {
    if source_url.trim().is_empty() {
        return Err(DownloadError::Configuration {
            message: "source URL is empty".to_string(),
            field: Some("source_url".to_string()),
            suggestion: Some("Pass a channel or playlist URL".to_string()),
        });
    }

    url::Url::parse(source_url).map_err(|e| match DownloadError::from(e) {
        DownloadError::InvalidUrl { suggestion, source, .. } => DownloadError::InvalidUrl {
            url: source_url.to_string(),
            suggestion,
            source,
        },
        other => other,
    })?;

    Ok(())
}
