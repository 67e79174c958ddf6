//! Seam between the batch pipeline and the external fetch tool
//!
//! The pipeline only ever talks to an [`ExternalTool`]. The production
//! implementation spawns child processes (see `backends::ProcessTool`); tests
//! substitute a scripted fake.

use async_trait::async_trait;
use std::time::Duration;

use crate::downloader::core::Result;

/// Interface to a command-line media fetch tool
#[async_trait]
pub trait ExternalTool: Send + Sync {
    /// Run the tool and return its combined stdout and stderr
    ///
    /// A non-zero exit is an error (`ToolExited`) carrying the captured text.
    async fn capture(&self, args: &[String], timeout: Option<Duration>) -> Result<String>;

    /// Run the tool with its output passed straight through to ours
    ///
    /// Nothing is buffered, so no output is returned; a non-zero exit is an
    /// error (`ToolExited`) with empty output.
    async fn run_streaming(&self, args: &[String], timeout: Option<Duration>) -> Result<()>;

    /// Human readable name used in logs and errors
    fn name(&self) -> String;
}
