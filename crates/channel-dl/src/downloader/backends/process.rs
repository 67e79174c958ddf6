//! External tool backed by real child processes

use crate::downloader::{
    config::DownloadConfig,
    core::{DownloadError, Result},
    tool::ExternalTool,
};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info_span, warn, Instrument};

/// Runs the fetch tool as a child process
///
/// Children are spawned with `kill_on_drop`, so an invocation that times out
/// or whose future is dropped does not leave the process running.
#[derive(Debug, Clone)]
pub struct ProcessTool {
    program: PathBuf,
    base_args: Vec<String>,
}

impl ProcessTool {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
        }
    }

    /// Arguments placed before every invocation's own arguments
    pub fn with_base_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn from_config(config: &DownloadConfig) -> Self {
        Self::new(config.tool_path.clone()).with_base_args(config.tool_base_args.clone())
    }

    fn command(&self, args: &[String]) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.base_args)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }

    fn spawn(&self, mut command: Command) -> Result<Child> {
        command.spawn().map_err(|source| DownloadError::ToolSpawn {
            program: self.name(),
            source,
        })
    }

    fn timeout_error(&self, timeout: Duration) -> DownloadError {
        DownloadError::ToolTimeout {
            program: self.name(),
            timeout_secs: timeout.as_secs(),
        }
    }
}

#[async_trait]
impl ExternalTool for ProcessTool {
    async fn capture(&self, args: &[String], timeout: Option<Duration>) -> Result<String> {
        let span = info_span!("tool_capture", program = %self.name());

        async move {
            debug!("Running {} {:?}", self.name(), args);
            let mut command = self.command(args);
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
            let child = self.spawn(command)?;

            let output = match timeout {
                Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                    Ok(output) => output,
                    Err(_) => {
                        warn!("{} timed out after {:?}", self.name(), limit);
                        return Err(self.timeout_error(limit));
                    }
                },
                None => child.wait_with_output().await,
            }
            .map_err(|source| DownloadError::ToolSpawn {
                program: self.name(),
                source,
            })?;

            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));

            if !output.status.success() {
                return Err(DownloadError::ToolExited {
                    program: self.name(),
                    code: output.status.code(),
                    output: combined,
                });
            }

            debug!("{} produced {} bytes of output", self.name(), combined.len());
            Ok(combined)
        }
        .instrument(span)
        .await
    }

    async fn run_streaming(&self, args: &[String], timeout: Option<Duration>) -> Result<()> {
        let span = info_span!("tool_stream", program = %self.name());

        async move {
            debug!("Running {} {:?}", self.name(), args);
            let mut command = self.command(args);
            command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            let mut child = self.spawn(command)?;

            let status = match timeout {
                Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                    Ok(status) => status,
                    Err(_) => {
                        warn!("{} timed out after {:?}, killing it", self.name(), limit);
                        if let Err(e) = child.kill().await {
                            warn!("Failed to kill {}: {}", self.name(), e);
                        }
                        return Err(self.timeout_error(limit));
                    }
                },
                None => child.wait().await,
            }
            .map_err(|source| DownloadError::ToolSpawn {
                program: self.name(),
                source,
            })?;

            if !status.success() {
                return Err(DownloadError::ToolExited {
                    program: self.name(),
                    code: status.code(),
                    output: String::new(),
                });
            }

            Ok(())
        }
        .instrument(span)
        .await
    }

    fn name(&self) -> String {
        self.program.display().to_string()
    }
}
