//! Backend implementations of the ExternalTool trait
//!
//! Currently supported:
//! - Child processes (yt-dlp or any compatible executable)

pub mod process;

// Re-export main implementations
pub use process::ProcessTool;
