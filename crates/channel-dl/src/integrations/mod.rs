//! High-level convenience APIs for common workflows
//!
//! This module provides simplified APIs that handle the most common use cases,
//! reducing the amount of boilerplate code users need to write.

pub mod channel;
pub mod progress;

// Re-export main convenience APIs
pub use channel::ChannelDownloadBuilder;
pub use progress::{LabelStyle, StatusLabels};
