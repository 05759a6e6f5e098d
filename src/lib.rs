/// Shorts Harvester
///
/// Searches a video platform for short-form videos by keyword and publish
/// window, keeps the ones short enough to be shorts, and exports them to CSV.
/// Runs either once for a single keyword or sequentially over a
/// keyword × lookback-period grid.

pub mod config;
pub mod platform;
pub mod pipeline;
pub mod batch;

// Re-export main types for easy access
pub use crate::config::{ConfigBuilder, HarvesterConfig};
pub use crate::platform::{PlatformError, VideoPlatform, YouTubeClient};
pub use crate::pipeline::{Pipeline, RunReport};
pub use crate::batch::{BatchDriver, BatchPlan, BatchSummary, Combination, CombinationFailure, CombinationOutcome};
pub use shorts_core::{DurationPolicy, SearchCriteria, VideoId, VideoRecord};

/// Result type for harvesting operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Error types for harvesting operations
#[derive(thiserror::Error, Debug)]
pub enum HarvestError {
    #[error("A search keyword is required (use --all to search without one)")]
    MissingKeyword,

    #[error("API key not found: set the {0} environment variable")]
    MissingApiKey(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Core(#[from] shorts_core::CoreError),
}
