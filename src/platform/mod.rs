//! Video platform boundary
//!
//! The pipeline only talks to a [`VideoPlatform`]; the YouTube Data API
//! client is the production implementation.

pub mod youtube;

pub use youtube::YouTubeClient;

use async_trait::async_trait;
use shorts_core::{SearchCriteria, VideoId, VideoRecord};

/// Result type for platform calls
pub type Result<T> = std::result::Result<T, PlatformError>;

/// Errors raised while talking to the platform
#[derive(thiserror::Error, Debug)]
pub enum PlatformError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform answered with a machine-readable error payload
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        payload: serde_json::Value,
    },

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl PlatformError {
    /// Error payload, when the platform sent one
    pub fn api_payload(&self) -> Option<&serde_json::Value> {
        match self {
            PlatformError::Api { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

/// Search and metadata lookups against a video platform
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// One page of candidate ids matching the criteria
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<VideoId>>;

    /// Full metadata for the given ids; ids unknown upstream are dropped
    async fn video_details(&self, ids: &[VideoId]) -> Result<Vec<VideoRecord>>;

    fn name(&self) -> &str;
}
