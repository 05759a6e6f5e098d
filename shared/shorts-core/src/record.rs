//! Video identifiers and metadata records

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform-assigned video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VideoId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Full metadata for one video, as returned by the detail lookup
///
/// Statistics stay in the platform's decimal-string form; they are only
/// ever projected into CSV text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub channel_title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub comment_count: Option<String>,
    /// RFC 3339 publish timestamp
    pub published_at: Option<String>,
    /// ISO 8601 duration, e.g. `PT45S`
    pub duration_code: String,
}

impl VideoRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_channel_title(mut self, channel_title: impl Into<String>) -> Self {
        self.channel_title = channel_title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_statistics(
        mut self,
        views: Option<&str>,
        likes: Option<&str>,
        comments: Option<&str>,
    ) -> Self {
        self.view_count = views.map(str::to_string);
        self.like_count = likes.map(str::to_string);
        self.comment_count = comments.map(str::to_string);
        self
    }

    pub fn with_published_at(mut self, published_at: impl Into<String>) -> Self {
        self.published_at = Some(published_at.into());
        self
    }

    pub fn with_duration(mut self, duration_code: impl Into<String>) -> Self {
        self.duration_code = duration_code.into();
        self
    }

    /// Public link to the video in the shorts player
    pub fn shorts_link(&self) -> String {
        format!("https://youtube.com/shorts/{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorts_link() {
        let record = VideoRecord::new("abc123");
        assert_eq!(record.shorts_link(), "https://youtube.com/shorts/abc123");
    }

    #[test]
    fn test_video_id_serializes_as_plain_string() {
        let id = VideoId::new("xyz");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"xyz\"");
        assert_eq!(id.to_string(), "xyz");
    }
}
