//! YouTube Data API v3 client
use super::{PlatformError, Result, VideoPlatform};
use crate::config::ApiConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shorts_core::{SearchCriteria, VideoId, VideoRecord};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Parts requested from the `videos` endpoint
const VIDEO_PARTS: &str = "snippet,statistics,contentDetails";

/// YouTube Data API client; build once and share across runs
pub struct YouTubeClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(config: &ApiConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        // Trailing slash so that joining "search" appends instead of replacing the last segment
        let base_url = Url::parse(&format!("{}/", config.base_url.trim_end_matches('/')))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// URL of the single-page search request
    pub fn search_url(&self, criteria: &SearchCriteria) -> Result<Url> {
        let mut url = self.base_url.join("search")?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("part", "id")
                .append_pair("type", "video")
                .append_pair("order", criteria.order().as_query_value())
                .append_pair("videoDuration", criteria.duration_class().as_query_value())
                .append_pair("maxResults", &criteria.max_results().to_string())
                .append_pair("publishedAfter", &criteria.published_after_param());
            if let Some(keyword) = criteria.keyword() {
                query.append_pair("q", keyword);
            }
            query.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// URL of the batch metadata lookup
    pub fn videos_url(&self, ids: &[VideoId]) -> Result<Url> {
        let joined = ids.iter().map(VideoId::as_str).collect::<Vec<_>>().join(",");

        let mut url = self.base_url.join("videos")?;
        url.query_pairs_mut()
            .append_pair("part", VIDEO_PARTS)
            .append_pair("id", &joined)
            .append_pair("key", &self.api_key);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {}{}", url.origin().ascii_serialization(), url.path());

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), &body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl VideoPlatform for YouTubeClient {
    async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<VideoId>> {
        let url = self.search_url(criteria)?;
        debug!(
            "Searching keyword={:?} publishedAfter={} maxResults={}",
            criteria.keyword(),
            criteria.published_after_param(),
            criteria.max_results()
        );

        let response: SearchListResponse = self.get_json(url).await?;
        Ok(response.into_video_ids())
    }

    async fn video_details(&self, ids: &[VideoId]) -> Result<Vec<VideoRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.videos_url(ids)?;
        debug!("Fetching details for {} videos", ids.len());

        let response: VideoListResponse = self.get_json(url).await?;
        Ok(response.into_records())
    }

    fn name(&self) -> &str {
        "youtube"
    }
}

/// Classify a non-success response body
fn error_from_body(status: u16, body: &str) -> PlatformError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.is_null() => {
            let message = envelope
                .error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("no message")
                .to_string();
            PlatformError::Api {
                status,
                message,
                payload: envelope.error,
            }
        }
        _ => PlatformError::Status {
            status,
            body: body.chars().take(500).collect(),
        },
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
}

impl SearchListResponse {
    fn into_video_ids(self) -> Vec<VideoId> {
        self.items
            .into_iter()
            .filter_map(|item| item.id.and_then(|id| id.video_id))
            .filter(|id| !id.is_empty())
            .map(VideoId::new)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: Option<SearchResultId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

impl VideoListResponse {
    fn into_records(self) -> Vec<VideoRecord> {
        self.items.into_iter().map(VideoRecord::from).collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: Option<VideoSnippet>,
    statistics: Option<VideoStatistics>,
    content_details: Option<VideoContentDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    title: Option<String>,
    description: Option<String>,
    channel_title: Option<String>,
    published_at: Option<String>,
    tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct VideoContentDetails {
    duration: Option<String>,
}

impl From<VideoItem> for VideoRecord {
    fn from(item: VideoItem) -> Self {
        let snippet = item.snippet.unwrap_or_default();
        let statistics = item.statistics.unwrap_or_default();
        let content_details = item.content_details.unwrap_or_default();

        VideoRecord {
            id: item.id,
            title: snippet.title.unwrap_or_default(),
            channel_title: snippet.channel_title.unwrap_or_default(),
            description: snippet.description.unwrap_or_default(),
            tags: snippet.tags.unwrap_or_default(),
            view_count: statistics.view_count,
            like_count: statistics.like_count,
            comment_count: statistics.comment_count,
            published_at: snippet.published_at,
            duration_code: content_details.duration.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn client() -> YouTubeClient {
        YouTubeClient::new(&ApiConfig::default(), "test-key".to_string()).unwrap()
    }

    fn query_map(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn test_search_url_parameters() {
        let criteria = SearchCriteria::builder()
            .keyword(Some("PUBG: BATTLEGROUNDS"))
            .lookback_days(Some(90))
            .build_at(Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap());

        let url = client().search_url(&criteria).unwrap();
        assert_eq!(url.path(), "/youtube/v3/search");

        let query = query_map(&url);
        assert_eq!(query["part"], "id");
        assert_eq!(query["type"], "video");
        assert_eq!(query["order"], "viewCount");
        assert_eq!(query["videoDuration"], "short");
        assert_eq!(query["maxResults"], "50");
        assert_eq!(query["publishedAfter"], "2024-04-01T12:00:00.000Z");
        assert_eq!(query["q"], "PUBG: BATTLEGROUNDS");
        assert_eq!(query["key"], "test-key");
    }

    #[test]
    fn test_search_url_omits_query_without_keyword() {
        let criteria = SearchCriteria::builder().build();
        let url = client().search_url(&criteria).unwrap();
        assert!(!query_map(&url).contains_key("q"));
    }

    #[test]
    fn test_videos_url_joins_ids() {
        let ids = vec![VideoId::new("a1"), VideoId::new("b2")];
        let url = client().videos_url(&ids).unwrap();

        assert_eq!(url.path(), "/youtube/v3/videos");
        let query = query_map(&url);
        assert_eq!(query["id"], "a1,b2");
        assert_eq!(query["part"], "snippet,statistics,contentDetails");
    }

    #[test]
    fn test_base_url_with_trailing_slash() {
        let config = ApiConfig {
            base_url: "http://localhost:8080/v3/".to_string(),
            ..ApiConfig::default()
        };
        let client = YouTubeClient::new(&config, "k".to_string()).unwrap();
        let url = client.videos_url(&[VideoId::new("x")]).unwrap();
        assert_eq!(url.path(), "/v3/videos");
    }

    #[test]
    fn test_search_response_skips_items_without_video_id() {
        let body = r#"{
            "kind": "youtube#searchListResponse",
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "v1"}},
                {"id": {"kind": "youtube#channel", "channelId": "c1"}},
                {},
                {"id": {"kind": "youtube#video", "videoId": "v2"}}
            ]
        }"#;

        let response: SearchListResponse = serde_json::from_str(body).unwrap();
        let ids = response.into_video_ids();
        assert_eq!(ids, vec![VideoId::new("v1"), VideoId::new("v2")]);
    }

    #[test]
    fn test_empty_search_response() {
        let response: SearchListResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_video_ids().is_empty());
    }

    #[test]
    fn test_video_response_maps_to_records() {
        let body = r#"{
            "items": [
                {
                    "id": "v1",
                    "snippet": {
                        "publishedAt": "2024-05-01T10:00:00Z",
                        "title": "Clutch",
                        "description": "desc",
                        "channelTitle": "Chan",
                        "tags": ["fps", "shorts"]
                    },
                    "statistics": {"viewCount": "1000", "likeCount": "50"},
                    "contentDetails": {"duration": "PT31S"}
                },
                {"id": "v2"}
            ]
        }"#;

        let response: VideoListResponse = serde_json::from_str(body).unwrap();
        let records = response.into_records();

        assert_eq!(records.len(), 2);
        let first = &records[0];
        assert_eq!(first.title, "Clutch");
        assert_eq!(first.channel_title, "Chan");
        assert_eq!(first.tags, vec!["fps", "shorts"]);
        assert_eq!(first.view_count.as_deref(), Some("1000"));
        assert_eq!(first.comment_count, None);
        assert_eq!(first.duration_code, "PT31S");

        let bare = &records[1];
        assert_eq!(bare.id, "v2");
        assert!(bare.title.is_empty());
        assert!(bare.duration_code.is_empty());
        assert_eq!(bare.published_at, None);
    }

    #[test]
    fn test_structured_error_body() {
        let body = r#"{"error": {"code": 403, "message": "quotaExceeded", "errors": [{"reason": "quotaExceeded"}]}}"#;

        match error_from_body(403, body) {
            PlatformError::Api { status, message, payload } => {
                assert_eq!(status, 403);
                assert_eq!(message, "quotaExceeded");
                assert_eq!(payload["code"], 403);
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_unstructured_error_body() {
        let err = error_from_body(502, "<html>Bad Gateway</html>");
        assert!(matches!(err, PlatformError::Status { status: 502, .. }));
        assert!(err.api_payload().is_none());
    }

    #[tokio::test]
    async fn test_empty_id_list_skips_request() {
        // Unroutable base URL: any request would fail
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9/v3".to_string(),
            ..ApiConfig::default()
        };
        let client = YouTubeClient::new(&config, "k".to_string()).unwrap();
        let records = client.video_details(&[]).await.unwrap();
        assert!(records.is_empty());
    }
}
