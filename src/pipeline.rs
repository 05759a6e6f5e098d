use crate::config::HarvesterConfig;
use crate::platform::VideoPlatform;
use crate::Result;
use serde::{Deserialize, Serialize};
use shorts_core::{CsvSerializer, OutputFile, SearchCriteria, ShortsFilter, VideoId, VideoRecord};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of one successful search → filter → export run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Sanitized keyword used in the file name
    pub label: String,
    pub period_days: u32,
    /// Ids returned by the search call
    pub searched: usize,
    /// Records returned by the detail lookup
    pub fetched: usize,
    /// Records that passed the duration filter
    pub kept: usize,
    pub path: PathBuf,
}

/// Runs one search/export cycle against a shared platform client
pub struct Pipeline<'a> {
    platform: &'a dyn VideoPlatform,
    filter: ShortsFilter,
    serializer: CsvSerializer<chrono::Local>,
    results_dir: PathBuf,
    tag_period: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(platform: &'a dyn VideoPlatform, filter: ShortsFilter, results_dir: PathBuf) -> Self {
        Self {
            platform,
            filter,
            serializer: CsvSerializer::local(),
            results_dir,
            tag_period: true,
        }
    }

    pub fn from_config(platform: &'a dyn VideoPlatform, config: &HarvesterConfig) -> Self {
        Self::new(
            platform,
            ShortsFilter::new(config.search.duration_policy),
            config.output.results_dir.clone(),
        )
        .with_period_tag(config.output.tag_period)
    }

    pub fn with_period_tag(mut self, tag_period: bool) -> Self {
        self.tag_period = tag_period;
        self
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Metadata lookup; an empty id list never reaches the platform
    pub async fn fetch_details(&self, ids: &[VideoId]) -> Result<Vec<VideoRecord>> {
        if ids.is_empty() {
            debug!("No ids to look up, skipping detail request");
            return Ok(Vec::new());
        }
        Ok(self.platform.video_details(ids).await?)
    }

    pub async fn run(&self, criteria: &SearchCriteria) -> Result<RunReport> {
        let ids = self.platform.search(criteria).await?;
        debug!("🔍 Search returned {} ids from {}", ids.len(), self.platform.name());

        let records = self.fetch_details(&ids).await?;
        let fetched = records.len();

        let kept = self.filter.apply(records);
        debug!("⏱️ {} of {} videos pass the duration filter", kept.len(), fetched);

        // Built fully in memory so a failure never leaves a partial file
        let document = self.serializer.serialize(&kept)?;

        let period_tag = self.tag_period.then(|| criteria.lookback_days());
        let output = OutputFile::new(criteria.keyword(), period_tag);
        let path = output.write(&self.results_dir, &document).await?;

        info!("✅ Saved → {}", path.display());

        Ok(RunReport {
            label: output.label().to_string(),
            period_days: criteria.lookback_days(),
            searched: ids.len(),
            fetched,
            kept: kept.len(),
            path,
        })
    }
}
