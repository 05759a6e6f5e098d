use crate::{HarvestError, Result};
use serde::{Deserialize, Serialize};
use shorts_core::criteria::{DEFAULT_LOOKBACK_DAYS, MAX_PAGE_SIZE};
use shorts_core::DurationPolicy;
use std::path::{Path, PathBuf};

/// Configuration for the Shorts Harvester
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvesterConfig {
    /// Platform API settings
    pub api: ApiConfig,

    /// Search request defaults
    pub search: SearchConfig,

    /// Keyword × period grid for batch runs
    pub batch: BatchConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the platform's data API
    pub base_url: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// API key; normally left unset and read from `api_key_env`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// HTTP request timeout (seconds)
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Lookback window used when none is given on the command line
    pub default_lookback_days: u32,

    /// Page size requested from the search endpoint (at most 50)
    pub max_results: u32,

    /// Which duration encodings count as shorts
    pub duration_policy: DurationPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub keywords: Vec<String>,
    pub periods_days: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the CSV files
    pub results_dir: PathBuf,

    /// Include `_<n>days` in output file names
    pub tag_period: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            api_key_env: "YT_API_KEY".to_string(),
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_lookback_days: DEFAULT_LOOKBACK_DAYS,
            max_results: MAX_PAGE_SIZE,
            duration_policy: DurationPolicy::SecondsOnly,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            keywords: [
                "THE FINALS",
                "ザ･ファイナルズ",
                "Fortnite",
                "フォートナイト",
                "PUBG: BATTLEGROUNDS",
                "PUBG",
                "Battlefield 2042",
                "バトルフィールド",
                "Call of Duty",
                "Marvel Rivals",
                "マーベル・ライバルズ",
                "Counter-Strike 2",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            periods_days: vec![1095, 365, 90],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            tag_period: true,
        }
    }
}

impl ApiConfig {
    /// API key from the config file, else from the configured environment variable
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(key.clone());
        }

        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| HarvestError::MissingApiKey(self.api_key_env.clone()))
    }
}

impl HarvesterConfig {
    /// Load configuration from the first file found, falling back to defaults
    pub fn load() -> Result<Self> {
        let config_paths = [
            "shorts-harvester.toml",
            "config/shorts-harvester.toml",
        ];

        for path in &config_paths {
            if Path::new(path).exists() {
                return Self::load_from(Path::new(path));
            }
        }

        tracing::debug!("No configuration file found, using defaults");
        Self::from_env()
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path).map_err(|e| {
            HarvestError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;

        let mut config: Self = toml::from_str(&config_str).map_err(|e| {
            HarvestError::Configuration(format!("cannot parse {}: {}", path.display(), e))
        })?;

        tracing::info!("📄 Loaded configuration from: {}", path.display());
        config.apply_env_overrides();
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(output_dir) = std::env::var("SHORTS_HARVESTER_OUTPUT_DIR") {
            self.output.results_dir = PathBuf::from(output_dir);
        }

        if let Ok(base_url) = std::env::var("SHORTS_HARVESTER_BASE_URL") {
            self.api.base_url = base_url;
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)
            .map_err(|e| HarvestError::Configuration(e.to_string()))?;
        std::fs::write(path, config_str).map_err(|e| {
            HarvestError::Configuration(format!("cannot write {}: {}", path.display(), e))
        })?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.search.max_results == 0 || self.search.max_results > MAX_PAGE_SIZE {
            return Err(HarvestError::Configuration(format!(
                "search.max_results must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        if self.search.default_lookback_days == 0 {
            return Err(HarvestError::Configuration(
                "search.default_lookback_days must be greater than 0".to_string(),
            ));
        }

        if self.api.timeout_seconds == 0 {
            return Err(HarvestError::Configuration(
                "api.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate the batch grid
    pub fn validate_batch(&self) -> Result<()> {
        if self.batch.keywords.is_empty() || self.batch.periods_days.is_empty() {
            return Err(HarvestError::Configuration(
                "batch.keywords and batch.periods_days must not be empty".to_string(),
            ));
        }

        if self.batch.periods_days.contains(&0) {
            return Err(HarvestError::Configuration(
                "batch.periods_days must all be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Shorts Harvester Configuration:\n\
            - API Base URL: {}\n\
            - API Key Variable: {}\n\
            - Timeout: {}s\n\
            - Page Size: {}\n\
            - Default Lookback: {} days\n\
            - Duration Policy: {:?}\n\
            - Batch Keywords: {}\n\
            - Batch Periods: {}\n\
            - Results Directory: {}",
            self.api.base_url,
            self.api.api_key_env,
            self.api.timeout_seconds,
            self.search.max_results,
            self.search.default_lookback_days,
            self.search.duration_policy,
            self.batch.keywords.join(", "),
            self.batch
                .periods_days
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            self.output.results_dir.display(),
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: HarvesterConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: HarvesterConfig::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.api.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api.api_key = Some(api_key.into());
        self
    }

    pub fn with_results_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.results_dir = dir;
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.config.search.max_results = max_results;
        self
    }

    pub fn with_duration_policy(mut self, policy: DurationPolicy) -> Self {
        self.config.search.duration_policy = policy;
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.config.batch.keywords = keywords;
        self
    }

    pub fn with_periods(mut self, periods_days: Vec<u32>) -> Self {
        self.config.batch.periods_days = periods_days;
        self
    }

    pub fn build(self) -> HarvesterConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
