//! Runtime configuration.
//!
//! Every field has a default, so the tool runs without a config file. A YAML
//! file passed with `--config` overrides any subset of fields:
//!
//! ```yaml
//! request_timeout_secs: 20
//! min_host_interval_ms: 1500
//! earnings_sources: [finviz, yahoo]
//! news:
//!   max_articles_per_source: 3
//! ```

use crate::error::ConfigError;
use crate::models::SourceId;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP client behaviour shared by every source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Minimum gap between two requests to the same host.
    pub min_host_interval_ms: u64,
    /// Random extra delay added on top of the minimum gap.
    pub host_jitter_ms: u64,
    /// Additional attempts after a transient failure.
    pub max_retries: usize,
    pub retry_base_delay_ms: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 15,
            min_host_interval_ms: 1000,
            host_jitter_ms: 250,
            max_retries: 1,
            retry_base_delay_ms: 1000,
        }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn min_host_interval(&self) -> Duration {
        Duration::from_millis(self.min_host_interval_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

/// News fetcher knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsSettings {
    pub ttl_secs: u64,
    pub sources: Vec<String>,
    pub max_articles_per_source: usize,
    /// Listing items older than this are ignored.
    pub max_age_days: i64,
    pub summary_sentences: usize,
    /// Article pages downloaded at once.
    pub download_concurrency: usize,
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 30 * 60,
            sources: vec![
                "yahoo".to_string(),
                "marketwatch".to_string(),
                "google_news".to_string(),
            ],
            max_articles_per_source: 5,
            max_age_days: 7,
            summary_sentences: 3,
            download_concurrency: 4,
        }
    }
}

impl NewsSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    #[serde(flatten)]
    pub fetch: FetchSettings,
    pub earnings_ttl_secs: u64,
    pub max_days_ahead: i64,
    /// Earnings sources to query. Dedup priority is fixed regardless of order here.
    pub earnings_sources: Vec<String>,
    pub news: NewsSettings,
    pub log_file: Option<String>,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            earnings_ttl_secs: 60 * 60,
            max_days_ahead: 90,
            earnings_sources: SourceId::ALL.iter().map(|s| s.name().to_string()).collect(),
            news: NewsSettings::default(),
            log_file: Some("earnings_radar.log".to_string()),
        }
    }
}

impl RadarConfig {
    /// Load from a YAML file, falling back to defaults for missing fields.
    #[instrument(level = "info")]
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Yaml {
            path: path.to_string(),
            source,
        })?;
        info!(path, "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn earnings_ttl(&self) -> Duration {
        Duration::from_secs(self.earnings_ttl_secs)
    }

    /// Resolve `earnings_sources` names into ids.
    pub fn earnings_source_ids(&self) -> Result<Vec<SourceId>, ConfigError> {
        self.earnings_sources
            .iter()
            .map(|name| {
                SourceId::from_name(name).ok_or_else(|| ConfigError::UnknownSource(name.clone()))
            })
            .collect()
    }
}
