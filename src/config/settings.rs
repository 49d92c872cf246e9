//! Settings structures for the search engine connection

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Request timeout used when none, or an unusable one, is configured
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;

/// Lower bound for the first task poll delay
pub const MIN_TASK_POLL_INTERVAL_MS: u64 = 1;

/// A timeout in seconds that maps onto a non-zero `Duration`
fn timeout_from_secs(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs)
        .ok()
        .filter(|timeout| !timeout.is_zero())
}

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables
    pub fn merge_env(&mut self) {
        self.merge_from(|key| std::env::var(key).ok());
    }

    /// Merge values from an arbitrary variable lookup. Blank values count as unset.
    pub fn merge_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(val) = get("SEARCH_ENABLED") {
            self.engine.enabled = val == "true";
        }
        if let Some(val) = get("MEILISEARCH_URL") {
            self.engine.url = Some(val);
        }
        // MEILISEARCH_API_KEY is the legacy name of the master key
        if let Some(val) = get("MEILI_MASTER_KEY").or_else(|| get("MEILISEARCH_API_KEY")) {
            self.engine.master_key = Some(val);
        }
        if let Some(val) = get("MEILISEARCH_ADMIN_KEY") {
            self.engine.admin_key = Some(val);
        }
        if let Some(val) = get("MEILISEARCH_SEARCH_KEY") {
            self.engine.search_key = Some(val);
        }
        if let Some(val) = get("MEILISEARCH_TIMEOUT") {
            match val.trim().parse::<f64>() {
                Ok(secs) if timeout_from_secs(secs).is_some() => self.engine.timeout = secs,
                _ => warn!(
                    "Ignoring MEILISEARCH_TIMEOUT={}: expected a positive number of seconds",
                    val
                ),
            }
        }
        if let Some(val) = get("MEILISEARCH_MAX_RETRIES") {
            if let Ok(retries) = val.parse() {
                self.engine.max_retries = retries;
            }
        }
    }
}

/// Connection settings for the full-text search engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Whether search is enabled at all
    pub enabled: bool,
    /// Engine base URL
    pub url: Option<String>,
    /// Master key, used only to look up the default admin/search keys
    pub master_key: Option<String>,
    /// Explicit admin key
    pub admin_key: Option<String>,
    /// Explicit search key
    pub search_key: Option<String>,
    /// Request timeout in seconds
    pub timeout: f64,
    /// Retries for transport failures and 5xx responses
    pub max_retries: u32,
    /// First delay between task status polls, in milliseconds
    pub task_poll_interval_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            url: None,
            master_key: None,
            admin_key: None,
            search_key: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            max_retries: 2,
            task_poll_interval_ms: 50,
        }
    }
}

impl EngineSettings {
    /// Request timeout. Values that are not a positive, representable number
    /// of seconds (e.g. from a settings file) fall back to the default.
    pub fn timeout(&self) -> Duration {
        timeout_from_secs(self.timeout).unwrap_or_else(|| {
            warn!(
                "Invalid engine timeout {}, using {}s",
                self.timeout, DEFAULT_TIMEOUT_SECS
            );
            Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS)
        })
    }

    pub fn task_poll_interval(&self) -> Duration {
        Duration::from_millis(self.task_poll_interval_ms.max(MIN_TASK_POLL_INTERVAL_MS))
    }
}
