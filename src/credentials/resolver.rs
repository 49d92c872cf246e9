//! Credential resolution

use crate::config::EngineSettings;
use crate::engines::{KeyList, Meilisearch, SearchEngine};
use crate::error::{Result, SearchError};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Name of the engine's built-in search-only key
pub const DEFAULT_SEARCH_KEY_NAME: &str = "Default Search API Key";

/// Name of the engine's built-in admin key
pub const DEFAULT_ADMIN_KEY_NAME: &str = "Default Admin API Key";

/// Everything needed to build engine clients. Immutable; build a new one to reconfigure.
#[derive(Clone, PartialEq)]
pub struct CredentialSet {
    pub enabled: bool,
    pub url: Option<String>,
    pub master_key: Option<String>,
    pub admin_key: Option<String>,
    pub search_key: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub task_poll_interval: Duration,
}

impl CredentialSet {
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self {
            enabled: settings.enabled,
            url: settings.url.clone(),
            master_key: settings.master_key.clone(),
            admin_key: settings.admin_key.clone(),
            search_key: settings.search_key.clone(),
            timeout: settings.timeout(),
            max_retries: settings.max_retries,
            task_poll_interval: settings.task_poll_interval(),
        }
    }
}

impl Default for CredentialSet {
    fn default() -> Self {
        Self::from_settings(&EngineSettings::default())
    }
}

impl std::fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("CredentialSet")
            .field("enabled", &self.enabled)
            .field("url", &self.url)
            .field("master_key", &redact(&self.master_key))
            .field("admin_key", &redact(&self.admin_key))
            .field("search_key", &redact(&self.search_key))
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Admin and search clients. Either may be missing, which degrades the
/// matching half of the API.
#[derive(Clone, Default)]
pub struct SearchClients {
    admin: Option<Arc<dyn SearchEngine>>,
    search: Option<Arc<dyn SearchEngine>>,
}

impl SearchClients {
    pub fn new(admin: Option<Arc<dyn SearchEngine>>, search: Option<Arc<dyn SearchEngine>>) -> Self {
        Self { admin, search }
    }

    /// Clients for a process with search turned off
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn admin(&self) -> Option<&Arc<dyn SearchEngine>> {
        self.admin.as_ref()
    }

    pub fn search(&self) -> Option<&Arc<dyn SearchEngine>> {
        self.search.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.admin.is_some() || self.search.is_some()
    }

    /// The admin client, or a configuration error if there is none
    pub fn require_admin(&self) -> Result<&Arc<dyn SearchEngine>> {
        self.admin
            .as_ref()
            .ok_or_else(|| SearchError::Configuration("no admin client available".to_string()))
    }

    /// The search client, or a configuration error if there is none
    pub fn require_search(&self) -> Result<&Arc<dyn SearchEngine>> {
        self.search
            .as_ref()
            .ok_or_else(|| SearchError::Configuration("no search client available".to_string()))
    }
}

impl std::fmt::Debug for SearchClients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClients")
            .field("admin", &self.admin.is_some())
            .field("search", &self.search.is_some())
            .finish()
    }
}

/// Keys picked for each client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedKeys {
    pub admin: Option<String>,
    pub search: Option<String>,
}

/// Whether a key was configured explicitly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyState {
    Missing,
    Provided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyStatus {
    pub state: KeyState,
    /// Configured key equals the engine's default key of the same kind
    pub matches: bool,
}

/// Result of comparing configured keys against the engine's default keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KeyValidation {
    pub admin: KeyStatus,
    pub search: KeyStatus,
}

/// Builds scoped admin/search clients from a [`CredentialSet`].
///
/// Explicit admin/search keys always win. When either is missing and a master
/// key is configured, the engine's key list is fetched once and the default
/// keys fill the gaps.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    credentials: CredentialSet,
}

impl CredentialResolver {
    pub fn new(credentials: CredentialSet) -> Self {
        Self { credentials }
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::new(CredentialSet::from_settings(settings))
    }

    pub fn credentials(&self) -> &CredentialSet {
        &self.credentials
    }

    /// Build the admin and search clients
    pub async fn resolve(&self) -> Result<SearchClients> {
        if !self.credentials.enabled {
            info!("Search is disabled, no engine clients created");
            return Ok(SearchClients::disabled());
        }

        let url = self.url()?;
        let keys = self.resolve_keys().await?;

        let admin = keys
            .admin
            .as_deref()
            .map(|key| self.build_client(url, key))
            .transpose()?;
        let search = keys
            .search
            .as_deref()
            .map(|key| self.build_client(url, key))
            .transpose()?;

        match (&admin, &search) {
            (None, None) => {
                return Err(SearchError::Configuration(
                    "no admin or search key available; check MEILISEARCH_* settings".to_string(),
                ))
            }
            (None, Some(_)) => warn!("No admin key available, index writes are disabled"),
            (Some(_), None) => warn!("No search key available, queries are disabled"),
            (Some(_), Some(_)) => info!("Search clients initialized for {}", url),
        }

        Ok(SearchClients::new(admin, search))
    }

    /// Pick the key for each client, consulting the master key only when needed
    pub async fn resolve_keys(&self) -> Result<ResolvedKeys> {
        let mut keys = ResolvedKeys {
            admin: self.credentials.admin_key.clone(),
            search: self.credentials.search_key.clone(),
        };
        if keys.admin.is_some() && keys.search.is_some() {
            return Ok(keys);
        }

        if let Some(master_key) = self.credentials.master_key.as_deref() {
            let url = self.url()?;
            debug!("Looking up default keys with the master key");
            let listed = self.build_client(url, master_key)?.list_keys().await?;
            if keys.admin.is_none() {
                keys.admin = listed.named(DEFAULT_ADMIN_KEY_NAME).map(str::to_string);
            }
            if keys.search.is_none() {
                keys.search = listed.named(DEFAULT_SEARCH_KEY_NAME).map(str::to_string);
            }
        }

        Ok(keys)
    }

    /// Compare configured admin/search keys with the engine's default keys.
    /// Needs the master key; meant for diagnostics.
    pub async fn validate_default_keys(&self) -> Result<KeyValidation> {
        let url = self.url()?;
        let master_key = self.credentials.master_key.as_deref().ok_or_else(|| {
            SearchError::Configuration("a master key is required to validate keys".to_string())
        })?;
        let listed = self.build_client(url, master_key)?.list_keys().await?;

        Ok(KeyValidation {
            admin: Self::key_status(&self.credentials.admin_key, &listed, DEFAULT_ADMIN_KEY_NAME),
            search: Self::key_status(&self.credentials.search_key, &listed, DEFAULT_SEARCH_KEY_NAME),
        })
    }

    fn key_status(configured: &Option<String>, listed: &KeyList, name: &str) -> KeyStatus {
        match configured {
            Some(key) => KeyStatus {
                state: KeyState::Provided,
                matches: listed.named(name) == Some(key.as_str()),
            },
            None => KeyStatus {
                state: KeyState::Missing,
                matches: false,
            },
        }
    }

    fn url(&self) -> Result<&str> {
        self.credentials
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| SearchError::Configuration("no engine url configured".to_string()))
    }

    fn build_client(&self, url: &str, key: &str) -> Result<Arc<dyn SearchEngine>> {
        let client = Meilisearch::new(
            url,
            key,
            self.credentials.timeout,
            self.credentials.max_retries,
        )?
        .with_task_poll_interval(self.credentials.task_poll_interval);
        Ok(Arc::new(client))
    }
}
