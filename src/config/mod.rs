//! Configuration module
//!
//! Handles loading engine settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

/// Environment variable pointing at a settings file
pub const SETTINGS_PATH_ENV: &str = "RECORD_SEARCH_SETTINGS_PATH";

/// Load settings from the first settings file found, or defaults,
/// then overlay the environment.
pub fn load() -> Result<Settings> {
    let mut candidates = Vec::new();
    if let Ok(path) = std::env::var(SETTINGS_PATH_ENV) {
        candidates.push(PathBuf::from(path));
    }
    candidates.push(PathBuf::from("search.yml"));
    candidates.push(PathBuf::from("config/search.yml"));

    for path in candidates.iter() {
        if path.exists() {
            info!("Loading search settings from: {}", path.display());
            let mut settings = Settings::from_file(path)?;
            settings.merge_env();
            return Ok(settings);
        }
    }

    info!("No search settings file found, using defaults");
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}
