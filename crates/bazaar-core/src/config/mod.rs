//! Catalog client configuration.
//!
//! Values come from an optional JSON file and are overridden by environment
//! variables. Blank values count as unset.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::db::SyncConfig;
use crate::error::{Error, Result};
use crate::util::{compact_text, normalize_text_option};

pub const ENV_DB_PATH: &str = "BAZAAR_DB_PATH";
pub const ENV_SYNC_URL: &str = "TURSO_DATABASE_URL";
pub const ENV_SYNC_AUTH_TOKEN: &str = "TURSO_AUTH_TOKEN";
pub const ENV_SYNC_INTERVAL_SECS: &str = "BAZAAR_SYNC_INTERVAL_SECS";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Local database file
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    #[serde(default)]
    pub sync_url: Option<String>,
    #[serde(default)]
    pub sync_auth_token: Option<String>,
    /// Replica pull interval; `0` disables automatic sync
    #[serde(default)]
    pub sync_interval_secs: Option<u64>,
}

impl CatalogConfig {
    /// Parse a JSON config payload.
    pub fn from_json(payload: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(payload)
            .map_err(|error| Error::Config(format!("invalid config JSON: {error}")))?;
        Ok(config.normalized())
    }

    /// Read a config file, or defaults when it does not exist.
    pub fn load_file(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(payload) => Self::from_json(&payload),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(error.into()),
        }
    }

    /// Overlay values from the process environment.
    pub fn with_env(self) -> Result<Self> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`, keyed by the `ENV_*` names.
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(path) = normalize_text_option(lookup(ENV_DB_PATH)) {
            self.db_path = Some(PathBuf::from(path));
        }
        if let Some(url) = normalize_text_option(lookup(ENV_SYNC_URL)) {
            self.sync_url = Some(url);
        }
        if let Some(token) = normalize_text_option(lookup(ENV_SYNC_AUTH_TOKEN)) {
            self.sync_auth_token = Some(token);
        }
        if let Some(raw) = normalize_text_option(lookup(ENV_SYNC_INTERVAL_SECS)) {
            let secs = raw.parse::<u64>().map_err(|_| {
                Error::Config(format!(
                    "{ENV_SYNC_INTERVAL_SECS} must be a whole number of seconds, got '{}'",
                    compact_text(&raw)
                ))
            })?;
            self.sync_interval_secs = Some(secs);
        }
        Ok(self.normalized())
    }

    /// Replica settings, present only when both URL and token are set.
    pub fn sync_config(&self) -> Option<SyncConfig> {
        let url = normalize_text_option(self.sync_url.clone())?;
        let token = normalize_text_option(self.sync_auth_token.clone())?;
        let config = SyncConfig::new(url, token);
        Some(match self.sync_interval_secs {
            Some(0) => config.without_auto_sync(),
            Some(secs) => config.with_sync_interval(Duration::from_secs(secs)),
            None => config,
        })
    }

    fn normalized(self) -> Self {
        Self {
            db_path: self
                .db_path
                .filter(|path| !path.as_os_str().is_empty()),
            sync_url: normalize_text_option(self.sync_url),
            sync_auth_token: normalize_text_option(self.sync_auth_token),
            sync_interval_secs: self.sync_interval_secs,
        }
    }
}
