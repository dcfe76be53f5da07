use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tracing::debug;

/// Contents of the optional TOML configuration file.
///
/// ```toml
/// timeout_secs = 20
///
/// [providers.anikoto]
/// base_url = "https://anikoto.to"
/// headers = { Cookie = "cf_clearance=..." }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub timeout_secs: Option<u64>,
    /// Per-provider extras, keyed by provider name
    pub providers: HashMap<String, toml::Table>,
}

impl AppConfig {
    /// Loads `path`, or the default location when no path is given. A missing
    /// default file yields the default configuration; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        debug!(path = %path.display(), "Loading configuration");
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("providers-cli").join("config.toml"))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// The provider's table as JSON extras, if configured.
    pub fn provider_extras(&self, name: &str) -> anyhow::Result<Option<serde_json::Value>> {
        self.providers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, table)| {
                serde_json::to_value(table)
                    .with_context(|| format!("Invalid [providers.{name}] table"))
            })
            .transpose()
    }
}
