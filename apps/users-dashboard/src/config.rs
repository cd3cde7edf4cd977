use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::controller::DEFAULT_DEBOUNCE_DELAY;

/// Dashboard settings, read from the `dashboard` section of a YAML file and
/// `DASHBOARD__*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:4000/api".to_string()
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_DELAY.as_millis() as u64
}

impl DashboardConfig {
    /// Defaults, then the optional YAML file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                bail!("Config file not found: {}", path.display());
            }
            figment = figment.merge(Figment::from(Yaml::file(path)).focus("dashboard"));
        }
        figment
            .merge(Env::prefixed("DASHBOARD__").split("__"))
            .extract()
            .context("Failed to extract dashboard config")
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// The API root as a URL; only http(s) is accepted.
    pub fn api_url(&self) -> Result<Url> {
        let url = Url::parse(self.base_url.trim())
            .with_context(|| format!("Invalid base_url '{}'", self.base_url))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => bail!("Unsupported base_url scheme '{other}'"),
        }
    }
}
