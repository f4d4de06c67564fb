use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The full set of configured JIRA sites stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub default_site: Option<String>,
    #[serde(default)]
    pub sites: HashMap<String, Site>,
}

impl Config {
    /// Load configuration from the provided path or the default config file.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let path = path
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or_else(Config::default_path);

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Unable to read config file at {}", path.display()))?;

        serde_yaml::from_str(&raw)
            .with_context(|| format!("Malformed YAML in config file {}", path.display()))
    }

    /// Persist the configuration to disk, creating parent directories if needed.
    pub fn save<P: AsRef<Path>>(&self, path: Option<P>) -> Result<()> {
        let path = path
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or_else(Config::default_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Unable to create config directory {}", parent.display())
            })?;
        }

        let serialized = serde_yaml::to_string(self)?;
        fs::write(&path, serialized)
            .with_context(|| format!("Unable to write config file {}", path.display()))?;

        Ok(())
    }

    pub fn site(&self, name: &str) -> Option<&Site> {
        self.sites.get(name)
    }

    /// Returns either the requested site or falls back to the default one,
    /// then to any configured site.
    pub fn resolve_site<'a>(&'a self, requested: Option<&'a str>) -> Option<(&'a str, &'a Site)> {
        if let Some(name) = requested {
            self.sites.get(name).map(|site| (name, site))
        } else if let Some(default_name) = self.default_site.as_deref() {
            self.sites.get(default_name).map(|site| (default_name, site))
        } else {
            // HashMap order is arbitrary; pick the smallest name so the choice is stable.
            self.sites
                .iter()
                .min_by(|(a, _), (b, _)| a.cmp(b))
                .map(|(name, site)| (name.as_str(), site))
        }
    }

    fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".jira-rest");
        path.push("config.yaml");
        path
    }
}

/// Connection settings for one JIRA server. The password may be left out
/// when it lives in the credential store instead.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Site {
    pub base_url: Option<String>,
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Site {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
