use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Endpoint the probe talks to when none has been configured.
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5000";

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Base URL of the location service, e.g. "http://localhost:5000".
    pub service_url: Option<String>,
}

impl Config {
    /// Configured endpoint, falling back to the default.
    pub fn service_url_or_default(&self) -> &str {
        self.service_url.as_deref().unwrap_or(DEFAULT_SERVICE_URL)
    }

    pub fn set_service_url(&mut self, url: String) {
        self.service_url = Some(url);
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "point-probe", "probe-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_endpoint() {
        let cfg = Config::default();
        assert_eq!(cfg.service_url_or_default(), DEFAULT_SERVICE_URL);
    }

    #[test]
    fn configured_endpoint_wins() {
        let mut cfg = Config::default();
        cfg.set_service_url("http://weather.internal:8080".to_string());
        assert_eq!(cfg.service_url_or_default(), "http://weather.internal:8080");
    }

    #[test]
    fn round_trips_through_toml() {
        let mut cfg = Config::default();
        cfg.set_service_url("http://localhost:9000".to_string());

        let text = toml::to_string_pretty(&cfg).expect("serializes");
        let parsed: Config = toml::from_str(&text).expect("parses back");
        assert_eq!(parsed.service_url_or_default(), "http://localhost:9000");
    }
}
