use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// SQLite connection string, e.g. `sqlite:campus-events.db`.
    pub database_path: String,

    /// Default tracing filter, overridable via `RUST_LOG`.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:campus-events.db".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Category segment used when an upload does not specify one.
    pub default_category: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            default_category: crate::storage::DEFAULT_ASSET_CATEGORY.to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_first_existing()?;

        if let Ok(url) = std::env::var("CAMPUS_EVENTS_DATABASE_URL") {
            config.general.database_path = url;
        }

        Ok(config)
    }

    fn load_first_existing() -> Result<Self> {
        for path in Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(&path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.is_empty() {
            anyhow::bail!("general.database_path must not be empty");
        }
        if self.storage.default_category.is_empty() {
            anyhow::bail!("storage.default_category must not be empty");
        }
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("campus-events").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".campus-events").join("config.toml"));
        }

        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.default_category, "poster");
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [general]
            database_path = "sqlite::memory:"
            "#,
        )
        .unwrap();

        assert_eq!(config.general.database_path, "sqlite::memory:");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.storage.default_category, "poster");
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = Config::default();
        config.general.database_path.clear();
        assert!(config.validate().is_err());
    }
}
