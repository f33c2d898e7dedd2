use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FredProviderConfig {
    pub base_url: String,
    /// Falls back to the FRED_API_KEY environment variable when unset.
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EurostatProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FrankfurterProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub fred: Option<FredProviderConfig>,
    pub eurostat: Option<EurostatProviderConfig>,
    pub frankfurter: Option<FrankfurterProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            fred: Some(FredProviderConfig {
                base_url: "https://api.stlouisfed.org".to_string(),
                api_key: None,
            }),
            eurostat: Some(EurostatProviderConfig {
                base_url: "https://ec.europa.eu".to_string(),
            }),
            frankfurter: Some(FrankfurterProviderConfig {
                base_url: "https://api.frankfurter.dev".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Default target currencies when the flag is omitted.
    #[serde(default = "default_currencies")]
    pub currencies: Vec<String>,
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    /// Overrides the platform cache directory; mainly for tests.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

fn default_currencies() -> Vec<String> {
    ["USD", "EUR", "GBP", "CHF"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_base_currency() -> String {
    "USD".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            currencies: default_currencies(),
            base_currency: default_base_currency(),
            cache_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults if absent.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file found; using defaults");
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_cache_path(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        let proj_dirs = Self::project_dirs()?;
        Ok(proj_dirs.cache_dir().join("store"))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("in", "codito", "realfolio")
            .context("Could not determine project directories")
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// The FRED key from config, or the environment as a fallback.
    pub fn fred_api_key(&self) -> Option<String> {
        self.providers
            .fred
            .as_ref()
            .and_then(|f| f.api_key.clone())
            .or_else(|| std::env::var("FRED_API_KEY").ok())
    }
}
