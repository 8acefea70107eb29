use crate::{Error, Result};
use facetgrid_engine::{CurrencyFormat, DEFAULT_THRESHOLD, GridOptions, SimilarityMatcher};
use facetgrid_types::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "FACETGRID_CONFIG";
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Resolve the config file path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. FACETGRID_CONFIG environment variable (with tilde expansion)
/// 3. XDG config directory
pub fn resolve_config_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        return Ok(config_dir.join("facetgrid").join("config.toml"));
    }

    Err(Error::Config(
        "Could not determine config path: no XDG config directory found".to_string(),
    ))
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub text_field: String,
    pub key_field: String,
    pub threshold: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            text_field: "name".to_string(),
            key_field: "sku".to_string(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl From<&SimilarityConfig> for SimilarityMatcher {
    fn from(config: &SimilarityConfig) -> Self {
        SimilarityMatcher {
            text_field: config.text_field.clone(),
            key_field: config.key_field.clone(),
            threshold: config.threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub page_size: usize,
    pub debounce_ms: u64,
    pub similarity: SimilarityConfig,
    pub currency: CurrencyFormat,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            similarity: SimilarityConfig::default(),
            currency: CurrencyFormat::default(),
        }
    }
}

impl GridConfig {
    /// Load from the resolved path; a missing file yields defaults.
    pub fn load(explicit_path: Option<&str>) -> Result<Self> {
        let path = resolve_config_path(explicit_path)?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: GridConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::Config("page_size must be at least 1".to_string()));
        }
        SimilarityMatcher::from(&self.similarity)
            .validate()
            .map_err(|err| Error::Config(err.to_string()))?;
        Ok(())
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn engine_options(&self) -> GridOptions {
        GridOptions {
            page_size: self.page_size,
            matcher: SimilarityMatcher::from(&self.similarity),
            compute_facet_inline: true,
            currency: self.currency.clone(),
        }
    }
}
