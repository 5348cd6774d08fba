//! Layered application configuration.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Defaults in code
//! 2. `heatcast.toml` in the working directory, or the file given with `--config`
//! 3. Environment variables with the `HEATCAST__` prefix, `__` between keys
//!    (e.g. `HEATCAST__SOURCE__API_KEY`)

use config::{ConfigError, Environment, File, Map};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::Result;
use crate::models::Location;
use crate::utils::constants::{
    CONFIG_FILE, DEFAULT_HOLDOUT_DAYS, DEFAULT_HORIZON, DEFAULT_LOCATIONS, DEFAULT_MODEL_DIR,
    DEFAULT_SOURCE_BASE_URL, DEFAULT_STORE_FILE, DEFAULT_UNIT_GROUP, ENV_PREFIX,
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AppConfig {
    pub store: StoreConfig,

    pub models: ModelsConfig,

    #[validate(nested)]
    pub source: SourceConfig,

    #[validate(nested)]
    pub forecast: ForecastConfig,

    /// Upper bound on concurrent fetches and forecasting threads.
    #[validate(range(min = 1))]
    pub workers: usize,

    #[serde(default = "default_locations")]
    #[validate(length(min = 1), nested)]
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// CSV file holding the observation history.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Directory containing `{target}_model.json` artifacts.
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SourceConfig {
    #[validate(url)]
    pub base_url: String,

    pub api_key: Option<String>,

    #[validate(length(min = 1))]
    pub unit_group: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForecastConfig {
    #[validate(range(min = 1))]
    pub horizon: usize,

    #[validate(range(min = 1))]
    pub holdout_days: i64,
}

fn default_locations() -> Vec<Location> {
    DEFAULT_LOCATIONS
        .iter()
        .map(|(name, latitude, longitude)| Location::new(*name, *latitude, *longitude))
        .collect()
}

impl AppConfig {
    /// Load and validate. An explicit `path` must exist; the default
    /// `heatcast.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like `load`, but reads environment overrides from `env` instead of
    /// the process environment when given.
    pub fn load_with_env(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(CONFIG_FILE).required(false),
        };

        let settings = config::Config::builder()
            .set_default("store.path", DEFAULT_STORE_FILE)?
            .set_default("models.dir", DEFAULT_MODEL_DIR)?
            .set_default("source.base_url", DEFAULT_SOURCE_BASE_URL)?
            .set_default("source.unit_group", DEFAULT_UNIT_GROUP)?
            .set_default("forecast.horizon", DEFAULT_HORIZON as i64)?
            .set_default("forecast.holdout_days", DEFAULT_HOLDOUT_DAYS)?
            .set_default("workers", num_cpus::get() as i64)?
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// The weather source key. Only commands that call the source need it.
    pub fn api_key(&self) -> Result<&str> {
        match self.source.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::NotFound(format!(
                "source.api_key (set {}__SOURCE__API_KEY)",
                ENV_PREFIX
            ))
            .into()),
        }
    }
}
