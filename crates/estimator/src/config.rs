//! Estimator service configuration

use anyhow::{Context, Result};
use estimator_lib::UnknownCategoryPolicy;
use serde::Deserialize;
use std::path::PathBuf;

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EstimatorConfig {
    /// API server port for estimation, health, and metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Directory holding the trained artifacts
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// Policy for categorical values outside the trained vocabulary
    #[serde(default)]
    pub unknown_category_policy: UnknownCategoryPolicy,
}

fn default_api_port() -> u16 {
    8080
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

impl EstimatorConfig {
    /// Load configuration from `ESTIMATOR_`-prefixed environment variables,
    /// falling back to defaults for anything unset.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("ESTIMATOR").try_parsing(true))
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration value")
    }
}
