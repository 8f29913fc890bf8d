//! Application Configuration

use config::{Config, Environment, File, Map};
use fairness::{FairnessConfig, FairnessError, MeetsThreshold};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error(transparent)]
    Fairness(#[from] FairnessError),
}

/// Settings for a FairLens session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Pipe-delimited lexicon file
    pub rules_path: PathBuf,
    /// Version string shown in the privacy statement
    pub rules_version: String,
    /// Default meets/exceeds threshold
    pub threshold: f64,
    pub gap_alert: f64,
    pub air_alert: f64,
    pub min_group_size: usize,
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let fairness = FairnessConfig::default();
        Self {
            rules_path: PathBuf::from("bias_rules.csv"),
            rules_version: "v1.1-lexicon-30".to_string(),
            threshold: MeetsThreshold::default().value(),
            gap_alert: fairness.gap_alert,
            air_alert: fairness.air_alert,
            min_group_size: fairness.min_group_size,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Layer defaults, then `path` (or an optional `fairlens.toml`), then
    /// `FAIRLENS_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, AppConfigError> {
        Self::load_layers(path, None)
    }

    /// `env` replaces the process environment when given
    fn load_layers(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self, AppConfigError> {
        let defaults = Self::default();

        let builder = Config::builder()
            .set_default("rules_path", defaults.rules_path.to_string_lossy().to_string())?
            .set_default("rules_version", defaults.rules_version)?
            .set_default("threshold", defaults.threshold)?
            .set_default("gap_alert", defaults.gap_alert)?
            .set_default("air_alert", defaults.air_alert)?
            .set_default("min_group_size", defaults.min_group_size as i64)?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_json", defaults.log_json)?;

        let builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("fairlens").required(false)),
        };

        let config: Self = builder
            .add_source(Environment::with_prefix("FAIRLENS").source(env))
            .build()?
            .try_deserialize()?;

        config.meets_threshold()?;
        Ok(config)
    }

    /// Policy thresholds for the fairness calculator
    pub fn fairness(&self) -> FairnessConfig {
        FairnessConfig {
            gap_alert: self.gap_alert,
            air_alert: self.air_alert,
            min_group_size: self.min_group_size,
        }
    }

    pub fn meets_threshold(&self) -> Result<MeetsThreshold, FairnessError> {
        MeetsThreshold::new(self.threshold)
    }
}
