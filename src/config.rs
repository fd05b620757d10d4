// Copyright 2026 QSP Models Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management for QSP training.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. qsp.yaml file
//! 3. Environment variables (QSP_*)
//! 4. CLI arguments

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{Error, Result};
use crate::qsp::model::{construct_qsp_model, FitOptions, QspModel};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Circuit shape
    #[serde(default)]
    pub model: ModelConfig,

    /// Optimizer, loss and minibatch settings
    #[serde(default)]
    pub training: TrainingConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = config_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                config = serde_yaml::from_str(&content)?;
            }
        } else {
            for path in &["qsp.yaml", "qsp.yml"] {
                let path = Path::new(path);
                if path.exists() {
                    let content = std::fs::read_to_string(path)?;
                    config = serde_yaml::from_str(&content)?;
                    break;
                }
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| env::var(key).ok());
    }

    /// Apply `QSP_*` overrides from an arbitrary key lookup.
    ///
    /// Unparseable values are ignored.
    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(deg) = lookup("QSP_POLY_DEG").and_then(|v| v.parse().ok()) {
            self.model.poly_deg = deg;
        }
        if let Some(convention) = lookup("QSP_CONVENTION").and_then(|v| v.parse().ok()) {
            self.model.convention = convention;
        }
        if let Some(lr) = lookup("QSP_LEARNING_RATE").and_then(|v| v.parse().ok()) {
            self.training.learning_rate = lr;
        }
        if let Some(epochs) = lookup("QSP_EPOCHS").and_then(|v| v.parse().ok()) {
            self.training.epochs = epochs;
        }
        if let Some(batch_size) = lookup("QSP_BATCH_SIZE").and_then(|v| v.parse().ok()) {
            self.training.batch_size = batch_size;
        }
        if let Some(seed) = lookup("QSP_SEED").and_then(|v| v.parse().ok()) {
            self.training.seed = Some(seed);
        }
        if let Some(level) = lookup("QSP_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if !(0..=1).contains(&self.model.convention) {
            return Err(Error::Config(format!(
                "convention must be 0 or 1, got {}",
                self.model.convention
            )));
        }
        if !self.training.learning_rate.is_finite() || self.training.learning_rate <= 0.0 {
            return Err(Error::Config("learning_rate must be > 0".into()));
        }
        if self.training.epochs == 0 {
            return Err(Error::Config("epochs cannot be 0".into()));
        }
        if self.training.batch_size == 0 {
            return Err(Error::Config("batch_size cannot be 0".into()));
        }
        if !(0..=1).contains(&self.training.loss.mean_or_max) {
            return Err(Error::Config("loss.mean_or_max must be 0 or 1".into()));
        }
        if !(0..=1).contains(&self.training.loss.squared) {
            return Err(Error::Config("loss.squared must be 0 or 1".into()));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(Error::Config(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }

    /// Construct a freshly initialized model from these settings.
    pub fn build_model(&self) -> Result<QspModel> {
        construct_qsp_model(
            self.model.poly_deg as i64,
            self.model.convention,
            self.training.learning_rate,
            self.training.loss.mean_or_max,
            self.training.loss.squared,
            self.training.seed,
        )
    }

    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            epochs: self.training.epochs,
            batch_size: self.training.batch_size,
            shuffle: self.training.shuffle,
        }
    }
}

/// Circuit shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Degree of the target polynomial
    #[serde(default)]
    pub poly_deg: usize,

    /// Readout convention (0: |0><0|, 1: |+><+|)
    #[serde(default)]
    pub convention: i64,
}

/// Training configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Adam step size
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Loss selection
    #[serde(default)]
    pub loss: LossConfig,

    /// Passes over the sample set
    #[serde(default = "default_epochs")]
    pub epochs: usize,

    /// Examples per optimizer step
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Reshuffle samples every epoch
    #[serde(default = "default_true")]
    pub shuffle: bool,

    /// RNG seed for phase initialization and shuffling
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            loss: LossConfig::default(),
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            shuffle: true,
            seed: None,
        }
    }
}

/// Loss flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LossConfig {
    /// 0 for mean over the batch, 1 for max
    #[serde(default)]
    pub mean_or_max: i64,

    /// 0 for |r|, 1 for |r|²
    #[serde(default = "default_squared")]
    pub squared: i64,
}

impl Default for LossConfig {
    fn default() -> Self {
        Self {
            mean_or_max: 0,
            squared: default_squared(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_learning_rate() -> f64 {
    0.01
}

fn default_epochs() -> usize {
    200
}

fn default_batch_size() -> usize {
    32
}

fn default_squared() -> i64 {
    1
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}
