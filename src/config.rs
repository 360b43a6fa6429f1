//! Environment-driven configuration
//!
//! Values come from the process environment (after `.env` is loaded by the
//! binaries). Every setting has a default so a bare checkout can start.

use crate::error::ScreenerError;
use crate::Result;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_FOREST_TREES: usize = 150;
pub const DEFAULT_FOREST_SEED: u64 = 42;
pub const DEFAULT_TRANSLATION_TIMEOUT_SECS: u64 = 10;

/// Paths of the persisted model and its training fallback
#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub bundle: PathBuf,
    pub symptom_list: PathBuf,
    pub training_data: PathBuf,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            bundle: PathBuf::from("model.json"),
            symptom_list: PathBuf::from("symptom_list.json"),
            training_data: PathBuf::from("./Training.csv"),
        }
    }
}

/// Ensemble training parameters, used only when no bundle exists
#[derive(Debug, Clone, Copy)]
pub struct TrainingConfig {
    pub n_trees: usize,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_FOREST_TREES,
            seed: DEFAULT_FOREST_SEED,
        }
    }
}

/// Translation service settings
#[derive(Debug, Clone)]
pub struct TranslationConfig {
    /// Base URL of a LibreTranslate-compatible endpoint; `None` disables translation
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TRANSLATION_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScreenerConfig {
    pub port: u16,
    pub model: ModelPaths,
    pub training: TrainingConfig,
    pub cache_capacity: usize,
    pub sweep_interval: Duration,
    pub translation: TranslationConfig,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            model: ModelPaths::default(),
            training: TrainingConfig::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            translation: TranslationConfig::default(),
        }
    }
}

impl ScreenerConfig {
    /// Build the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT").or_else(|| lookup("API_PORT")) {
            Some(raw) => parse_value("PORT", &raw)?,
            None => defaults.port,
        };

        let model = ModelPaths {
            bundle: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model.bundle),
            symptom_list: lookup("SYMPTOM_LIST_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model.symptom_list),
            training_data: lookup("TRAINING_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model.training_data),
        };

        let training = TrainingConfig {
            n_trees: parse_or(&lookup, "FOREST_TREES", defaults.training.n_trees)?,
            seed: parse_or(&lookup, "FOREST_SEED", defaults.training.seed)?,
        };
        if training.n_trees == 0 {
            return Err(ScreenerError::ConfigError(
                "FOREST_TREES must be at least 1".to_string(),
            ));
        }

        let cache_capacity = parse_or(&lookup, "CACHE_CAPACITY", defaults.cache_capacity)?;
        let sweep_secs: u64 = parse_or(
            &lookup,
            "CACHE_SWEEP_INTERVAL_SECS",
            DEFAULT_SWEEP_INTERVAL_SECS,
        )?;
        if sweep_secs == 0 {
            return Err(ScreenerError::ConfigError(
                "CACHE_SWEEP_INTERVAL_SECS must be at least 1".to_string(),
            ));
        }

        let translation = TranslationConfig {
            api_url: lookup("TRANSLATION_API_URL")
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            api_key: lookup("TRANSLATION_API_KEY").filter(|key| !key.trim().is_empty()),
            timeout: Duration::from_secs(parse_or(
                &lookup,
                "TRANSLATION_TIMEOUT_SECS",
                DEFAULT_TRANSLATION_TIMEOUT_SECS,
            )?),
        };

        Ok(Self {
            port,
            model,
            training,
            cache_capacity,
            sweep_interval: Duration::from_secs(sweep_secs),
            translation,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        ScreenerError::ConfigError(format!("{} has invalid value '{}'", key, raw))
    })
}
