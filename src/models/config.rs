//! Configuration module for the Rugscope engine
//!
//! Uses defaults from utils/constants.rs, overridable via environment.
//! Invalid values fall back to defaults with a warning instead of aborting.

use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_MAX_BATCH, DEFAULT_MODEL_SEED, DEFAULT_PORT,
    DEFAULT_PROVIDER_TIMEOUT_MS, DEFAULT_TRAINING_SAMPLES, DEFAULT_TREE_COUNT,
};

/// Engine + server configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bind host for the API server
    pub host: String,
    /// Bind port for the API server
    pub port: u16,
    /// Timeout applied to each adapter call
    pub provider_timeout: Duration,
    /// Seed for synthetic training data and bootstrap sampling
    pub model_seed: u64,
    /// Seed for missing-data estimators (None = entropy)
    pub estimator_seed: Option<u64>,
    /// Analysis cache TTL
    pub cache_ttl_secs: u64,
    /// Maximum tokens per batch request
    pub max_batch: usize,
    /// Synthetic training population size
    pub training_samples: usize,
    /// Number of trees in the ensemble
    pub tree_count: usize,
}

/// Read and parse an env var, warning on garbage
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!("⚠️ Invalid value for {}: {:?}, using default", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        // PORT wins over RUGSCOPE_PORT (PaaS convention)
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(|| env_or("RUGSCOPE_PORT", DEFAULT_PORT));

        let estimator_seed = std::env::var("RUGSCOPE_ESTIMATOR_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok());

        Self {
            host: std::env::var("RUGSCOPE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            provider_timeout: Duration::from_millis(env_or(
                "RUGSCOPE_PROVIDER_TIMEOUT_MS",
                DEFAULT_PROVIDER_TIMEOUT_MS,
            )),
            model_seed: env_or("RUGSCOPE_MODEL_SEED", DEFAULT_MODEL_SEED),
            estimator_seed,
            cache_ttl_secs: env_or("RUGSCOPE_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS),
            max_batch: env_or("RUGSCOPE_MAX_BATCH", DEFAULT_MAX_BATCH),
            training_samples: env_or("RUGSCOPE_TRAINING_SAMPLES", DEFAULT_TRAINING_SAMPLES),
            tree_count: env_or("RUGSCOPE_TREES", DEFAULT_TREE_COUNT),
        }
    }
}

impl EngineConfig {
    /// Deterministic config for tests and reproducible runs
    pub fn seeded(model_seed: u64, estimator_seed: u64) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            provider_timeout: Duration::from_millis(DEFAULT_PROVIDER_TIMEOUT_MS),
            model_seed,
            estimator_seed: Some(estimator_seed),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            max_batch: DEFAULT_MAX_BATCH,
            training_samples: DEFAULT_TRAINING_SAMPLES,
            tree_count: DEFAULT_TREE_COUNT,
        }
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> AppResult<()> {
        if self.tree_count == 0 {
            return Err(AppError::invalid_config("tree_count must be > 0"));
        }
        if self.training_samples == 0 {
            return Err(AppError::invalid_config("training_samples must be > 0"));
        }
        if self.provider_timeout.is_zero() {
            return Err(AppError::invalid_config("provider_timeout must be > 0"));
        }
        if self.max_batch == 0 {
            return Err(AppError::invalid_config("max_batch must be > 0"));
        }
        Ok(())
    }

    /// Socket address string for the API server
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Log the effective configuration
    pub fn log_summary(&self) {
        info!(
            "⚙️ Config: trees={} samples={} timeout={}ms cache_ttl={}s max_batch={} estimator_seed={}",
            self.tree_count,
            self.training_samples,
            self.provider_timeout.as_millis(),
            self.cache_ttl_secs,
            self.max_batch,
            self.estimator_seed
                .map(|s| s.to_string())
                .unwrap_or_else(|| "entropy".to_string()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_config_is_valid() {
        let config = EngineConfig::seeded(1, 2);
        assert!(config.validate().is_ok());
        assert_eq!(config.estimator_seed, Some(2));
        assert_eq!(config.tree_count, 15);
    }

    #[test]
    fn test_validate_rejects_zero_trees() {
        let mut config = EngineConfig::seeded(1, 2);
        config.tree_count = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.code_str(), "CFG_INVALID_VALUE");
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = EngineConfig::seeded(1, 2);
        config.provider_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_addr() {
        let config = EngineConfig::seeded(1, 2);
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }
}
