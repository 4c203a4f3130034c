//! Configuration types for the feed host.
//!
//! Every section uses `#[serde(default)]` so a partial TOML file only
//! overrides the fields it names.

use std::path::PathBuf;
use std::time::Duration;

use feedweave_rank::ScoringWeights;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::error::FeedError;
use crate::orchestrator::MAX_BUDGET_SECONDS;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Fan-out defaults and cancellation drain.
    pub orchestrator: OrchestratorConfig,
    /// Resource isolation pool limits.
    pub pool: PoolConfig,
    /// Weights and selection size for located candidates.
    pub ranking: RankingConfig,
    /// Host binary settings.
    pub host: HostConfig,
}

/// Orchestrator defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Result-size limit used when a request does not name one.
    pub default_limit: usize,
    /// Wall-clock budget in seconds used when a request does not name one.
    pub default_budget_seconds: f64,
    /// How long cancelled invocations get to unwind before they are aborted.
    pub drain_grace_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            default_budget_seconds: 30.0,
            drain_grace_ms: 1_000,
        }
    }
}

impl OrchestratorConfig {
    /// Drain grace as a [`Duration`].
    pub fn drain_grace(&self) -> Duration {
        Duration::from_millis(self.drain_grace_ms)
    }
}

/// Resource pool limits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of handles checked out at once (None = unbounded).
    pub max_handles: Option<usize>,
    /// Give up acquiring after this many milliseconds (None = wait until cancelled).
    pub acquire_timeout_ms: Option<u64>,
}

/// Ranking settings for located candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Scoring weights.
    #[serde(flatten)]
    pub weights: ScoringWeights,
    /// How many nearest candidates are considered before scoring.
    pub nearest_k: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            nearest_k: 10,
        }
    }
}

/// Host binary settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Log filter used when `RUST_LOG` is not set.
    pub log_level: String,
    /// JSON file of located price quotes served by the nearby-quotes generator.
    pub catalog_path: Option<PathBuf>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            catalog_path: None,
        }
    }
}

impl FeedConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| FeedError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| FeedError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/feedweave/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("feedweave").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("feedweave")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/feedweave-config/config.toml")
        }
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `default_budget_seconds` must be finite, greater than 0 and at most one day
    /// - `drain_grace_ms` must be greater than 0
    /// - `max_handles`, when set, must be greater than 0 and fit a semaphore
    /// - scoring weights must be finite and non-negative
    pub fn validate(&self) -> Result<(), FeedError> {
        let budget = self.orchestrator.default_budget_seconds;
        if !budget.is_finite() || budget <= 0.0 {
            return Err(FeedError::Config(
                "default_budget_seconds must be a positive number".into(),
            ));
        }
        if budget > MAX_BUDGET_SECONDS {
            return Err(FeedError::Config(format!(
                "default_budget_seconds must be at most {MAX_BUDGET_SECONDS}"
            )));
        }
        if self.orchestrator.drain_grace_ms == 0 {
            return Err(FeedError::Config("drain_grace_ms must be greater than 0".into()));
        }
        if let Some(max_handles) = self.pool.max_handles {
            if max_handles == 0 {
                return Err(FeedError::Config("max_handles must be greater than 0".into()));
            }
            if max_handles > Semaphore::MAX_PERMITS {
                return Err(FeedError::Config(format!(
                    "max_handles must be at most {}",
                    Semaphore::MAX_PERMITS
                )));
            }
        }
        self.ranking
            .weights
            .validate()
            .map_err(|e| FeedError::Config(e.to_string()))?;
        Ok(())
    }
}
