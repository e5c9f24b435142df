//! Search specification — TOML-loadable description of a whole search — and
//! content-addressed run identification.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use zonelab_core::{ConfigError, StrategyConfig};

use crate::grid::ParamGrid;
use crate::rank::RankMetric;
use crate::search::SearchOptions;

/// Deterministic id for a run configuration.
///
/// Two runs with identical configs hash identically, which is what the
/// leaderboard dedups on.
pub fn run_id(config: &StrategyConfig) -> String {
    let json = serde_json::to_string(config).expect("StrategyConfig serialization failed");
    blake3::hash(json.as_bytes()).to_hex().to_string()
}

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("base config invalid: {0}")]
    Config(#[from] ConfigError),
}

/// A whole search, as read from a TOML document.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSpec {
    pub base: StrategyConfig,
    pub grid: ParamGrid,
    pub time_budget_secs: u64,
    pub metric: RankMetric,
    pub min_trades: usize,
    pub parallel: bool,
    pub max_combinations: Option<usize>,
    pub seed: u64,
}

impl Default for SearchSpec {
    fn default() -> Self {
        Self {
            base: StrategyConfig::default(),
            grid: ParamGrid::default(),
            time_budget_secs: 3_600,
            metric: RankMetric::default(),
            min_trades: 5,
            parallel: true,
            max_combinations: None,
            seed: 42,
        }
    }
}

impl SearchSpec {
    pub fn from_toml_str(text: &str) -> Result<Self, SpecError> {
        let spec: SearchSpec = toml::from_str(text)?;
        spec.base.validate()?;
        Ok(spec)
    }

    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            time_budget: Duration::from_secs(self.time_budget_secs),
            metric: self.metric,
            min_trades: self.min_trades,
            parallel: self.parallel,
            max_combinations: self.max_combinations,
            seed: self.seed,
        }
    }
}
