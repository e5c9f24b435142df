//! Parameter grids — cartesian enumeration with optional seeded subsampling.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use zonelab_core::StrategyConfig;

/// Discrete options per tunable axis. The grid is the cartesian product;
/// combinations that fail config validation are silently skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamGrid {
    pub zone_lookbacks: Vec<usize>,
    pub base_max_candles: Vec<usize>,
    pub move_min_ratios: Vec<f64>,
    pub max_zone_size_pips: Vec<f64>,
    pub rr_ratios: Vec<f64>,
}

impl Default for ParamGrid {
    /// The stock autotuning axes.
    fn default() -> Self {
        Self {
            zone_lookbacks: vec![100, 200, 300],
            base_max_candles: vec![3, 5, 7],
            move_min_ratios: vec![1.5, 2.0, 2.5, 3.0],
            max_zone_size_pips: vec![15.0, 20.0, 25.0, 30.0],
            rr_ratios: vec![2.0],
        }
    }
}

impl ParamGrid {
    /// Upper bound on the number of combinations.
    pub fn size(&self) -> usize {
        self.zone_lookbacks.len()
            * self.base_max_candles.len()
            * self.move_min_ratios.len()
            * self.max_zone_size_pips.len()
            * self.rr_ratios.len()
    }

    /// All valid configurations, each derived from `base`.
    pub fn generate(&self, base: &StrategyConfig) -> Vec<StrategyConfig> {
        let mut configs = Vec::with_capacity(self.size());
        for &zone_lookback in &self.zone_lookbacks {
            for &base_max in &self.base_max_candles {
                for &move_min_ratio in &self.move_min_ratios {
                    for &max_zone in &self.max_zone_size_pips {
                        for &rr_ratio in &self.rr_ratios {
                            let config = StrategyConfig {
                                zone_lookback,
                                base_max_candles: base_max,
                                move_min_ratio,
                                max_zone_size_pips: max_zone,
                                rr_ratio,
                                ..base.clone()
                            };
                            if config.validate().is_ok() {
                                configs.push(config);
                            }
                        }
                    }
                }
            }
        }
        configs
    }
}

/// Keep at most `max` configurations, chosen under a fixed seed so a search
/// is reproducible.
pub fn subsample(mut configs: Vec<StrategyConfig>, max: usize, seed: u64) -> Vec<StrategyConfig> {
    if configs.len() <= max {
        return configs;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    configs.partial_shuffle(&mut rng, max);
    configs.truncate(max);
    configs
}
