//! The parameter search harness.
//!
//! Drives many isolated backtest runs over a list (or grid) of
//! configurations under a wall-clock budget. The budget is checked before
//! starting each configuration — an in-flight run is never interrupted — and
//! everything computed before the deadline is kept. Runs share no mutable
//! state: each gets a fresh strategy, zone memo, and account.

use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info};

use zonelab_core::{BacktestError, Candle, RunResult, StrategyConfig};

use crate::config::run_id;
use crate::grid::{subsample, ParamGrid};
use crate::rank::RankMetric;

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub time_budget: Duration,
    pub metric: RankMetric,
    /// Runs with fewer trades are excluded from the ranking so near-zero
    /// samples cannot win on a fluke.
    pub min_trades: usize,
    pub parallel: bool,
    /// Seeded random subsample cap on the configuration list.
    pub max_combinations: Option<usize>,
    pub seed: u64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(3_600),
            metric: RankMetric::default(),
            min_trades: 5,
            parallel: true,
            max_combinations: None,
            seed: 42,
        }
    }
}

/// A run that completed (possibly with zero trades).
#[derive(Debug, Clone)]
pub struct CompletedRun {
    pub run_id: String,
    pub config: StrategyConfig,
    pub result: RunResult,
    pub score: f64,
}

/// A run that aborted with a typed error — distinct from a zero-trade run.
#[derive(Debug)]
pub struct FailedRun {
    pub run_id: String,
    pub config: StrategyConfig,
    pub error: BacktestError,
}

#[derive(Debug, Default)]
pub struct SearchOutcome {
    /// Completed runs above the trade floor, best score first.
    pub ranked: Vec<CompletedRun>,
    /// Completed runs excluded from the ranking (too few trades or a
    /// non-finite score).
    pub below_floor: Vec<CompletedRun>,
    pub failed: Vec<FailedRun>,
    pub evaluated: usize,
    /// Configurations never started because the budget ran out.
    pub skipped: usize,
    pub elapsed: Duration,
}

/// Search an explicit configuration list.
pub fn search(candles: &[Candle], configs: Vec<StrategyConfig>, opts: &SearchOptions) -> SearchOutcome {
    let start = Instant::now();
    let deadline = start + opts.time_budget;

    let configs = match opts.max_combinations {
        Some(max) => subsample(configs, max, opts.seed),
        None => configs,
    };
    let total = configs.len();
    info!(total, parallel = opts.parallel, budget_secs = opts.time_budget.as_secs(), "search start");

    type RunAttempt = Option<(StrategyConfig, Result<RunResult, BacktestError>)>;
    let attempt = |config: StrategyConfig| -> RunAttempt {
        // Budget gate: checked before starting, never mid-run.
        if Instant::now() >= deadline {
            return None;
        }
        let outcome = zonelab_core::run(candles, &config);
        Some((config, outcome))
    };

    let attempts: Vec<RunAttempt> = if opts.parallel {
        configs.into_par_iter().map(attempt).collect()
    } else {
        configs.into_iter().map(attempt).collect()
    };

    let mut outcome = SearchOutcome::default();
    for item in attempts {
        match item {
            None => outcome.skipped += 1,
            Some((config, Ok(result))) => {
                outcome.evaluated += 1;
                let score = opts.metric.extract(&result);
                let run = CompletedRun {
                    run_id: run_id(&config),
                    config,
                    result,
                    score,
                };
                if run.result.total_trades >= opts.min_trades && score.is_finite() {
                    outcome.ranked.push(run);
                } else {
                    outcome.below_floor.push(run);
                }
            }
            Some((config, Err(error))) => {
                outcome.evaluated += 1;
                debug!(%error, "run failed");
                outcome.failed.push(FailedRun {
                    run_id: run_id(&config),
                    config,
                    error,
                });
            }
        }
    }

    outcome.ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    outcome.elapsed = start.elapsed();
    info!(
        ranked = outcome.ranked.len(),
        below_floor = outcome.below_floor.len(),
        failed = outcome.failed.len(),
        skipped = outcome.skipped,
        elapsed_ms = outcome.elapsed.as_millis() as u64,
        "search complete"
    );
    outcome
}

/// Search the cartesian grid derived from `base`.
pub fn search_grid(
    candles: &[Candle],
    grid: &ParamGrid,
    base: &StrategyConfig,
    opts: &SearchOptions,
) -> SearchOutcome {
    search(candles, grid.generate(base), opts)
}
