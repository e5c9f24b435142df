//! zonelab-runner — parameter search orchestration over the core engine.
//!
//! - CSV candle loading at the external feed boundary
//! - Cartesian parameter grids with seeded subsampling
//! - The time-budgeted search harness (sequential or rayon-parallel)
//! - Metric ranking with a minimum-trade floor, plus a dedup leaderboard
//! - TOML search specs and content-addressed run ids

pub mod config;
pub mod data;
pub mod grid;
pub mod leaderboard;
pub mod rank;
pub mod search;

pub use config::{run_id, SearchSpec, SpecError};
pub use data::{load_candles_csv, LoadError};
pub use grid::{subsample, ParamGrid};
pub use leaderboard::{InsertOutcome, Leaderboard};
pub use rank::RankMetric;
pub use search::{search, search_grid, CompletedRun, FailedRun, SearchOptions, SearchOutcome};

use std::path::Path;

use anyhow::Context;

/// Convenience entry point: load a TOML search spec and a CSV candle file,
/// then run the grid search the spec describes.
pub fn run_spec_file(spec_path: &Path, candles_path: &Path) -> anyhow::Result<SearchOutcome> {
    let text = std::fs::read_to_string(spec_path)
        .with_context(|| format!("reading search spec {}", spec_path.display()))?;
    let spec = SearchSpec::from_toml_str(&text)?;
    let candles = load_candles_csv(candles_path)?;
    Ok(search_grid(&candles, &spec.grid, &spec.base, &spec.options()))
}
