//! Run-level error taxonomy.
//!
//! Only two classes of failure abort a run: not enough data for the
//! configured lookback, and an invalid configuration. Everything that can go
//! wrong on a single bar is downgraded to "no signal for this bar" inside the
//! engine loop, and a completed run with zero trades is a valid result.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("insufficient data: need at least {required} bars, got {actual}")]
    DataInsufficient { required: usize, actual: usize },
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
