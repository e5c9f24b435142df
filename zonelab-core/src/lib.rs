//! zonelab-core — supply/demand backtesting engine.
//!
//! The crate contains the heart of the simulator:
//! - Domain types (candles, zones, trades, accounts, instruments)
//! - Zone detection with continuous freshness invalidation
//! - Two strategy variants behind one `Strategy` trait
//!   (zone re-entry, structure break + fibonacci)
//! - Risk sizing, execution simulation (delay + costs), trade lifecycle
//! - The single-pass bar loop and the `RunResult` summary
//!
//! Each backtest run is isolated: it owns its strategy instance, zone memo,
//! and account state, which is what lets the search harness in
//! `zonelab-runner` fan runs out across threads without any shared state.

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod execution;
pub mod indicators;
pub mod registry;
pub mod report;
pub mod risk;
pub mod signals;
pub mod zones;

pub use config::{AtrFilter, ConfigError, SessionFilter, StrategyConfig, StrategyKind};
pub use domain::{
    AccountState, Candle, Direction, ExitReason, Instrument, Trade, TradeState, Zone, ZoneKind,
};
pub use engine::{run, run_with_strategy};
pub use error::BacktestError;
pub use report::RunResult;
pub use signals::{NoTradeReason, Signal, SignalOutcome, Strategy};
pub use zones::detect_zones;
