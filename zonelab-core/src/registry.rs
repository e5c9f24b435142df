//! Strategy registry — one table from instrument to strategy construction.
//!
//! All pairs run through the same generic detector/strategy code,
//! parameterized per instrument; there is no per-pair strategy type.

use crate::config::{SessionFilter, StrategyConfig, StrategyKind};
use crate::domain::Instrument;
use crate::signals::{Strategy, StructureBreakStrategy, ZoneReentryStrategy};

/// Build the configured strategy variant for a run.
pub fn build_strategy(config: &StrategyConfig, instrument: &Instrument) -> Box<dyn Strategy> {
    match config.kind {
        StrategyKind::ZoneReentry => Box::new(ZoneReentryStrategy::new(
            config.clone(),
            instrument.clone(),
        )),
        StrategyKind::StructureBreak => Box::new(StructureBreakStrategy::new(
            config.clone(),
            instrument.clone(),
        )),
    }
}

/// Tuned per-pair profile. Unknown pairs get the stock defaults.
///
/// The values come from the per-pair tuning runs: EUR/USD's zone parameters,
/// GBP/JPY's shorter bases and wider zones with wick confirmation, and the
/// fixed stop budgets of the remaining pairs expressed as stop bounds.
pub fn profile(instrument: &str) -> StrategyConfig {
    let base = StrategyConfig {
        instrument: instrument.to_string(),
        ..StrategyConfig::default()
    };
    match instrument {
        "EUR/USD" => StrategyConfig {
            zone_lookback: 300,
            base_max_candles: 5,
            move_min_ratio: 2.0,
            max_zone_size_pips: 30.0,
            session: Some(SessionFilter::london_new_york()),
            ..base
        },
        "GBP/JPY" => StrategyConfig {
            base_max_candles: 4,
            move_min_ratio: 1.6,
            max_zone_size_pips: 50.0,
            wick_confirmation: true,
            target_risk_usd: 30.0,
            ..base
        },
        "GBP/USD" => StrategyConfig {
            sl_max_pips: 45.0,
            ..base
        },
        "EUR/GBP" => StrategyConfig {
            sl_max_pips: 30.0,
            ..base
        },
        "EUR/JPY" => StrategyConfig {
            sl_max_pips: 50.0,
            max_zone_size_pips: 40.0,
            ..base
        },
        _ => base,
    }
}
