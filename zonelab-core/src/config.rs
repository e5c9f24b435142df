//! Strategy configuration — a named, immutable parameter set validated at
//! construction. Invalid values are rejected before any simulation starts.

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name} bounds inverted: min {min} must be below max {max}")]
    InvertedBounds {
        name: &'static str,
        min: f64,
        max: f64,
    },
    #[error("instrument name is empty")]
    EmptyInstrument,
    #[error("zone_lookback {lookback} must exceed base_max_candles {base}")]
    LookbackTooShort { lookback: usize, base: usize },
    #[error("fibonacci band [{min}, {max}] must satisfy 0 < min < max < 1")]
    FibBand { min: f64, max: f64 },
    #[error("{name} must be at least 1")]
    ZeroCount { name: &'static str },
    #[error("{name} must lie in (0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f64 },
    #[error("session hour {0} is out of range (0..=23)")]
    SessionHour(u8),
}

/// Which strategy variant the engine should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Enter when price returns into a fresh supply/demand zone.
    ZoneReentry,
    /// Structure break + fibonacci retracement + confirmation candle.
    StructureBreak,
}

/// UTC trading-session windows. A timestamp passes if its hour falls in any
/// `[start, end)` range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFilter {
    pub hours_utc: Vec<(u8, u8)>,
}

impl SessionFilter {
    /// London/NY core hours, the original system's default window.
    pub fn london_new_york() -> Self {
        Self {
            hours_utc: vec![(7, 21)],
        }
    }

    pub fn contains(&self, ts: chrono::DateTime<chrono::Utc>) -> bool {
        let hour = ts.hour() as u8;
        self.hours_utc
            .iter()
            .any(|&(start, end)| hour >= start && hour < end)
    }
}

/// Volatility floor: reject signals when ATR (in pips) is below `min_pips`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtrFilter {
    pub period: usize,
    pub min_pips: f64,
}

/// All tunable parameters of one backtest run.
///
/// Construction is cheap; call [`StrategyConfig::validate`] before use — the
/// engine and the pure detection entry point both do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub instrument: String,
    pub kind: StrategyKind,
    pub initial_balance: f64,
    /// Minimum candle count before the first decision point.
    pub min_bars: usize,

    // ── Zone detection ──
    pub zone_lookback: usize,
    pub base_max_candles: usize,
    pub move_min_ratio: f64,
    pub min_zone_size_pips: f64,
    pub max_zone_size_pips: f64,

    // ── Stops and targets ──
    pub stop_buffer_pips: f64,
    pub sl_min_pips: f64,
    pub sl_max_pips: f64,
    pub rr_ratio: f64,

    // ── Position sizing ──
    pub target_risk_usd: f64,
    pub min_lot: f64,
    pub max_lot: f64,

    // ── Entry filters ──
    pub session: Option<SessionFilter>,
    pub atr_floor: Option<AtrFilter>,
    /// Require a rejection wick on the signal candle (zone re-entry only).
    pub wick_confirmation: bool,

    // ── Structure break ──
    pub swing_window: usize,
    pub min_structure_move_pips: f64,
    pub fib_min: f64,
    pub fib_max: f64,
    /// Also require price inside the located base zone, not just the fib band.
    pub require_zone_bounds: bool,
    pub wick_min_ratio: f64,
    pub body_min_pct: f64,

    // ── Execution ──
    /// Evaluate the strategy every Nth bar (1 = every bar).
    pub decision_cadence_bars: usize,
    pub execution_delay_bars: usize,
    pub spread_pips: f64,
    pub slippage_pips: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            instrument: "EUR/USD".into(),
            kind: StrategyKind::ZoneReentry,
            initial_balance: 1_000.0,
            min_bars: 250,
            zone_lookback: 300,
            base_max_candles: 5,
            move_min_ratio: 2.0,
            min_zone_size_pips: 1.0,
            max_zone_size_pips: 30.0,
            stop_buffer_pips: 2.0,
            sl_min_pips: 5.0,
            sl_max_pips: 65.0,
            rr_ratio: 2.0,
            target_risk_usd: 50.0,
            min_lot: 0.01,
            max_lot: 2.0,
            session: None,
            atr_floor: None,
            wick_confirmation: false,
            swing_window: 5,
            min_structure_move_pips: 10.0,
            fib_min: 0.382,
            fib_max: 0.618,
            require_zone_bounds: false,
            wick_min_ratio: 0.5,
            body_min_pct: 0.1,
            decision_cadence_bars: 1,
            execution_delay_bars: 2,
            spread_pips: 0.0,
            slippage_pips: 0.0,
        }
    }
}

impl StrategyConfig {
    /// Validate every parameter; called by the engine before a run starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instrument.is_empty() {
            return Err(ConfigError::EmptyInstrument);
        }
        Self::positive("initial_balance", self.initial_balance)?;
        Self::positive("move_min_ratio", self.move_min_ratio)?;
        Self::positive("rr_ratio", self.rr_ratio)?;
        Self::positive("target_risk_usd", self.target_risk_usd)?;
        Self::positive("min_lot", self.min_lot)?;
        Self::positive("sl_min_pips", self.sl_min_pips)?;
        Self::positive("min_structure_move_pips", self.min_structure_move_pips)?;
        if self.min_zone_size_pips < 0.0 {
            return Err(ConfigError::NonPositive {
                name: "min_zone_size_pips",
                value: self.min_zone_size_pips,
            });
        }
        if self.stop_buffer_pips < 0.0 {
            return Err(ConfigError::NonPositive {
                name: "stop_buffer_pips",
                value: self.stop_buffer_pips,
            });
        }
        if self.spread_pips < 0.0 {
            return Err(ConfigError::NonPositive {
                name: "spread_pips",
                value: self.spread_pips,
            });
        }
        if self.slippage_pips < 0.0 {
            return Err(ConfigError::NonPositive {
                name: "slippage_pips",
                value: self.slippage_pips,
            });
        }
        if self.min_zone_size_pips >= self.max_zone_size_pips {
            return Err(ConfigError::InvertedBounds {
                name: "zone_size_pips",
                min: self.min_zone_size_pips,
                max: self.max_zone_size_pips,
            });
        }
        if self.sl_min_pips >= self.sl_max_pips {
            return Err(ConfigError::InvertedBounds {
                name: "sl_pips",
                min: self.sl_min_pips,
                max: self.sl_max_pips,
            });
        }
        if self.min_lot > self.max_lot {
            return Err(ConfigError::InvertedBounds {
                name: "lot",
                min: self.min_lot,
                max: self.max_lot,
            });
        }
        if self.base_max_candles == 0 {
            return Err(ConfigError::ZeroCount {
                name: "base_max_candles",
            });
        }
        if self.min_bars == 0 {
            return Err(ConfigError::ZeroCount { name: "min_bars" });
        }
        if self.swing_window == 0 {
            return Err(ConfigError::ZeroCount {
                name: "swing_window",
            });
        }
        if self.decision_cadence_bars == 0 {
            return Err(ConfigError::ZeroCount {
                name: "decision_cadence_bars",
            });
        }
        if self.zone_lookback <= self.base_max_candles {
            return Err(ConfigError::LookbackTooShort {
                lookback: self.zone_lookback,
                base: self.base_max_candles,
            });
        }
        if !(self.fib_min > 0.0 && self.fib_min < self.fib_max && self.fib_max < 1.0) {
            return Err(ConfigError::FibBand {
                min: self.fib_min,
                max: self.fib_max,
            });
        }
        if !(self.wick_min_ratio > 0.0 && self.wick_min_ratio <= 1.0) {
            return Err(ConfigError::OutOfUnitRange {
                name: "wick_min_ratio",
                value: self.wick_min_ratio,
            });
        }
        if self.body_min_pct < 0.0 || self.body_min_pct >= 1.0 {
            return Err(ConfigError::OutOfUnitRange {
                name: "body_min_pct",
                value: self.body_min_pct,
            });
        }
        if let Some(session) = &self.session {
            for &(start, end) in &session.hours_utc {
                if start > 23 || end > 24 {
                    return Err(ConfigError::SessionHour(start.max(end)));
                }
            }
        }
        if let Some(atr) = &self.atr_floor {
            if atr.period == 0 {
                return Err(ConfigError::ZeroCount { name: "atr.period" });
            }
            Self::positive("atr.min_pips", atr.min_pips)?;
        }
        Ok(())
    }

    fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
        if value > 0.0 && value.is_finite() {
            Ok(())
        } else {
            Err(ConfigError::NonPositive { name, value })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(StrategyConfig::default().validate(), Ok(()));
    }

    #[test]
    fn negative_ratio_is_rejected() {
        let cfg = StrategyConfig {
            move_min_ratio: -1.0,
            ..StrategyConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonPositive {
                name: "move_min_ratio",
                ..
            })
        ));
    }

    #[test]
    fn inverted_zone_bounds_are_rejected() {
        let cfg = StrategyConfig {
            min_zone_size_pips: 40.0,
            max_zone_size_pips: 30.0,
            ..StrategyConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvertedBounds {
                name: "zone_size_pips",
                ..
            })
        ));
    }

    #[test]
    fn fib_band_must_sit_inside_unit_interval() {
        let cfg = StrategyConfig {
            fib_min: 0.618,
            fib_max: 0.382,
            ..StrategyConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::FibBand { .. })));
    }

    #[test]
    fn lookback_must_exceed_base() {
        let cfg = StrategyConfig {
            zone_lookback: 5,
            base_max_candles: 5,
            ..StrategyConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::LookbackTooShort { .. })
        ));
    }

    #[test]
    fn session_filter_checks_hour_ranges() {
        let session = SessionFilter::london_new_york();
        let inside = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 12, 30, 0).unwrap();
        let outside = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 23, 0, 0).unwrap();
        assert!(session.contains(inside));
        assert!(!session.contains(outside));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let partial: StrategyConfig =
            toml::from_str("instrument = \"GBP/JPY\"\nzone_lookback = 200\n").unwrap();
        assert_eq!(partial.instrument, "GBP/JPY");
        assert_eq!(partial.zone_lookback, 200);
        assert_eq!(
            partial.base_max_candles,
            StrategyConfig::default().base_max_candles
        );
    }
}
