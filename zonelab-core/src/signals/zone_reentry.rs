//! Zone re-entry strategy: trade the first return into a fresh zone.
//!
//! On each new bar the zone cache is refreshed (memoized by bar index). If
//! the current close sits inside a fresh zone, the strategy buys demand /
//! sells supply with the stop just beyond the zone boundary and the target at
//! `risk × rr_ratio`.

use tracing::debug;

use crate::config::StrategyConfig;
use crate::domain::{Candle, Direction, Instrument, ZoneKind};
use crate::risk;
use crate::zones::ZoneDetector;

use super::{confirm, filters, NoTradeReason, Signal, SignalError, SignalOutcome, Strategy};

pub struct ZoneReentryStrategy {
    config: StrategyConfig,
    instrument: Instrument,
    detector: ZoneDetector,
}

impl ZoneReentryStrategy {
    pub fn new(config: StrategyConfig, instrument: Instrument) -> Self {
        let detector = ZoneDetector::new(&config, instrument.pip_size);
        Self {
            config,
            instrument,
            detector,
        }
    }
}

impl Strategy for ZoneReentryStrategy {
    fn name(&self) -> &'static str {
        "zone_reentry"
    }

    fn analyze(&mut self, candles: &[Candle]) -> Result<SignalOutcome, SignalError> {
        if candles.len() < self.config.base_max_candles + 2 {
            return Ok(SignalOutcome::NoTrade(NoTradeReason::InsufficientData));
        }
        let last = &candles[candles.len() - 1];

        if let Some(reason) = filters::check_session(self.config.session.as_ref(), last) {
            return Ok(SignalOutcome::NoTrade(reason));
        }
        if let Some(reason) = filters::check_atr_floor(
            self.config.atr_floor.as_ref(),
            candles,
            self.instrument.pip_size,
        ) {
            return Ok(SignalOutcome::NoTrade(reason));
        }

        self.detector.update(candles);

        let price = last.close;
        let pip = self.instrument.pip_size;
        let pip_value = self.instrument.pip_value_per_lot;
        let cfg = self.config.clone();

        let mut saw_unconfirmed = false;
        for zone in self.detector.zones_mut() {
            if !zone.is_fresh || !zone.contains(price) {
                continue;
            }
            let direction = match zone.kind {
                ZoneKind::Demand => Direction::Buy,
                ZoneKind::Supply => Direction::Sell,
            };
            if cfg.wick_confirmation
                && !confirm::is_rejection_wick(last, direction, cfg.wick_min_ratio, cfg.body_min_pct)
            {
                saw_unconfirmed = true;
                continue;
            }

            // Stop just beyond the zone boundary plus buffer, with the
            // resulting distance clamped to the configured band.
            let raw_risk_pips = match direction {
                Direction::Buy => (price - zone.price_low) / pip + cfg.stop_buffer_pips,
                Direction::Sell => (zone.price_high - price) / pip + cfg.stop_buffer_pips,
            };
            let risk_pips = raw_risk_pips.clamp(cfg.sl_min_pips, cfg.sl_max_pips);
            let (stop_loss, take_profit) = match direction {
                Direction::Buy => (
                    price - risk_pips * pip,
                    price + risk_pips * cfg.rr_ratio * pip,
                ),
                Direction::Sell => (
                    price + risk_pips * pip,
                    price - risk_pips * cfg.rr_ratio * pip,
                ),
            };
            let volume_lots = risk::position_size(
                cfg.target_risk_usd,
                risk_pips,
                pip_value,
                cfg.min_lot,
                cfg.max_lot,
            )?;

            // Consumed for this rescan window; a new bar re-derives freshness
            // from price alone.
            zone.is_fresh = false;

            debug!(
                direction = ?direction,
                entry = price,
                stop = stop_loss,
                target = take_profit,
                risk_pips,
                "zone re-entry signal"
            );
            return Ok(SignalOutcome::Trade(Signal {
                direction,
                entry_price: price,
                stop_loss,
                take_profit,
                volume_lots,
                reason: format!("{:?} zone retest", zone.kind),
            }));
        }

        if saw_unconfirmed {
            Ok(SignalOutcome::NoTrade(NoTradeReason::NoConfirmation))
        } else {
            Ok(SignalOutcome::NoTrade(NoTradeReason::NoFreshZone))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionFilter;
    use chrono::{Duration, TimeZone, Utc};

    fn flat_candle(i: usize, price: f64) -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + Duration::hours(4 * i as i64),
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 1_000.0,
        }
    }

    /// Demand zone at [1.1000, 1.1005] created at bar 210, then price
    /// returns into the zone on the last bar.
    fn reentry_scenario() -> Vec<Candle> {
        let mut candles: Vec<Candle> = (0..200).map(|i| flat_candle(i, 1.1000)).collect();
        for i in 200..210 {
            let mut c = flat_candle(i, 1.1004);
            c.open = 1.1001;
            c.high = 1.1005;
            c.low = 1.1000;
            candles.push(c);
        }
        let mut impulse = flat_candle(210, 1.1030);
        impulse.open = 1.1004;
        impulse.high = 1.1033;
        impulse.low = 1.1003;
        candles.push(impulse);
        for i in 211..280 {
            candles.push(flat_candle(i, 1.1030));
        }
        // Return leg into the zone; lows stay at or above the zone low.
        let mut touch = flat_candle(280, 1.1003);
        touch.open = 1.1008;
        touch.high = 1.1009;
        touch.low = 1.1002;
        candles.push(touch);
        candles
    }

    fn config() -> StrategyConfig {
        StrategyConfig {
            min_zone_size_pips: 2.0,
            ..StrategyConfig::default()
        }
    }

    fn strategy(cfg: StrategyConfig) -> ZoneReentryStrategy {
        let instrument = Instrument::resolve(&cfg.instrument);
        ZoneReentryStrategy::new(cfg, instrument)
    }

    #[test]
    fn buy_on_fresh_demand_zone_touch() {
        let candles = reentry_scenario();
        let mut strat = strategy(config());
        let outcome = strat.analyze(&candles).unwrap();
        let signal = match outcome {
            SignalOutcome::Trade(s) => s,
            other => panic!("expected trade, got {other:?}"),
        };
        assert_eq!(signal.direction, Direction::Buy);
        assert!((signal.entry_price - 1.1003).abs() < 1e-9);
        // Raw risk = 3 pips to the zone low + 2 buffer = 5, already at sl_min.
        assert!((signal.stop_loss - 1.0998).abs() < 1e-9);
        assert!((signal.take_profit - 1.1013).abs() < 1e-9);
        // $50 / (5 pips * $10) = 1.0 lots.
        assert!((signal.volume_lots - 1.0).abs() < 1e-9);
        assert!(signal.validate().is_ok());
    }

    #[test]
    fn zone_is_consumed_within_the_same_bar() {
        let candles = reentry_scenario();
        let mut strat = strategy(config());
        assert!(matches!(
            strat.analyze(&candles).unwrap(),
            SignalOutcome::Trade(_)
        ));
        // Same bar again: the zone was marked tested and the memo holds.
        assert!(matches!(
            strat.analyze(&candles).unwrap(),
            SignalOutcome::NoTrade(NoTradeReason::NoFreshZone)
        ));
    }

    #[test]
    fn session_filter_rejects_with_reason() {
        let candles = reentry_scenario();
        let cfg = StrategyConfig {
            session: Some(SessionFilter {
                hours_utc: vec![(0, 1)],
            }),
            ..config()
        };
        let mut strat = strategy(cfg);
        // Bar 280 lands at 16:00 UTC, outside the 00:00-01:00 window.
        assert!(matches!(
            strat.analyze(&candles).unwrap(),
            SignalOutcome::NoTrade(NoTradeReason::OutsideSession)
        ));
    }

    #[test]
    fn wick_confirmation_gates_the_entry() {
        let candles = reentry_scenario();
        let cfg = StrategyConfig {
            wick_confirmation: true,
            ..config()
        };
        let mut strat = strategy(cfg);
        // The touch bar closes near its low with no rejection wick.
        assert!(matches!(
            strat.analyze(&candles).unwrap(),
            SignalOutcome::NoTrade(NoTradeReason::NoConfirmation)
        ));

        // Reshape the touch bar into a long lower wick (low stays at the zone
        // low so freshness is untouched) and it confirms.
        let mut confirmed = candles.clone();
        let last = confirmed.len() - 1;
        confirmed[last].open = 1.10047;
        confirmed[last].high = 1.10050;
        confirmed[last].low = 1.10000;
        confirmed[last].close = 1.10040;
        let cfg = StrategyConfig {
            wick_confirmation: true,
            ..config()
        };
        let mut strat = strategy(cfg);
        let outcome = strat.analyze(&confirmed).unwrap();
        assert!(matches!(outcome, SignalOutcome::Trade(_)));
    }

    #[test]
    fn no_zone_touch_means_no_trade() {
        let mut candles = reentry_scenario();
        candles.pop();
        candles.push(flat_candle(280, 1.1030));
        let mut strat = strategy(config());
        assert!(matches!(
            strat.analyze(&candles).unwrap(),
            SignalOutcome::NoTrade(NoTradeReason::NoFreshZone)
        ));
    }
}
