//! Structure-break strategy: swing break + fibonacci retracement + one-candle
//! confirmation.
//!
//! A bullish setup: a swing high strictly exceeds the previous swing high by
//! the configured minimum, price retraces into the fibonacci band of the
//! breaking leg, and the latest candle confirms the reversal. The stop sits
//! beyond the base zone found at the foot of the leg. Bearish is the mirror.

use tracing::debug;

use crate::config::StrategyConfig;
use crate::domain::{Candle, Direction, Instrument, Zone, ZoneKind};
use crate::indicators::{swing_highs, swing_lows, SwingPoint};
use crate::risk;
use crate::zones::detector::{base_zone_at, ZoneParams};

use super::{confirm, filters, NoTradeReason, Signal, SignalError, SignalOutcome, Strategy};

/// The breaking leg of a confirmed structure break.
struct BreakLeg {
    direction: Direction,
    /// Index of the bar where the leg starts (origin swing).
    start_index: usize,
    /// Index of the breaking swing extremum.
    break_index: usize,
    leg_low: f64,
    leg_high: f64,
}

pub struct StructureBreakStrategy {
    config: StrategyConfig,
    instrument: Instrument,
    zone_params: ZoneParams,
}

impl StructureBreakStrategy {
    pub fn new(config: StrategyConfig, instrument: Instrument) -> Self {
        let zone_params = ZoneParams::from_config(&config, instrument.pip_size);
        Self {
            config,
            instrument,
            zone_params,
        }
    }

    /// Latest structure break, if any. When both sides broke, the more recent
    /// breaking swing wins.
    fn find_break(&self, highs: &[SwingPoint], lows: &[SwingPoint]) -> Option<BreakLeg> {
        let min_move = self.instrument.to_price(self.config.min_structure_move_pips);

        let bullish = match highs {
            [.., prev, last] if last.price >= prev.price + min_move => Some(last),
            _ => None,
        };
        let bearish = match lows {
            [.., prev, last] if last.price <= prev.price - min_move => Some(last),
            _ => None,
        };

        let (direction, breaking) = match (bullish, bearish) {
            (Some(b), Some(s)) if s.index > b.index => (Direction::Sell, s),
            (Some(b), _) => (Direction::Buy, b),
            (None, Some(s)) => (Direction::Sell, s),
            (None, None) => return None,
        };

        // The leg starts at the most recent opposite swing before the break.
        let origin = match direction {
            Direction::Buy => lows.iter().rev().find(|s| s.index < breaking.index)?,
            Direction::Sell => highs.iter().rev().find(|s| s.index < breaking.index)?,
        };
        let (leg_low, leg_high) = match direction {
            Direction::Buy => (origin.price, breaking.price),
            Direction::Sell => (breaking.price, origin.price),
        };
        if leg_high <= leg_low {
            return None;
        }
        Some(BreakLeg {
            direction,
            start_index: origin.index,
            break_index: breaking.index,
            leg_low,
            leg_high,
        })
    }

    /// Base zone at the foot of the breaking leg: impulse candidates walk
    /// forward from the leg origin; the first base/impulse match of the
    /// expected kind supplies the zone.
    fn find_base_zone(&self, candles: &[Candle], leg: &BreakLeg) -> Option<Zone> {
        let expected = match leg.direction {
            Direction::Buy => ZoneKind::Demand,
            Direction::Sell => ZoneKind::Supply,
        };
        (leg.start_index..leg.break_index).find_map(|idx| {
            base_zone_at(candles, idx, &self.zone_params).filter(|z| z.kind == expected)
        })
    }
}

impl Strategy for StructureBreakStrategy {
    fn name(&self) -> &'static str {
        "structure_break"
    }

    fn analyze(&mut self, candles: &[Candle]) -> Result<SignalOutcome, SignalError> {
        let needed = (2 * self.config.swing_window + 2).max(self.config.base_max_candles + 2);
        if candles.len() < needed {
            return Ok(SignalOutcome::NoTrade(NoTradeReason::InsufficientData));
        }
        let last = &candles[candles.len() - 1];
        let prev = &candles[candles.len() - 2];

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

        let highs = swing_highs(candles, self.config.swing_window);
        let lows = swing_lows(candles, self.config.swing_window);
        let Some(leg) = self.find_break(&highs, &lows) else {
            return Ok(SignalOutcome::NoTrade(NoTradeReason::NoStructureBreak));
        };
        let Some(zone) = self.find_base_zone(candles, &leg) else {
            return Ok(SignalOutcome::NoTrade(NoTradeReason::NoBaseZone));
        };

        // Retracement of the breaking leg, 0 at the break extreme, 1 at the
        // leg origin.
        let price = last.close;
        let leg_range = leg.leg_high - leg.leg_low;
        let retrace = match leg.direction {
            Direction::Buy => (leg.leg_high - price) / leg_range,
            Direction::Sell => (price - leg.leg_low) / leg_range,
        };
        if retrace < self.config.fib_min || retrace > self.config.fib_max {
            return Ok(SignalOutcome::NoTrade(NoTradeReason::OutsideFibBand));
        }
        if self.config.require_zone_bounds && !zone.contains(price) {
            return Ok(SignalOutcome::NoTrade(NoTradeReason::OutsideZoneBounds));
        }
        if !confirm::confirms(
            prev,
            last,
            leg.direction,
            self.config.wick_min_ratio,
            self.config.body_min_pct,
        ) {
            return Ok(SignalOutcome::NoTrade(NoTradeReason::NoConfirmation));
        }

        let pip = self.instrument.pip_size;
        let raw_risk_pips = match leg.direction {
            Direction::Buy => (price - zone.price_low) / pip + self.config.stop_buffer_pips,
            Direction::Sell => (zone.price_high - price) / pip + self.config.stop_buffer_pips,
        };
        let risk_pips = raw_risk_pips.clamp(self.config.sl_min_pips, self.config.sl_max_pips);
        let (stop_loss, take_profit) = match leg.direction {
            Direction::Buy => (
                price - risk_pips * pip,
                price + risk_pips * self.config.rr_ratio * pip,
            ),
            Direction::Sell => (
                price + risk_pips * pip,
                price - risk_pips * self.config.rr_ratio * pip,
            ),
        };
        let volume_lots = risk::position_size(
            self.config.target_risk_usd,
            risk_pips,
            self.instrument.pip_value_per_lot,
            self.config.min_lot,
            self.config.max_lot,
        )?;

        debug!(
            direction = ?leg.direction,
            break_index = leg.break_index,
            retrace,
            entry = price,
            stop = stop_loss,
            target = take_profit,
            "structure break signal"
        );
        Ok(SignalOutcome::Trade(Signal {
            direction: leg.direction,
            entry_price: price,
            stop_loss,
            take_profit,
            volume_lots,
            reason: format!(
                "structure break retrace {:.1}%",
                retrace * 100.0
            ),
        }))
    }
}
