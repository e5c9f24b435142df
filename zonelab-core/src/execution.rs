//! Execution simulation — decision cadence, fill delay, transaction costs.
//!
//! Signals do not fill where they are seen: the fill lands
//! `execution_delay_bars` later at that bar's close, and spread+slippage move
//! the price against the trader on entry and again on exit.

use crate::config::StrategyConfig;
use crate::domain::Direction;

#[derive(Debug, Clone)]
pub struct ExecutionSimulator {
    decision_cadence_bars: usize,
    execution_delay_bars: usize,
    /// Combined spread+slippage cost in price units.
    cost: f64,
}

impl ExecutionSimulator {
    pub fn from_config(config: &StrategyConfig, pip_size: f64) -> Self {
        Self {
            decision_cadence_bars: config.decision_cadence_bars,
            execution_delay_bars: config.execution_delay_bars,
            cost: (config.spread_pips + config.slippage_pips) * pip_size,
        }
    }

    /// Whether `index` is eligible for strategy evaluation. The first
    /// decision point is `min_bars - 1`; later ones follow the cadence.
    pub fn is_decision_point(&self, index: usize, min_bars: usize) -> bool {
        let first = min_bars - 1;
        index >= first && (index - first) % self.decision_cadence_bars == 0
    }

    /// Bar index at which a signal seen at `signal_index` actually fills,
    /// clamped to the end of the data.
    pub fn fill_index(&self, signal_index: usize, len: usize) -> usize {
        (signal_index + self.execution_delay_bars).min(len.saturating_sub(1))
    }

    /// Entry fill: market price worsened against the trader.
    pub fn entry_price(&self, direction: Direction, market_price: f64) -> f64 {
        match direction {
            Direction::Buy => market_price + self.cost,
            Direction::Sell => market_price - self.cost,
        }
    }

    /// Exit fill: the realized level worsened symmetrically on close.
    pub fn exit_price(&self, direction: Direction, level: f64) -> f64 {
        match direction {
            Direction::Buy => level - self.cost,
            Direction::Sell => level + self.cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim(cadence: usize, delay: usize, spread: f64, slippage: f64) -> ExecutionSimulator {
        let config = StrategyConfig {
            decision_cadence_bars: cadence,
            execution_delay_bars: delay,
            spread_pips: spread,
            slippage_pips: slippage,
            ..StrategyConfig::default()
        };
        ExecutionSimulator::from_config(&config, 0.0001)
    }

    #[test]
    fn every_bar_cadence_from_min_bars() {
        let s = sim(1, 0, 0.0, 0.0);
        assert!(!s.is_decision_point(248, 250));
        assert!(s.is_decision_point(249, 250));
        assert!(s.is_decision_point(250, 250));
    }

    #[test]
    fn periodic_cadence_skips_bars() {
        let s = sim(4, 0, 0.0, 0.0);
        assert!(s.is_decision_point(249, 250));
        assert!(!s.is_decision_point(250, 250));
        assert!(!s.is_decision_point(252, 250));
        assert!(s.is_decision_point(253, 250));
    }

    #[test]
    fn fill_index_is_delayed_and_clamped() {
        let s = sim(1, 2, 0.0, 0.0);
        assert_eq!(s.fill_index(100, 300), 102);
        assert_eq!(s.fill_index(299, 300), 299);
        assert_eq!(s.fill_index(298, 300), 299);
    }

    #[test]
    fn costs_worsen_both_directions_symmetrically() {
        let s = sim(1, 0, 1.0, 0.5); // 1.5 pips total
        let cost = 1.5 * 0.0001;
        assert!((s.entry_price(Direction::Buy, 1.1000) - (1.1000 + cost)).abs() < 1e-12);
        assert!((s.entry_price(Direction::Sell, 1.1000) - (1.1000 - cost)).abs() < 1e-12);
        assert!((s.exit_price(Direction::Buy, 1.1040) - (1.1040 - cost)).abs() < 1e-12);
        assert!((s.exit_price(Direction::Sell, 1.0960) - (1.0960 + cost)).abs() < 1e-12);
    }

    #[test]
    fn zero_cost_passes_prices_through() {
        let s = sim(1, 0, 0.0, 0.0);
        assert_eq!(s.entry_price(Direction::Buy, 1.1), 1.1);
        assert_eq!(s.exit_price(Direction::Sell, 1.1), 1.1);
    }
}
