//! Supply/demand zone detection.
//!
//! A zone is born when a quiet consolidation base is left by an impulse
//! candle whose range dwarfs the base's mean range. The detector scans the
//! trailing lookback window, resolves overlaps in favor of the most recent
//! zone, and invalidates freshness continuously: every bar after a zone's
//! creation is checked, so a zone price has already traded through is never
//! offered as tradeable.

use tracing::debug;

use crate::config::{ConfigError, StrategyConfig};
use crate::domain::{Candle, Instrument, Zone, ZoneKind};

/// The subset of [`StrategyConfig`] the scan needs, with pip size resolved.
#[derive(Debug, Clone)]
pub(crate) struct ZoneParams {
    pub zone_lookback: usize,
    pub base_max_candles: usize,
    pub move_min_ratio: f64,
    pub min_zone_size_pips: f64,
    pub max_zone_size_pips: f64,
    pub pip_size: f64,
}

impl ZoneParams {
    pub(crate) fn from_config(config: &StrategyConfig, pip_size: f64) -> Self {
        Self {
            zone_lookback: config.zone_lookback,
            base_max_candles: config.base_max_candles,
            move_min_ratio: config.move_min_ratio,
            min_zone_size_pips: config.min_zone_size_pips,
            max_zone_size_pips: config.max_zone_size_pips,
            pip_size,
        }
    }
}

/// Stateful detector owned by a single strategy instance.
///
/// Zones are recomputed only when a new bar index is seen since the last
/// evaluation; the memo is an instance field, never shared between runs.
#[derive(Debug)]
pub struct ZoneDetector {
    params: ZoneParams,
    zones: Vec<Zone>,
    last_scanned_index: Option<usize>,
}

impl ZoneDetector {
    pub fn new(config: &StrategyConfig, pip_size: f64) -> Self {
        Self {
            params: ZoneParams::from_config(config, pip_size),
            zones: Vec::new(),
            last_scanned_index: None,
        }
    }

    /// Recompute zones if `candles` has advanced past the last scanned bar.
    /// Repeated calls within the same bar reuse the cached zones, including
    /// any freshness flags flipped by the strategy in the meantime.
    pub fn update(&mut self, candles: &[Candle]) {
        let current = candles.len().checked_sub(1);
        if current == self.last_scanned_index {
            return;
        }
        self.zones = scan(candles, &self.params);
        self.last_scanned_index = current;
        debug!(
            bar = ?current,
            zones = self.zones.len(),
            fresh = self.zones.iter().filter(|z| z.is_fresh).count(),
            "zone rescan"
        );
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zones_mut(&mut self) -> &mut [Zone] {
        &mut self.zones
    }
}

/// Pure zone detection over a full candle slice.
///
/// Validates the configuration, then runs the same scan the engine uses.
/// Usable independently of any backtest run.
pub fn detect_zones(candles: &[Candle], config: &StrategyConfig) -> Result<Vec<Zone>, ConfigError> {
    config.validate()?;
    let instrument = Instrument::resolve(&config.instrument);
    Ok(scan(candles, &ZoneParams::from_config(config, instrument.pip_size)))
}

/// Try every base length at `impulse_index` and return the first valid zone.
///
/// Once a base length matches, the impulse is never re-scanned with a longer
/// base. The returned zone's `created_at_index` is in the coordinates of the
/// passed slice.
pub(crate) fn base_zone_at(candles: &[Candle], impulse_index: usize, p: &ZoneParams) -> Option<Zone> {
    if impulse_index >= candles.len() {
        return None;
    }
    let impulse = &candles[impulse_index];
    for base_len in 1..=p.base_max_candles.min(impulse_index) {
        let base = &candles[impulse_index - base_len..impulse_index];
        let mean_range = base.iter().map(Candle::range).sum::<f64>() / base.len() as f64;
        if mean_range <= 0.0 {
            continue;
        }
        if impulse.range() <= mean_range * p.move_min_ratio {
            continue;
        }
        let base_high = base.iter().map(|c| c.high).fold(f64::MIN, f64::max);
        let base_low = base.iter().map(|c| c.low).fold(f64::MAX, f64::min);
        let width_pips = (base_high - base_low) / p.pip_size;
        if width_pips < p.min_zone_size_pips || width_pips > p.max_zone_size_pips {
            continue;
        }
        let kind = if impulse.close > base_high {
            ZoneKind::Demand
        } else if impulse.close < base_low {
            ZoneKind::Supply
        } else {
            continue;
        };
        return Some(Zone {
            kind,
            price_low: base_low,
            price_high: base_high,
            created_at_index: impulse_index,
            is_fresh: true,
            strength: Some(impulse.range() / mean_range),
        });
    }
    None
}

fn scan(candles: &[Candle], p: &ZoneParams) -> Vec<Zone> {
    let offset = candles.len().saturating_sub(p.zone_lookback);
    let window = &candles[offset..];
    if window.len() <= p.base_max_candles {
        return Vec::new();
    }

    let mut zones = Vec::new();
    for i in p.base_max_candles..window.len() {
        if let Some(mut zone) = base_zone_at(window, i, p) {
            zone.created_at_index = offset + i;
            zones.push(zone);
        }
    }

    let mut zones = resolve_overlaps(zones);
    invalidate_freshness(&mut zones, window, offset);
    zones
}

/// Keep the most recently created zone among any overlapping price ranges.
fn resolve_overlaps(mut zones: Vec<Zone>) -> Vec<Zone> {
    zones.sort_by(|a, b| b.created_at_index.cmp(&a.created_at_index));
    let mut kept: Vec<Zone> = Vec::new();
    for zone in zones {
        if !kept.iter().any(|k| k.overlaps(&zone)) {
            kept.push(zone);
        }
    }
    kept.sort_by_key(|z| z.created_at_index);
    kept
}

/// Continuous freshness invalidation: a demand zone goes stale the first time
/// any later bar's low trades below the zone low; supply mirrored. The flip
/// is one-way.
fn invalidate_freshness(zones: &mut [Zone], window: &[Candle], offset: usize) {
    for zone in zones.iter_mut() {
        let local = zone.created_at_index - offset;
        for bar in &window[local + 1..] {
            let broken = match zone.kind {
                ZoneKind::Demand => bar.low < zone.price_low,
                ZoneKind::Supply => bar.high > zone.price_high,
            };
            if broken {
                zone.is_fresh = false;
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

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

    /// 300 bars: flat run-up, a 10-bar base with a 5-pip range, one 30-pip
    /// impulse closing above the base high, then flat at the new level.
    fn demand_scenario() -> Vec<Candle> {
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
        for i in 211..300 {
            candles.push(flat_candle(i, 1.1030));
        }
        candles
    }

    fn config() -> StrategyConfig {
        StrategyConfig {
            min_zone_size_pips: 2.0,
            ..StrategyConfig::default()
        }
    }

    #[test]
    fn base_then_impulse_yields_exactly_one_demand_zone() {
        let candles = demand_scenario();
        let zones = detect_zones(&candles, &config()).unwrap();
        assert_eq!(zones.len(), 1);
        let z = &zones[0];
        assert_eq!(z.kind, ZoneKind::Demand);
        assert!((z.price_low - 1.1000).abs() < 1e-9);
        assert!((z.price_high - 1.1005).abs() < 1e-9);
        assert_eq!(z.created_at_index, 210);
        assert!(z.is_fresh);
    }

    #[test]
    fn supply_mirror_scenario() {
        let mut candles: Vec<Candle> = (0..200).map(|i| flat_candle(i, 1.1030)).collect();
        for i in 200..210 {
            let mut c = flat_candle(i, 1.1026);
            c.open = 1.1029;
            c.high = 1.1030;
            c.low = 1.1025;
            candles.push(c);
        }
        let mut impulse = flat_candle(210, 1.1000);
        impulse.open = 1.1026;
        impulse.high = 1.1027;
        impulse.low = 1.0997;
        candles.push(impulse);
        for i in 211..300 {
            candles.push(flat_candle(i, 1.1000));
        }

        let zones = detect_zones(&candles, &config()).unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].kind, ZoneKind::Supply);
        assert!(zones[0].is_fresh);
        assert_eq!(zones[0].created_at_index, 210);
    }

    #[test]
    fn overlapping_zones_keep_most_recent() {
        let mut candles = demand_scenario();
        candles.truncate(211);
        // Price drifts back and builds a second, overlapping base.
        for i in 211..230 {
            candles.push(flat_candle(i, 1.1004));
        }
        for i in 230..236 {
            let mut c = flat_candle(i, 1.1005);
            c.open = 1.1002;
            c.high = 1.1006;
            c.low = 1.1001;
            candles.push(c);
        }
        let mut impulse = flat_candle(236, 1.1030);
        impulse.open = 1.1005;
        impulse.high = 1.1034;
        impulse.low = 1.1004;
        candles.push(impulse);
        for i in 237..300 {
            candles.push(flat_candle(i, 1.1030));
        }

        let zones = detect_zones(&candles, &config()).unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].created_at_index, 236);
        assert!((zones[0].price_low - 1.1001).abs() < 1e-9);
    }

    #[test]
    fn freshness_flips_when_price_breaks_zone_low() {
        let mut candles = demand_scenario();
        // A later bar dips below the zone low.
        let mut dip = flat_candle(250, 1.1030);
        dip.low = 1.0995;
        dip.open = 1.1030;
        dip.high = 1.1030;
        dip.close = 1.1030;
        candles[250] = dip;

        let zones = detect_zones(&candles, &config()).unwrap();
        assert_eq!(zones.len(), 1);
        assert!(!zones[0].is_fresh);
    }

    #[test]
    fn detector_memoizes_by_bar_index() {
        let candles = demand_scenario();
        let cfg = config();
        let mut detector = ZoneDetector::new(&cfg, 0.0001);
        detector.update(&candles);
        assert_eq!(detector.zones().len(), 1);

        // A strategy consumes the zone; a same-bar re-update must not rescan.
        detector.zones_mut()[0].is_fresh = false;
        detector.update(&candles);
        assert!(!detector.zones()[0].is_fresh);

        // A new bar triggers a rescan and re-derives freshness from price.
        let mut extended = candles.clone();
        extended.push(flat_candle(300, 1.1030));
        detector.update(&extended);
        assert!(detector.zones()[0].is_fresh);
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = StrategyConfig {
            move_min_ratio: 0.0,
            ..StrategyConfig::default()
        };
        assert!(detect_zones(&demand_scenario(), &cfg).is_err());
    }

    proptest! {
        /// Every detected zone respects its own invariants regardless of input.
        #[test]
        fn zone_invariants_hold(seed_prices in proptest::collection::vec(0.9f64..1.3, 60..180)) {
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let candles: Vec<Candle> = seed_prices
                .windows(2)
                .enumerate()
                .map(|(i, w)| {
                    let (open, close) = (w[0], w[1]);
                    Candle {
                        timestamp: start + Duration::hours(i as i64),
                        open,
                        high: open.max(close) + 0.0004,
                        low: open.min(close) - 0.0004,
                        close,
                        volume: 1_000.0,
                    }
                })
                .collect();
            let cfg = StrategyConfig {
                zone_lookback: 150,
                max_zone_size_pips: 80.0,
                ..StrategyConfig::default()
            };
            let zones = detect_zones(&candles, &cfg).unwrap();
            for z in &zones {
                prop_assert!(z.price_low < z.price_high);
                let width = z.width_pips(0.0001);
                prop_assert!(width >= cfg.min_zone_size_pips && width <= cfg.max_zone_size_pips);
                prop_assert!(z.created_at_index < candles.len());
            }
            // Overlap resolution leaves pairwise disjoint zones.
            for (a, b) in zones.iter().zip(zones.iter().skip(1)) {
                prop_assert!(!a.overlaps(b));
            }
        }
    }
}
