//! Swing-point detection — symmetric-window local extrema.
//!
//! A bar is a swing high when its high is ≥ every high within `window` bars
//! on each side (mirror for swing lows). Only bars with a full window on both
//! sides qualify, so the last `window` bars never produce a swing point.

use crate::domain::Candle;

/// A confirmed local extremum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingPoint {
    pub index: usize,
    pub price: f64,
}

pub fn swing_highs(candles: &[Candle], window: usize) -> Vec<SwingPoint> {
    find_swings(candles, window, true)
}

pub fn swing_lows(candles: &[Candle], window: usize) -> Vec<SwingPoint> {
    find_swings(candles, window, false)
}

fn find_swings(candles: &[Candle], window: usize, highs: bool) -> Vec<SwingPoint> {
    let n = candles.len();
    if window == 0 || n < 2 * window + 1 {
        return Vec::new();
    }
    let mut swings = Vec::new();
    for i in window..n - window {
        let candidate = if highs { candles[i].high } else { candles[i].low };
        let before = &candles[i - window..i];
        let after = &candles[i + 1..=i + window];
        let is_extremum = if highs {
            before.iter().all(|c| c.high <= candidate)
                && after.iter().all(|c| c.high <= candidate)
        } else {
            before.iter().all(|c| c.low >= candidate) && after.iter().all(|c| c.low >= candidate)
        };
        if is_extremum {
            swings.push(SwingPoint {
                index: i,
                price: candidate,
            });
        }
    }
    swings
}
