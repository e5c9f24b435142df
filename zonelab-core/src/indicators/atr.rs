//! Average True Range.
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|).
//! ATR uses Wilder smoothing (EMA with alpha = 1/period), seeded with the
//! mean of the first `period` true ranges.

use crate::domain::Candle;

/// True range series. TR[0] is just high-low (no previous close).
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    let mut tr = Vec::with_capacity(candles.len());
    for (i, c) in candles.iter().enumerate() {
        let value = if i == 0 {
            c.range()
        } else {
            let pc = candles[i - 1].close;
            c.range().max((c.high - pc).abs()).max((c.low - pc).abs())
        };
        tr.push(value);
    }
    tr
}

/// Latest ATR value over `period`, or `None` when there are not enough bars.
pub fn atr(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period + 1 {
        return None;
    }
    let tr = true_range(candles);
    // Seed with the mean of the first `period` values, then Wilder-smooth.
    let mut value = tr[..period].iter().sum::<f64>() / period as f64;
    let alpha = 1.0 / period as f64;
    for &t in &tr[period..] {
        value = value + alpha * (t - value);
    }
    Some(value)
}
