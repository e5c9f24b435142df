//! Confirmation candle patterns.
//!
//! A signal candle confirms a reversal either by engulfing the prior body in
//! the trade direction, or by leaving a long rejection wick against the move
//! (shooting star / V-shaped bar).

use crate::domain::{Candle, Direction};

/// Body-engulfing in the trade direction: the candle closes the right way and
/// its body covers the prior candle's body.
pub fn is_engulfing(prev: &Candle, current: &Candle, direction: Direction) -> bool {
    let prev_top = prev.open.max(prev.close);
    let prev_bottom = prev.open.min(prev.close);
    match direction {
        Direction::Buy => {
            current.is_bullish() && current.open <= prev_bottom && current.close >= prev_top
        }
        Direction::Sell => {
            current.is_bearish() && current.open >= prev_top && current.close <= prev_bottom
        }
    }
}

/// Rejection-wick pattern: the wick against the move is at least
/// `wick_min_ratio` of the candle range, and the body is at least
/// `body_min_pct` of the range (filters out pure dojis).
///
/// BUY wants a long lower wick (lower prices rejected); SELL a long upper wick.
pub fn is_rejection_wick(
    candle: &Candle,
    direction: Direction,
    wick_min_ratio: f64,
    body_min_pct: f64,
) -> bool {
    let range = candle.range();
    if range <= 0.0 {
        return false;
    }
    let wick = match direction {
        Direction::Buy => candle.lower_wick(),
        Direction::Sell => candle.upper_wick(),
    };
    wick / range >= wick_min_ratio && candle.body_pct() >= body_min_pct
}

/// One-candle confirmation: engulfing or rejection wick.
pub fn confirms(
    prev: &Candle,
    current: &Candle,
    direction: Direction,
    wick_min_ratio: f64,
    body_min_pct: f64,
) -> bool {
    is_engulfing(prev, current, direction)
        || is_rejection_wick(current, direction, wick_min_ratio, body_min_pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap(),
            open,
            high,
            low,
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn bullish_engulfing() {
        let prev = candle(1.1010, 1.1012, 1.1000, 1.1002); // bearish
        let current = candle(1.1001, 1.1015, 1.0999, 1.1012); // engulfs body
        assert!(is_engulfing(&prev, &current, Direction::Buy));
        assert!(!is_engulfing(&prev, &current, Direction::Sell));
    }

    #[test]
    fn bearish_engulfing() {
        let prev = candle(1.1002, 1.1012, 1.1000, 1.1010);
        let current = candle(1.1011, 1.1013, 1.0998, 1.1000);
        assert!(is_engulfing(&prev, &current, Direction::Sell));
    }

    #[test]
    fn small_body_does_not_engulf() {
        let prev = candle(1.1000, 1.1012, 1.0998, 1.1010);
        let current = candle(1.1004, 1.1008, 1.1002, 1.1006);
        assert!(!is_engulfing(&prev, &current, Direction::Buy));
    }

    #[test]
    fn long_lower_wick_confirms_buy() {
        // Range 10 pips, lower wick 6 pips, body 2 pips.
        let c = candle(1.1006, 1.1010, 1.1000, 1.1008);
        assert!(is_rejection_wick(&c, Direction::Buy, 0.5, 0.1));
        assert!(!is_rejection_wick(&c, Direction::Sell, 0.5, 0.1));
    }

    #[test]
    fn doji_fails_body_floor() {
        // Long lower wick but almost no body.
        let c = candle(1.10090, 1.10100, 1.10000, 1.10095);
        assert!(!is_rejection_wick(&c, Direction::Buy, 0.5, 0.1));
    }

    #[test]
    fn confirmation_accepts_either_pattern() {
        let prev = candle(1.1010, 1.1012, 1.1000, 1.1002);
        let engulf = candle(1.1001, 1.1015, 1.0999, 1.1012);
        let wick = candle(1.1006, 1.1010, 1.1000, 1.1008);
        assert!(confirms(&prev, &engulf, Direction::Buy, 0.5, 0.1));
        assert!(confirms(&prev, &wick, Direction::Buy, 0.5, 0.1));
        let dull = candle(1.1004, 1.1006, 1.1003, 1.1005);
        assert!(!confirms(&prev, &dull, Direction::Buy, 0.5, 0.1));
    }
}
