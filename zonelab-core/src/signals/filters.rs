//! Shared entry filters: session-hour window and ATR volatility floor.
//!
//! Filters reject with a specific [`NoTradeReason`], never silently.

use crate::config::{AtrFilter, SessionFilter};
use crate::domain::Candle;
use crate::indicators::atr;

use super::NoTradeReason;

/// Reject when the decision bar's timestamp falls outside the session window.
pub fn check_session(session: Option<&SessionFilter>, candle: &Candle) -> Option<NoTradeReason> {
    match session {
        Some(filter) if !filter.contains(candle.timestamp) => Some(NoTradeReason::OutsideSession),
        _ => None,
    }
}

/// Reject when ATR (in pips) sits below the configured floor. A history too
/// short to compute ATR counts as insufficient data rather than passing.
pub fn check_atr_floor(
    floor: Option<&AtrFilter>,
    candles: &[Candle],
    pip_size: f64,
) -> Option<NoTradeReason> {
    let filter = floor?;
    match atr(candles, filter.period) {
        None => Some(NoTradeReason::InsufficientData),
        Some(value) => {
            let atr_pips = value / pip_size;
            if atr_pips < filter.min_pips {
                Some(NoTradeReason::AtrBelowFloor {
                    atr_pips,
                    min_pips: filter.min_pips,
                })
            } else {
                None
            }
        }
    }
}
