//! Per-bar exit evaluation for open trades.
//!
//! A BUY stops out when the bar's low reaches the stop and takes profit when
//! the high reaches the target (SELL mirrored). When both trigger inside one
//! bar the realized exit is whichever level is numerically closer to that
//! bar's open — never random, never a fixed preference; an exact tie goes to
//! the stop.

use crate::domain::{Candle, Direction, ExitReason, Trade};

/// The exit a bar produced for an open trade, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitEvent {
    pub price: f64,
    pub reason: ExitReason,
}

pub fn evaluate_exit(trade: &Trade, candle: &Candle) -> Option<ExitEvent> {
    let (stop_hit, target_hit) = match trade.direction {
        Direction::Buy => (
            candle.low <= trade.stop_loss,
            candle.high >= trade.take_profit,
        ),
        Direction::Sell => (
            candle.high >= trade.stop_loss,
            candle.low <= trade.take_profit,
        ),
    };

    match (stop_hit, target_hit) {
        (true, true) => {
            let to_stop = (candle.open - trade.stop_loss).abs();
            let to_target = (candle.open - trade.take_profit).abs();
            if to_stop <= to_target {
                Some(ExitEvent {
                    price: trade.stop_loss,
                    reason: ExitReason::StopLoss,
                })
            } else {
                Some(ExitEvent {
                    price: trade.take_profit,
                    reason: ExitReason::TakeProfit,
                })
            }
        }
        (true, false) => Some(ExitEvent {
            price: trade.stop_loss,
            reason: ExitReason::StopLoss,
        }),
        (false, true) => Some(ExitEvent {
            price: trade.take_profit,
            reason: ExitReason::TakeProfit,
        }),
        (false, false) => None,
    }
}
