//! Trade — one round trip from entry fill to terminal exit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::instrument::Instrument;

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
}

/// Why a trade was terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    /// Forced close on the final bar of the dataset.
    EndOfData,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StopLoss => write!(f, "Stop Loss"),
            Self::TakeProfit => write!(f, "Take Profit"),
            Self::EndOfData => write!(f, "End of data"),
        }
    }
}

/// Lifecycle state of a trade relative to a bar index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeState {
    /// Fill is scheduled at a future bar (execution delay).
    Pending,
    Open,
    Closed,
}

#[derive(Debug, Error)]
pub enum TradeError {
    #[error("trade {0} is already closed")]
    AlreadyClosed(u64),
}

/// The exit half of a trade, populated exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeExit {
    pub index: usize,
    pub time: DateTime<Utc>,
    pub price: f64,
    pub reason: ExitReason,
    pub pips_gained: f64,
    pub pnl_usd: f64,
}

/// A single trade: created by the signal evaluator + execution simulator,
/// mutated per bar by the lifecycle manager, terminated exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: u64,
    pub instrument: String,
    pub direction: Direction,
    /// Index of the fill bar. With execution delay this can be ahead of the
    /// signal bar; exits must never be evaluated before it.
    pub entry_index: usize,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub volume_lots: f64,
    pub reason: String,
    pub exit: Option<TradeExit>,
}

impl Trade {
    pub fn is_closed(&self) -> bool {
        self.exit.is_some()
    }

    /// Lifecycle state at a given bar index.
    pub fn state_at(&self, bar_index: usize) -> TradeState {
        if self.is_closed() {
            TradeState::Closed
        } else if bar_index < self.entry_index {
            TradeState::Pending
        } else {
            TradeState::Open
        }
    }

    /// Signed pip distance from entry to `price` in the trade's favor.
    pub fn pips_at(&self, price: f64, pip_size: f64) -> f64 {
        match self.direction {
            Direction::Buy => (price - self.entry_price) / pip_size,
            Direction::Sell => (self.entry_price - price) / pip_size,
        }
    }

    /// Close the trade and compute pips and USD pnl.
    ///
    /// Returns the realized pnl. A second close attempt is rejected and the
    /// stored exit is left untouched.
    pub fn close(
        &mut self,
        index: usize,
        time: DateTime<Utc>,
        price: f64,
        reason: ExitReason,
        instrument: &Instrument,
    ) -> Result<f64, TradeError> {
        if self.is_closed() {
            return Err(TradeError::AlreadyClosed(self.id));
        }
        let pips = self.pips_at(price, instrument.pip_size);
        let pnl = pips * instrument.pip_value_per_lot * self.volume_lots;
        self.exit = Some(TradeExit {
            index,
            time,
            price,
            reason,
            pips_gained: pips,
            pnl_usd: pnl,
        });
        Ok(pnl)
    }

    /// Realized pnl in USD; zero while the trade is open.
    pub fn pnl_usd(&self) -> f64 {
        self.exit.as_ref().map(|e| e.pnl_usd).unwrap_or(0.0)
    }

    /// Realized pips; zero while the trade is open.
    pub fn pips_gained(&self) -> f64 {
        self.exit.as_ref().map(|e| e.pips_gained).unwrap_or(0.0)
    }

    pub fn is_winner(&self) -> bool {
        self.pnl_usd() > 0.0
    }

    /// Holding time in hours, if the trade has closed.
    pub fn duration_hours(&self) -> Option<f64> {
        self.exit
            .as_ref()
            .map(|e| (e.time - self.entry_time).num_seconds() as f64 / 3600.0)
    }
}
