//! Signal evaluation — the strategy seam.
//!
//! Every strategy variant implements [`Strategy`]: given the candle history
//! up to the current bar, return a BUY/SELL signal with price levels, or a
//! typed no-trade reason. Rejections are never silent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Candle, Direction};

pub mod confirm;
pub mod filters;
pub mod structure_break;
pub mod zone_reentry;

pub use structure_break::StructureBreakStrategy;
pub use zone_reentry::ZoneReentryStrategy;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("invalid signal: {0}")]
    Invalid(String),
}

/// A fully specified trade request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub volume_lots: f64,
    pub reason: String,
}

impl Signal {
    /// Reject signals with missing geometry: non-positive volume, non-finite
    /// levels, or stop/target on the wrong side of the entry.
    pub fn validate(&self) -> Result<(), SignalError> {
        if !(self.volume_lots > 0.0) {
            return Err(SignalError::Invalid(format!(
                "non-positive volume {}",
                self.volume_lots
            )));
        }
        for (name, value) in [
            ("entry_price", self.entry_price),
            ("stop_loss", self.stop_loss),
            ("take_profit", self.take_profit),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SignalError::Invalid(format!("bad {name}: {value}")));
            }
        }
        let sides_ok = match self.direction {
            Direction::Buy => self.stop_loss < self.entry_price && self.take_profit > self.entry_price,
            Direction::Sell => {
                self.stop_loss > self.entry_price && self.take_profit < self.entry_price
            }
        };
        if !sides_ok {
            return Err(SignalError::Invalid(format!(
                "stop/target on wrong side of entry for {:?}",
                self.direction
            )));
        }
        Ok(())
    }
}

/// Why a strategy declined to trade on this bar. Expected, not exceptional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NoTradeReason {
    InsufficientData,
    OutsideSession,
    AtrBelowFloor { atr_pips: f64, min_pips: f64 },
    NoFreshZone,
    NoStructureBreak,
    NoBaseZone,
    OutsideFibBand,
    OutsideZoneBounds,
    NoConfirmation,
}

impl std::fmt::Display for NoTradeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientData => write!(f, "insufficient data"),
            Self::OutsideSession => write!(f, "outside session hours"),
            Self::AtrBelowFloor { atr_pips, min_pips } => {
                write!(f, "ATR {atr_pips:.1} pips below floor {min_pips:.1}")
            }
            Self::NoFreshZone => write!(f, "no fresh zone at current price"),
            Self::NoStructureBreak => write!(f, "no structure break"),
            Self::NoBaseZone => write!(f, "no base zone behind the breaking leg"),
            Self::OutsideFibBand => write!(f, "price outside fibonacci band"),
            Self::OutsideZoneBounds => write!(f, "price outside zone bounds"),
            Self::NoConfirmation => write!(f, "no confirmation candle"),
        }
    }
}

/// Outcome of one strategy evaluation.
#[derive(Debug, Clone)]
pub enum SignalOutcome {
    Trade(Signal),
    NoTrade(NoTradeReason),
}

/// One strategy variant, constructed per run and never shared across runs.
///
/// `analyze` receives `candles[..=current]` — the full history up to and
/// including the decision bar — and must only read it. Mutable access to
/// `self` exists for per-instance memoization (zone caches), which is why a
/// strategy is cheap to rebuild for every parameter-search run.
pub trait Strategy: Send {
    fn name(&self) -> &'static str;

    fn analyze(&mut self, candles: &[Candle]) -> Result<SignalOutcome, SignalError>;
}
