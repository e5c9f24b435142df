//! Account state — balance tracking and the open/closed trade sets.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use super::instrument::Instrument;
use super::trade::{ExitReason, Trade, TradeError};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("instrument {0} already has an open trade")]
    TradeAlreadyOpen(String),
    #[error("no open trade for instrument {0}")]
    NoOpenTrade(String),
    #[error(transparent)]
    Trade(#[from] TradeError),
}

/// Per-run account: running balance with peak/trough, at most one open trade
/// per instrument, and the ordered closed-trade log.
///
/// Owned by exactly one backtest run — never shared across runs.
#[derive(Debug, Clone)]
pub struct AccountState {
    pub initial_balance: f64,
    pub balance: f64,
    pub peak_balance: f64,
    pub trough_balance: f64,
    open_trades: HashMap<String, Trade>,
    pub closed_trades: Vec<Trade>,
    next_trade_id: u64,
}

impl AccountState {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            initial_balance,
            balance: initial_balance,
            peak_balance: initial_balance,
            trough_balance: initial_balance,
            open_trades: HashMap::new(),
            closed_trades: Vec::new(),
            next_trade_id: 0,
        }
    }

    /// Allocate the next trade id.
    pub fn next_trade_id(&mut self) -> u64 {
        let id = self.next_trade_id;
        self.next_trade_id += 1;
        id
    }

    pub fn has_open_trade(&self, instrument: &str) -> bool {
        self.open_trades.contains_key(instrument)
    }

    pub fn open_trade(&self, instrument: &str) -> Option<&Trade> {
        self.open_trades.get(instrument)
    }

    /// Register a newly filled trade. At most one open trade per instrument.
    pub fn register_trade(&mut self, trade: Trade) -> Result<(), AccountError> {
        if self.open_trades.contains_key(&trade.instrument) {
            return Err(AccountError::TradeAlreadyOpen(trade.instrument));
        }
        debug!(
            id = trade.id,
            instrument = %trade.instrument,
            direction = ?trade.direction,
            entry = trade.entry_price,
            "trade opened"
        );
        self.open_trades.insert(trade.instrument.clone(), trade);
        Ok(())
    }

    /// Close the open trade on `instrument`, realize its pnl into the balance,
    /// and move it to the closed log.
    ///
    /// Removal from the open map happens before the close is applied, so the
    /// same trade can never be closed twice through this path.
    pub fn close_open_trade(
        &mut self,
        instr: &Instrument,
        index: usize,
        time: DateTime<Utc>,
        price: f64,
        reason: ExitReason,
    ) -> Result<f64, AccountError> {
        let mut trade = self
            .open_trades
            .remove(&instr.name)
            .ok_or_else(|| AccountError::NoOpenTrade(instr.name.clone()))?;
        let pnl = trade.close(index, time, price, reason, instr)?;

        self.balance += pnl;
        if self.balance > self.peak_balance {
            self.peak_balance = self.balance;
        }
        if self.balance < self.trough_balance {
            self.trough_balance = self.balance;
        }

        debug!(
            id = trade.id,
            instrument = %instr.name,
            reason = %reason,
            pips = trade.pips_gained(),
            pnl,
            balance = self.balance,
            "trade closed"
        );
        self.closed_trades.push(trade);
        Ok(pnl)
    }

    /// Peak-to-trough decline as a fraction of the peak.
    pub fn max_drawdown(&self) -> f64 {
        if self.peak_balance <= 0.0 {
            return 0.0;
        }
        (self.peak_balance - self.trough_balance) / self.peak_balance
    }
}
