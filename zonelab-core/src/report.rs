//! Run summary — the aggregate a finished backtest exposes downstream.

use serde::{Deserialize, Serialize};

use crate::domain::{AccountState, Trade};

/// Aggregate outcome of one backtest run.
///
/// A run with zero trades is a valid result (all-zero statistics, final
/// balance equal to the initial), distinguishable from a failed run which
/// never produces a `RunResult` at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub total_trades: usize,
    pub wins: usize,
    /// Fraction of trades with positive pnl, 0.0 when no trades occurred.
    pub win_rate: f64,
    pub total_pnl: f64,
    pub initial_balance: f64,
    pub final_balance: f64,
    /// Peak-to-trough decline of the running balance, as a fraction of peak.
    pub max_drawdown: f64,
    /// Mean winning pips over mean losing pips; 0.0 without both sides.
    pub risk_reward: f64,
    /// Closed trades in exit order.
    pub trades: Vec<Trade>,
}

impl RunResult {
    pub fn from_account(account: AccountState) -> Self {
        let trades = account.closed_trades.clone();
        let total_trades = trades.len();
        let wins = trades.iter().filter(|t| t.is_winner()).count();
        let win_rate = if total_trades == 0 {
            0.0
        } else {
            wins as f64 / total_trades as f64
        };
        let total_pnl = trades.iter().map(Trade::pnl_usd).sum();
        Self {
            total_trades,
            wins,
            win_rate,
            total_pnl,
            initial_balance: account.initial_balance,
            final_balance: account.balance,
            max_drawdown: account.max_drawdown(),
            risk_reward: aggregate_risk_reward(&trades),
            trades,
        }
    }
}

/// Mean winning pips divided by mean losing pips (absolute). Defined only
/// when both winners and losers exist; 0.0 otherwise.
fn aggregate_risk_reward(trades: &[Trade]) -> f64 {
    let winning: Vec<f64> = trades
        .iter()
        .filter(|t| t.is_winner())
        .map(Trade::pips_gained)
        .collect();
    let losing: Vec<f64> = trades
        .iter()
        .filter(|t| !t.is_winner())
        .map(|t| t.pips_gained().abs())
        .collect();
    if winning.is_empty() || losing.is_empty() {
        return 0.0;
    }
    let mean_win = winning.iter().sum::<f64>() / winning.len() as f64;
    let mean_loss = losing.iter().sum::<f64>() / losing.len() as f64;
    if mean_loss <= 0.0 {
        return 0.0;
    }
    mean_win / mean_loss
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountState, Direction, ExitReason, Instrument, Trade};
    use chrono::{TimeZone, Utc};

    fn account_with_pips(pips: &[f64]) -> AccountState {
        let mut account = AccountState::new(1_000.0);
        let instr = Instrument::resolve("EUR/USD");
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        for &p in pips {
            let id = account.next_trade_id();
            account
                .register_trade(Trade {
                    id,
                    instrument: "EUR/USD".into(),
                    direction: Direction::Buy,
                    entry_index: 0,
                    entry_time: ts,
                    entry_price: 1.1000,
                    stop_loss: 1.0950,
                    take_profit: 1.1100,
                    volume_lots: 1.0,
                    reason: "test".into(),
                    exit: None,
                })
                .unwrap();
            let exit = 1.1000 + instr.to_price(p);
            account
                .close_open_trade(&instr, 1, ts, exit, ExitReason::TakeProfit)
                .unwrap();
        }
        account
    }

    #[test]
    fn zero_trade_run_is_a_valid_result() {
        let result = RunResult::from_account(AccountState::new(1_000.0));
        assert_eq!(result.total_trades, 0);
        assert_eq!(result.win_rate, 0.0);
        assert_eq!(result.total_pnl, 0.0);
        assert_eq!(result.final_balance, 1_000.0);
        assert_eq!(result.max_drawdown, 0.0);
        assert_eq!(result.risk_reward, 0.0);
    }

    #[test]
    fn summary_over_scripted_trades() {
        // Pips: +30, -10, +25 at $10/pip → balance 1000 + 450 ... with 1 lot
        // each pip is $10, so pnl = +300, -100, +250 = +450.
        let result = RunResult::from_account(account_with_pips(&[30.0, -10.0, 25.0]));
        assert_eq!(result.total_trades, 3);
        assert_eq!(result.wins, 2);
        assert!((result.win_rate - 2.0 / 3.0).abs() < 1e-12);
        assert!((result.total_pnl - 450.0).abs() < 1e-9);
        assert!((result.final_balance - 1_450.0).abs() < 1e-9);
        // Mean win 27.5 pips over mean loss 10 pips.
        assert!((result.risk_reward - 2.75).abs() < 1e-9);
    }

    #[test]
    fn risk_reward_needs_both_sides() {
        let all_wins = RunResult::from_account(account_with_pips(&[10.0, 20.0]));
        assert_eq!(all_wins.risk_reward, 0.0);
        let all_losses = RunResult::from_account(account_with_pips(&[-10.0, -20.0]));
        assert_eq!(all_losses.risk_reward, 0.0);
    }
}
