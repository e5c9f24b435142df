//! The backtest engine — a single-threaded, single-pass bar loop.
//!
//! Per bar, exits are always evaluated before new entries. A strategy error
//! on one bar is downgraded to "no signal for this bar"; only insufficient
//! data and invalid configuration abort a run. All candles are in memory and
//! the loop performs no I/O.

pub mod lifecycle;

pub use lifecycle::{evaluate_exit, ExitEvent};

use tracing::{debug, info, trace};

use crate::config::StrategyConfig;
use crate::domain::{AccountState, Candle, ExitReason, Instrument, Trade, TradeState};
use crate::error::BacktestError;
use crate::execution::ExecutionSimulator;
use crate::registry;
use crate::report::RunResult;
use crate::signals::{SignalOutcome, Strategy};

/// Run a backtest with the strategy the registry builds for `config`.
pub fn run(candles: &[Candle], config: &StrategyConfig) -> Result<RunResult, BacktestError> {
    config.validate()?;
    let instrument = Instrument::resolve(&config.instrument);
    let mut strategy = registry::build_strategy(config, &instrument);
    run_with_strategy(candles, config, &instrument, strategy.as_mut())
}

/// Run a backtest with a caller-supplied strategy instance.
///
/// The strategy must be freshly constructed for this run; the engine assumes
/// it shares no state with any other run.
pub fn run_with_strategy(
    candles: &[Candle],
    config: &StrategyConfig,
    instrument: &Instrument,
    strategy: &mut dyn Strategy,
) -> Result<RunResult, BacktestError> {
    config.validate()?;
    if candles.len() < config.min_bars {
        return Err(BacktestError::DataInsufficient {
            required: config.min_bars,
            actual: candles.len(),
        });
    }

    let exec = ExecutionSimulator::from_config(config, instrument.pip_size);
    let mut account = AccountState::new(config.initial_balance);
    let first = config.min_bars - 1;

    for i in first..candles.len() {
        let bar = &candles[i];

        // Exits first: never reuse pre-exit account state for a new entry.
        // The fill bar itself is skipped — fills land on its close, after
        // the bar's range has already traded.
        let pending_exit = account.open_trade(&instrument.name).and_then(|trade| {
            if trade.state_at(i) == TradeState::Open && i > trade.entry_index {
                lifecycle::evaluate_exit(trade, bar).map(|exit| (trade.direction, exit))
            } else {
                None
            }
        });
        if let Some((direction, exit)) = pending_exit {
            let price = exec.exit_price(direction, exit.price);
            if let Err(error) =
                account.close_open_trade(instrument, i, bar.timestamp, price, exit.reason)
            {
                debug!(%error, bar = i, "exit rejected");
            }
        }

        if !exec.is_decision_point(i, config.min_bars) || account.has_open_trade(&instrument.name)
        {
            continue;
        }

        match strategy.analyze(&candles[..=i]) {
            Err(error) => {
                // One bad bar must not abort thousands of good ones.
                debug!(%error, bar = i, "strategy error treated as no signal");
            }
            Ok(SignalOutcome::NoTrade(reason)) => {
                trace!(bar = i, %reason, "no trade");
            }
            Ok(SignalOutcome::Trade(signal)) => {
                if let Err(error) = signal.validate() {
                    debug!(%error, bar = i, "invalid signal dropped");
                    continue;
                }
                let fill = exec.fill_index(i, candles.len());
                let fill_bar = &candles[fill];
                let entry_price = exec.entry_price(signal.direction, fill_bar.close);
                let id = account.next_trade_id();
                let trade = Trade {
                    id,
                    instrument: instrument.name.clone(),
                    direction: signal.direction,
                    entry_index: fill,
                    entry_time: fill_bar.timestamp,
                    entry_price,
                    stop_loss: signal.stop_loss,
                    take_profit: signal.take_profit,
                    volume_lots: signal.volume_lots,
                    reason: signal.reason,
                    exit: None,
                };
                if let Err(error) = account.register_trade(trade) {
                    debug!(%error, bar = i, "entry rejected");
                }
            }
        }
    }

    // Forced close of anything still open on the final bar.
    let last_index = candles.len() - 1;
    let last_bar = &candles[last_index];
    if let Some(direction) = account.open_trade(&instrument.name).map(|t| t.direction) {
        let price = exec.exit_price(direction, last_bar.close);
        if let Err(error) = account.close_open_trade(
            instrument,
            last_index,
            last_bar.timestamp,
            price,
            ExitReason::EndOfData,
        ) {
            debug!(%error, "end-of-data close rejected");
        }
    }

    info!(
        instrument = %instrument.name,
        strategy = strategy.name(),
        trades = account.closed_trades.len(),
        final_balance = account.balance,
        "run complete"
    );
    Ok(RunResult::from_account(account))
}
