//! Domain types: candles, zones, trades, accounts, instruments.

pub mod account;
pub mod candle;
pub mod instrument;
pub mod trade;
pub mod zone;

pub use account::{AccountError, AccountState};
pub use candle::Candle;
pub use instrument::Instrument;
pub use trade::{Direction, ExitReason, Trade, TradeError, TradeExit, TradeState};
pub use zone::{Zone, ZoneKind};
