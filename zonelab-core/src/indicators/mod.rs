//! Numeric indicators used by the entry filters and the structure-break
//! strategy. Everything here is a pure function of the candle slice.

pub mod atr;
pub mod swing;

pub use atr::{atr, true_range};
pub use swing::{swing_highs, swing_lows, SwingPoint};
