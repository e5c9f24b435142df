//! Instruments — pip geometry and per-lot pip value for each currency pair.

use serde::{Deserialize, Serialize};

/// Pip size and pip value for one tradeable pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    /// Minimum meaningful price increment (0.01 for JPY crosses, 0.0001 otherwise).
    pub pip_size: f64,
    /// USD value of one pip for a standard lot (100k units).
    pub pip_value_per_lot: f64,
}

/// The pairs the system ships strategy profiles for.
const KNOWN: &[(&str, f64, f64)] = &[
    ("EUR/USD", 0.0001, 10.0),
    ("GBP/USD", 0.0001, 10.0),
    ("EUR/GBP", 0.0001, 12.5),
    ("USD/JPY", 0.01, 9.13),
    ("EUR/JPY", 0.01, 9.28),
    ("GBP/JPY", 0.01, 9.10),
];

impl Instrument {
    /// Look up a known pair.
    pub fn lookup(name: &str) -> Option<Instrument> {
        KNOWN
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|(n, pip_size, pip_value)| Instrument {
                name: (*n).to_string(),
                pip_size: *pip_size,
                pip_value_per_lot: *pip_value,
            })
    }

    /// Resolve a pair to an instrument, falling back to pip geometry derived
    /// from the name for pairs without a table entry (JPY crosses quote to
    /// two decimals, everything else to four).
    pub fn resolve(name: &str) -> Instrument {
        Self::lookup(name).unwrap_or_else(|| {
            let pip_size = if name.contains("JPY") { 0.01 } else { 0.0001 };
            Instrument {
                name: name.to_string(),
                pip_size,
                pip_value_per_lot: 10.0,
            }
        })
    }

    /// Convert a price distance into pips.
    pub fn to_pips(&self, price_distance: f64) -> f64 {
        price_distance / self.pip_size
    }

    /// Convert a pip count into a price distance.
    pub fn to_price(&self, pips: f64) -> f64 {
        pips * self.pip_size
    }
}
