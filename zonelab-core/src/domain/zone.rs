//! Supply/demand zones — price bands left behind by a base→impulse pattern.

use serde::{Deserialize, Serialize};

/// Which side of the market a zone belongs to.
///
/// Demand zones form below price and attract buying; supply zones form above
/// price and attract selling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneKind {
    Demand,
    Supply,
}

/// A supply or demand price band.
///
/// `created_at_index` is the index of the impulse candle in the candle slice
/// the zone was detected on. `is_fresh` starts true and flips false exactly
/// once — either when a later bar trades through the zone's far boundary, or
/// when a strategy consumes the zone for an entry. It never reverts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub kind: ZoneKind,
    pub price_low: f64,
    pub price_high: f64,
    pub created_at_index: usize,
    pub is_fresh: bool,
    /// Impulse-to-base range ratio; larger means a more violent departure.
    pub strength: Option<f64>,
}

impl Zone {
    /// Zone height in pips for the given pip size.
    pub fn width_pips(&self, pip_size: f64) -> f64 {
        (self.price_high - self.price_low) / pip_size
    }

    /// Whether `price` sits inside the zone band (inclusive).
    pub fn contains(&self, price: f64) -> bool {
        price >= self.price_low && price <= self.price_high
    }

    /// Whether two zones overlap in price.
    pub fn overlaps(&self, other: &Zone) -> bool {
        !(self.price_high < other.price_low || self.price_low > other.price_high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_zone() -> Zone {
        Zone {
            kind: ZoneKind::Demand,
            price_low: 1.1000,
            price_high: 1.1020,
            created_at_index: 42,
            is_fresh: true,
            strength: Some(3.2),
        }
    }

    #[test]
    fn width_in_pips() {
        let z = sample_zone();
        assert!((z.width_pips(0.0001) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn containment_is_inclusive() {
        let z = sample_zone();
        assert!(z.contains(1.1000));
        assert!(z.contains(1.1020));
        assert!(z.contains(1.1010));
        assert!(!z.contains(1.0999));
        assert!(!z.contains(1.1021));
    }

    #[test]
    fn overlap_detection() {
        let a = sample_zone();
        let mut b = sample_zone();
        b.price_low = 1.1015;
        b.price_high = 1.1040;
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));

        b.price_low = 1.1021;
        assert!(!a.overlaps(&b));
    }
}
