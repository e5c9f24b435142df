//! Position sizing — convert a target dollar risk into lots.

use crate::signals::SignalError;

/// Stop distances below this many pips are treated as no distance at all.
const MIN_RISK_PIPS: f64 = 1e-6;

/// Lots to trade so a stop-out loses approximately `target_risk_usd`.
///
/// `size = target_risk_usd / (risk_pips × pip_value_per_lot)`, clamped to
/// `[min_lot, max_lot]` and rounded to standard 0.01-lot precision.
///
/// A vanishing stop distance is an invalid signal, not a division.
pub fn position_size(
    target_risk_usd: f64,
    risk_pips: f64,
    pip_value_per_lot: f64,
    min_lot: f64,
    max_lot: f64,
) -> Result<f64, SignalError> {
    if risk_pips <= MIN_RISK_PIPS || !risk_pips.is_finite() {
        return Err(SignalError::Invalid(format!(
            "stop distance of {risk_pips} pips cannot be sized"
        )));
    }
    let ideal = target_risk_usd / (risk_pips * pip_value_per_lot);
    let clamped = ideal.clamp(min_lot, max_lot);
    Ok((clamped * 100.0).round() / 100.0)
}
