use rust_decimal::Decimal;

use crate::models::AlertKind;

/// Notional (in currency units) at which a trade is whale-grade.
const WHALE_NOTIONAL: i64 = 10_000;

/// Notional at which a trade is mega-whale-grade.
const MEGA_WHALE_NOTIONAL: i64 = 50_000;

/// Classify a trade's notional into an alert tier. Pure and stateless —
/// safe to call redundantly; at-most-once emission is enforced by the
/// ledger via the alert's trade-id unique key.
pub fn classify(notional: Decimal) -> Option<AlertKind> {
    if notional >= Decimal::from(MEGA_WHALE_NOTIONAL) {
        Some(AlertKind::MegaWhale)
    } else if notional >= Decimal::from(WHALE_NOTIONAL) {
        Some(AlertKind::Whale)
    } else {
        None
    }
}
