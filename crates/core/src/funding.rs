//! Funding aggregate derivation and reward-point conversion.
//!
//! `current_funding` is mutated only inside the approval transaction; the
//! funding status is always recomputed from the stored amounts, never
//! toggled independently.

use rust_decimal::Decimal;

/// Project still accepting contributions toward its target.
pub const FUNDING_OPEN: &str = "open";

/// Project whose funding total has reached or passed its target.
pub const FUNDING_FULLY_FUNDED: &str = "fully_funded";

/// Derive the funding status from a funding total and target.
///
/// `fully_funded` if and only if `current_funding >= target_amount`.
/// Over-funding is permitted; the status does not regress.
pub fn derive_status(current_funding: Decimal, target_amount: Decimal) -> &'static str {
    if current_funding >= target_amount {
        FUNDING_FULLY_FUNDED
    } else {
        FUNDING_OPEN
    }
}

/// Reward points credited for an approved contribution amount.
///
/// One point per whole currency unit, truncated toward zero.
pub fn reward_points(amount: Decimal) -> i64 {
    use rust_decimal::prelude::ToPrimitive;
    amount.trunc().to_i64().unwrap_or(0)
}
