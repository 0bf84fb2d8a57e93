//! Money arithmetic helpers with a single, explicit rounding rule.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every monetary amount is a `rust_decimal::Decimal` and every rounding step
//! goes through [`round_money`], which rounds half-up to two decimal places.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for monetary amounts.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Smallest representable monetary amount (0.01).
///
/// Also the tolerance used when deciding whether capital or penalty is settled.
pub const ROUNDING_UNIT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed difference between debits and credits of a journal entry (0.001).
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Rounds half-up (midpoint away from zero) to the given number of decimal places.
#[must_use]
pub fn round_half_up(value: Decimal, decimal_places: u32) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a monetary amount half-up to two decimal places.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use receivables_shared::types::round_money;
///
/// assert_eq!(round_money(dec!(33.335)), dec!(33.34));
/// assert_eq!(round_money(dec!(33.334)), dec!(33.33));
/// ```
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    round_half_up(value, MONEY_DECIMAL_PLACES)
}

/// Returns true if the amount carries no precision beyond the rounding unit.
#[must_use]
pub fn has_money_precision(value: Decimal) -> bool {
    round_money(value) == value
}
