//! Installment schedule generation.
//!
//! A credit sale is split into N monthly installments of `round(total / N)`,
//! with the last installment absorbing the rounding remainder so that the
//! expected amounts always sum to the total exactly.

use chrono::{Months, NaiveDate};
use receivables_shared::types::{has_money_precision, round_money};
use rust_decimal::Decimal;

use super::error::ReceivableError;
use super::types::{Installment, PaymentCondition};

/// Normalizes the requested installment count.
///
/// Cash sales always have one installment; a non-positive count is treated as one.
#[must_use]
pub fn normalize_installment_count(condition: PaymentCondition, requested: i32) -> u32 {
    match condition {
        PaymentCondition::Cash => 1,
        PaymentCondition::Credit => u32::try_from(requested).unwrap_or(0).max(1),
    }
}

/// Builds the installment schedule for a sale.
///
/// - CASH: one installment due at `base_date` for the whole total.
/// - CREDIT: installment `i` (1-based) is due `i` months after `base_date`;
///   installments 1..N-1 carry `round(total / N)` and installment N carries the remainder.
///
/// Month arithmetic clamps to the last day of shorter months (Jan 31 + 1 month = Feb 28/29).
///
/// # Errors
///
/// - `InvalidAmount` if the total is not positive or has sub-cent precision
/// - `InvalidSchedule` if the count leaves the last installment non-positive
/// - `DateOutOfRange` if a due date overflows the calendar
pub fn create_installment_schedule(
    total: Decimal,
    condition: PaymentCondition,
    installment_count: i32,
    base_date: NaiveDate,
) -> Result<Vec<Installment>, ReceivableError> {
    if total <= Decimal::ZERO || !has_money_precision(total) {
        return Err(ReceivableError::InvalidAmount(total));
    }

    let count = normalize_installment_count(condition, installment_count);

    if condition == PaymentCondition::Cash {
        return Ok(vec![Installment::new(1, base_date, total)]);
    }

    let regular = round_money(total / Decimal::from(count));
    let last = round_money(total - regular * Decimal::from(count - 1));
    if last <= Decimal::ZERO {
        return Err(ReceivableError::InvalidSchedule { total, count });
    }

    (1..=count)
        .map(|number| {
            let due_date = base_date
                .checked_add_months(Months::new(number))
                .ok_or(ReceivableError::DateOutOfRange(base_date))?;
            let amount = if number == count { last } else { regular };
            Ok(Installment::new(number, due_date, amount))
        })
        .collect()
}
