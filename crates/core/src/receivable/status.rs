//! Status derivation for installments and accounts.
//!
//! Both functions are pure: callers invoke them explicitly after every mutation.

use chrono::NaiveDate;
use receivables_shared::types::ROUNDING_UNIT;
use rust_decimal::Decimal;

use super::types::{AccountStatus, Installment, InstallmentStatus};

/// Derives the status of an installment.
///
/// Precedence: `Paid` (capital and penalty settled) → `Partial` (anything
/// collected) → `Overdue` (nothing collected, past due) → `Pending`.
/// `Paid` is terminal and is never left once reached.
#[must_use]
pub fn derive_installment_status(
    installment: &Installment,
    pending_penalty: Decimal,
    as_of: NaiveDate,
) -> InstallmentStatus {
    if installment.status == InstallmentStatus::Paid {
        return InstallmentStatus::Paid;
    }

    let penalty_paid = pending_penalty <= ROUNDING_UNIT;
    if installment.is_capital_paid() && penalty_paid {
        InstallmentStatus::Paid
    } else if installment.has_payments() {
        InstallmentStatus::Partial
    } else if installment.due_date < as_of {
        InstallmentStatus::Overdue
    } else {
        InstallmentStatus::Pending
    }
}

/// Derives the status of an account from its installments.
///
/// `Cancelled` and `BadDebt` are sticky. Otherwise the account is `Paid` iff
/// every installment is `Paid`, and `Active` in any other case.
#[must_use]
pub fn derive_account_status(current: AccountStatus, installments: &[Installment]) -> AccountStatus {
    if current.is_sticky() {
        return current;
    }

    if !installments.is_empty()
        && installments
            .iter()
            .all(|i| i.status == InstallmentStatus::Paid)
    {
        AccountStatus::Paid
    } else {
        AccountStatus::Active
    }
}
