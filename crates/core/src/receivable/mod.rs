//! Accounts-receivable ledger.
//!
//! This module turns a sale total into installments and keeps them in sync with
//! incoming payments:
//! - Installment schedule generation
//! - Late-payment penalty calculation
//! - Payment allocation (penalty first, then capital, oldest first)
//! - Installment and account status derivation
//! - The `AccountsReceivable` aggregate

pub mod account;
pub mod allocation;
pub mod error;
pub mod penalty;
pub mod schedule;
pub mod status;
pub mod types;

#[cfg(test)]
mod allocation_props;
#[cfg(test)]
mod penalty_props;
#[cfg(test)]
mod schedule_props;

pub use account::{AccountStatement, AccountsReceivable, NextDue, PaymentRequest};
pub use allocation::AllocationEngine;
pub use error::ReceivableError;
pub use penalty::PenaltyCalculator;
pub use schedule::{create_installment_schedule, normalize_installment_count};
pub use status::{derive_account_status, derive_installment_status};
pub use types::{
    AccountStatus, Collection, CollectionStatus, Installment, InstallmentAllocation,
    InstallmentStatus, PaymentAllocation, PaymentCondition, ReturnApplication,
};
