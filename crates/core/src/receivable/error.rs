//! Receivable error types.
//!
//! Business-rule outcomes (already cancelled, already settled) are expected and
//! surfaced to the caller; integrity violations abort the operation.

use chrono::NaiveDate;
use receivables_shared::AppError;
use receivables_shared::types::{AccountsReceivableId, InstallmentId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::AccountStatus;

/// Errors that can occur during receivable operations.
#[derive(Debug, Error)]
pub enum ReceivableError {
    // ========== Validation Errors ==========
    /// Amount is zero, negative or finer than the rounding unit.
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    /// The installment count splits the total into non-positive installments.
    #[error("Cannot split {total} into {count} installments")]
    InvalidSchedule {
        /// Total being split.
        total: Decimal,
        /// Requested installment count.
        count: u32,
    },

    /// A due date could not be represented.
    #[error("Due date out of range for base date {0}")]
    DateOutOfRange(NaiveDate),

    /// The targeted installment does not belong to the account.
    #[error("Installment not found: {0}")]
    InstallmentNotFound(InstallmentId),

    // ========== State Errors ==========
    /// The account is already cancelled.
    #[error("Account {0} is already cancelled")]
    AlreadyCancelled(AccountsReceivableId),

    /// The account no longer accepts payments.
    #[error("Account {account_id} is {status} and cannot receive payments")]
    AlreadySettled {
        /// The account.
        account_id: AccountsReceivableId,
        /// Its current status.
        status: AccountStatus,
    },

    /// The account is already written off.
    #[error("Account {0} is already written off as bad debt")]
    AlreadyWrittenOff(AccountsReceivableId),

    /// The payment exceeds what the selected installments owe.
    #[error("Payment exceeds the amount due by {unallocated}")]
    Overpayment {
        /// Amount left after the waterfall.
        unallocated: Decimal,
    },

    // ========== Integrity Errors ==========
    /// A monetary invariant of the aggregate would be broken.
    #[error("Receivable invariant violated: {0}")]
    InvariantViolation(String),
}

impl ReceivableError {
    /// Returns the error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidSchedule { .. } => "INVALID_SCHEDULE",
            Self::DateOutOfRange(_) => "DATE_OUT_OF_RANGE",
            Self::InstallmentNotFound(_) => "INSTALLMENT_NOT_FOUND",
            Self::AlreadyCancelled(_) => "ALREADY_CANCELLED",
            Self::AlreadySettled { .. } => "ALREADY_SETTLED",
            Self::AlreadyWrittenOff(_) => "ALREADY_WRITTEN_OFF",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::InvariantViolation(_) => "INVARIANT_VIOLATION",
        }
    }

    /// Returns true for expected business outcomes (as opposed to integrity failures).
    #[must_use]
    pub fn is_business_rule(&self) -> bool {
        !matches!(self, Self::InvariantViolation(_))
    }
}

impl From<ReceivableError> for AppError {
    fn from(err: ReceivableError) -> Self {
        match err {
            ReceivableError::InvalidAmount(_)
            | ReceivableError::InvalidSchedule { .. }
            | ReceivableError::DateOutOfRange(_) => Self::Validation(err.to_string()),
            ReceivableError::InstallmentNotFound(_) => Self::NotFound(err.to_string()),
            ReceivableError::AlreadyCancelled(_)
            | ReceivableError::AlreadySettled { .. }
            | ReceivableError::AlreadyWrittenOff(_)
            | ReceivableError::Overpayment { .. } => Self::BusinessRule(err.to_string()),
            ReceivableError::InvariantViolation(_) => Self::Integrity(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ReceivableError::InvalidAmount(dec!(-1)).error_code(),
            "INVALID_AMOUNT"
        );
        assert_eq!(
            ReceivableError::AlreadyCancelled(AccountsReceivableId::new()).error_code(),
            "ALREADY_CANCELLED"
        );
        assert_eq!(
            ReceivableError::AlreadySettled {
                account_id: AccountsReceivableId::new(),
                status: AccountStatus::Paid,
            }
            .error_code(),
            "ALREADY_SETTLED"
        );
    }

    #[test]
    fn test_business_rule_split() {
        assert!(ReceivableError::AlreadyCancelled(AccountsReceivableId::new()).is_business_rule());
        assert!(ReceivableError::Overpayment { unallocated: dec!(1) }.is_business_rule());
        assert!(!ReceivableError::InvariantViolation("x".into()).is_business_rule());
    }

    #[test]
    fn test_error_display() {
        let id = AccountsReceivableId::new();
        let err = ReceivableError::AlreadySettled {
            account_id: id,
            status: AccountStatus::Cancelled,
        };
        assert_eq!(
            err.to_string(),
            format!("Account {id} is CANCELLED and cannot receive payments")
        );
        let err = ReceivableError::InvalidSchedule {
            total: dec!(0.03),
            count: 5,
        };
        assert_eq!(err.to_string(), "Cannot split 0.03 into 5 installments");
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = ReceivableError::InvalidAmount(dec!(0)).into();
        assert_eq!(app.error_code(), "VALIDATION_ERROR");
        let app: AppError = ReceivableError::InvariantViolation("x".into()).into();
        assert_eq!(app.error_code(), "INTEGRITY_VIOLATION");
    }
}
