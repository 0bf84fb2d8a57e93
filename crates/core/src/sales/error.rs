//! Sales ledger error types.

use receivables_shared::AppError;
use receivables_shared::types::{AccountsReceivableId, SaleId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::journal::JournalError;
use crate::receivable::ReceivableError;

/// Errors that can occur in the sales ledger.
#[derive(Debug, Error)]
pub enum SalesError {
    /// Receivable rule or invariant failure.
    #[error(transparent)]
    Receivable(#[from] ReceivableError),

    /// Journal validation or storage failure.
    #[error(transparent)]
    Journal(#[from] JournalError),

    /// Sale not found.
    #[error("Sale not found: {0}")]
    SaleNotFound(SaleId),

    /// Account not found.
    #[error("Accounts receivable not found: {0}")]
    AccountNotFound(AccountsReceivableId),

    /// Sale is already cancelled.
    #[error("Sale {0} is already cancelled")]
    AlreadyCancelled(SaleId),

    /// Cumulative returns would exceed the sale total.
    #[error("Return of {requested} exceeds the {available} still returnable on sale {sale_id}")]
    ReturnExceedsSale {
        /// The sale.
        sale_id: SaleId,
        /// Amount requested.
        requested: Decimal,
        /// Amount still returnable.
        available: Decimal,
    },

    /// The sales store failed.
    #[error("Sales storage error: {0}")]
    Storage(String),
}

impl SalesError {
    /// Returns the error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Receivable(err) => err.error_code(),
            Self::Journal(err) => err.error_code(),
            Self::SaleNotFound(_) => "SALE_NOT_FOUND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AlreadyCancelled(_) => "ALREADY_CANCELLED",
            Self::ReturnExceedsSale { .. } => "RETURN_EXCEEDS_SALE",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns true for expected business outcomes (as opposed to integrity or storage failures).
    #[must_use]
    pub fn is_business_rule(&self) -> bool {
        match self {
            Self::Receivable(err) => err.is_business_rule(),
            Self::Journal(err) => err.is_business_rule(),
            Self::SaleNotFound(_)
            | Self::AccountNotFound(_)
            | Self::AlreadyCancelled(_)
            | Self::ReturnExceedsSale { .. } => true,
            Self::Storage(_) => false,
        }
    }
}

impl From<SalesError> for AppError {
    fn from(err: SalesError) -> Self {
        match err {
            SalesError::Receivable(err) => err.into(),
            SalesError::Journal(err) => err.into(),
            SalesError::SaleNotFound(_) | SalesError::AccountNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            SalesError::AlreadyCancelled(_) | SalesError::ReturnExceedsSale { .. } => {
                Self::BusinessRule(err.to_string())
            }
            SalesError::Storage(_) => Self::Storage(err.to_string()),
        }
    }
}
