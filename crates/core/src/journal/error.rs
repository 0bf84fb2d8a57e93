//! Journal error types.

use receivables_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while validating or posting journal entries.
#[derive(Debug, Error)]
pub enum JournalError {
    /// Entry has no lines.
    #[error("Journal entry must have at least one line")]
    EmptyEntry,

    /// Debits and credits differ by 0.001 or more.
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// A line is negative, empty, or has both sides set.
    #[error("Invalid line on account {account_code}: {reason}")]
    InvalidLine {
        /// Account code of the offending line.
        account_code: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The journal store failed.
    #[error("Journal storage error: {0}")]
    Storage(String),
}

impl JournalError {
    /// Returns the error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyEntry => "EMPTY_ENTRY",
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::InvalidLine { .. } => "INVALID_LINE",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Journal errors are never expected business outcomes: a rejected entry
    /// means the posting rules produced something inconsistent.
    #[must_use]
    pub fn is_business_rule(&self) -> bool {
        false
    }
}

impl From<JournalError> for AppError {
    fn from(err: JournalError) -> Self {
        match err {
            JournalError::Storage(_) => Self::Storage(err.to_string()),
            _ => Self::Integrity(err.to_string()),
        }
    }
}
