//! Journal entry domain types.

use chrono::{DateTime, NaiveDate, Utc};
use receivables_shared::config::LedgerAccount;
use receivables_shared::types::JournalEntryId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of a journal entry.
///
/// Generated postings always have exactly one non-zero side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Chart-of-accounts code, e.g. `12.1`.
    pub account_code: String,
    /// Human-readable account name.
    pub account_name: String,
    /// Debit amount (>= 0).
    pub debit: Decimal,
    /// Credit amount (>= 0).
    pub credit: Decimal,
}

impl JournalLine {
    /// A debit line against the account.
    #[must_use]
    pub fn debit(account: &LedgerAccount, amount: Decimal) -> Self {
        Self {
            account_code: account.code.clone(),
            account_name: account.name.clone(),
            debit: amount,
            credit: Decimal::ZERO,
        }
    }

    /// A credit line against the account.
    #[must_use]
    pub fn credit(account: &LedgerAccount, amount: Decimal) -> Self {
        Self {
            account_code: account.code.clone(),
            account_name: account.name.clone(),
            debit: Decimal::ZERO,
            credit: amount,
        }
    }

    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.debit - self.credit
    }
}

/// An entry waiting to be validated and posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJournalEntry {
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Short description.
    pub concept: String,
    /// Business document the entry comes from, e.g. `SALE-<id>`.
    pub reference_document: String,
    /// Entry lines.
    pub lines: Vec<JournalLine>,
}

impl NewJournalEntry {
    /// Creates an entry without lines.
    #[must_use]
    pub fn new(
        entry_date: NaiveDate,
        concept: impl Into<String>,
        reference_document: impl Into<String>,
    ) -> Self {
        Self {
            entry_date,
            concept: concept.into(),
            reference_document: reference_document.into(),
            lines: Vec::new(),
        }
    }

    /// Adds a debit line; zero amounts are skipped.
    #[must_use]
    pub fn debit(mut self, account: &LedgerAccount, amount: Decimal) -> Self {
        if !amount.is_zero() {
            self.lines.push(JournalLine::debit(account, amount));
        }
        self
    }

    /// Adds a credit line; zero amounts are skipped.
    #[must_use]
    pub fn credit(mut self, account: &LedgerAccount, amount: Decimal) -> Self {
        if !amount.is_zero() {
            self.lines.push(JournalLine::credit(account, amount));
        }
        self
    }

    /// Sum of debits.
    #[must_use]
    pub fn total_debit(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit).sum()
    }

    /// Sum of credits.
    #[must_use]
    pub fn total_credit(&self) -> Decimal {
        self.lines.iter().map(|l| l.credit).sum()
    }
}

/// A posted, immutable journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Short description.
    pub concept: String,
    /// Business document the entry comes from.
    pub reference_document: String,
    /// Entry lines.
    pub lines: Vec<JournalLine>,
    /// When the entry was posted.
    pub posted_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Sum of debits.
    #[must_use]
    pub fn total_debit(&self) -> Decimal {
        self.lines.iter().map(|l| l.debit).sum()
    }

    /// Sum of credits.
    #[must_use]
    pub fn total_credit(&self) -> Decimal {
        self.lines.iter().map(|l| l.credit).sum()
    }

    /// Net movement (debit minus credit) on the given account code.
    #[must_use]
    pub fn net_for_account(&self, account_code: &str) -> Decimal {
        self.lines
            .iter()
            .filter(|l| l.account_code == account_code)
            .map(JournalLine::signed_amount)
            .sum()
    }
}
