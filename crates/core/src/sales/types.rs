//! Sales domain types and the inputs/outcomes of the sales ledger.

use chrono::NaiveDate;
use receivables_shared::types::{
    AccountsReceivableId, CollectionId, InstallmentId, SaleId, SaleReturnId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::journal::JournalEntry;
use crate::receivable::{AccountStatus, AccountsReceivable, Collection, PaymentCondition};

/// Sale status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    /// Issued and in force.
    Issued,
    /// Cancelled (terminal).
    Cancelled,
}

impl SaleStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issued => "ISSUED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ISSUED" => Some(Self::Issued),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A sale and the reference to the account that finances it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    /// Unique identifier.
    pub id: SaleId,
    /// Tax-inclusive total.
    pub total_amount: Decimal,
    /// Cash or credit.
    pub payment_condition: PaymentCondition,
    /// Date of sale; installment due dates are computed from it.
    pub sale_date: NaiveDate,
    /// Current status.
    pub status: SaleStatus,
    /// The accounts-receivable aggregate created with the sale.
    pub account_id: AccountsReceivableId,
}

impl Sale {
    /// Reference document of the sale posting.
    #[must_use]
    pub fn reference(&self) -> String {
        format!("SALE-{}", self.id)
    }

    /// Reference document of the cancellation posting.
    #[must_use]
    pub fn reversal_reference(&self) -> String {
        format!("SALE-{}-REV", self.id)
    }

    /// Returns true if the sale is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status == SaleStatus::Cancelled
    }
}

/// Goods returned against a sale, documented by a credit note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleReturn {
    /// Unique identifier.
    pub id: SaleReturnId,
    /// The sale the goods came from.
    pub sale_id: SaleId,
    /// Tax-inclusive amount returned.
    pub amount: Decimal,
    /// Why the goods came back.
    pub reason: String,
    /// Date of the return.
    pub return_date: NaiveDate,
}

impl SaleReturn {
    /// Reference document of the credit-note posting.
    #[must_use]
    pub fn reference(&self) -> String {
        format!("RET-{}", self.id)
    }
}

/// Reference document of a collection posting.
#[must_use]
pub fn collection_reference(id: CollectionId) -> String {
    format!("COL-{id}")
}

/// Input for creating a sale.
#[derive(Debug, Clone)]
pub struct CreateSaleInput {
    /// Tax-inclusive total.
    pub total_amount: Decimal,
    /// Cash or credit.
    pub payment_condition: PaymentCondition,
    /// Requested installment count; ignored for cash, non-positive means one.
    pub installment_count: i32,
    /// Date of sale.
    pub sale_date: NaiveDate,
}

/// Input for registering a collection.
#[derive(Debug, Clone)]
pub struct RegisterCollectionInput {
    /// The account being paid.
    pub account_id: AccountsReceivableId,
    /// Amount received.
    pub amount: Decimal,
    /// Installment explicitly targeted, if any.
    pub installment_id: Option<InstallmentId>,
    /// Date the payment was received.
    pub collection_date: NaiveDate,
    /// External reference (receipt, bank operation number).
    pub reference_number: Option<String>,
}

/// Input for registering a return.
#[derive(Debug, Clone)]
pub struct RegisterReturnInput {
    /// The sale the goods came from.
    pub sale_id: SaleId,
    /// Tax-inclusive amount returned.
    pub amount: Decimal,
    /// Why the goods came back.
    pub reason: String,
    /// Date of the return.
    pub return_date: NaiveDate,
}

/// Result of creating a sale.
#[derive(Debug, Clone)]
pub struct SaleCreated {
    /// The sale.
    pub sale: Sale,
    /// Its accounts-receivable aggregate.
    pub account: AccountsReceivable,
    /// The sale posting.
    pub journal_entry: JournalEntry,
}

/// Result of registering a collection.
#[derive(Debug, Clone)]
pub struct CollectionRecorded {
    /// The recorded collection with its allocation breakdown.
    pub collection: Collection,
    /// Account status after the payment.
    pub account_status: AccountStatus,
    /// The payment posting.
    pub journal_entry: JournalEntry,
}

/// Result of cancelling a sale.
#[derive(Debug, Clone)]
pub struct SaleCancelled {
    /// The cancelled sale.
    pub sale: Sale,
    /// Number of collections voided.
    pub voided_collections: usize,
    /// The reversing posting; absent when nothing was left to reverse.
    pub reversal: Option<JournalEntry>,
}

/// Result of registering a return.
#[derive(Debug, Clone)]
pub struct ReturnRegistered {
    /// The recorded return.
    pub sale_return: SaleReturn,
    /// The credit-note posting.
    pub journal_entry: JournalEntry,
    /// Set when the return completed a full return and cancelled the sale.
    pub cancellation: Option<SaleCancelled>,
}
