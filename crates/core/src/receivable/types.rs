//! Receivable domain types: installments, collections and their statuses.

use chrono::NaiveDate;
use receivables_shared::types::{
    AccountsReceivableId, CollectionId, InstallmentId, ROUNDING_UNIT,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the customer pays for a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentCondition {
    /// Paid in full at the sale date (a single installment).
    Cash,
    /// Paid in monthly installments.
    Credit,
}

impl PaymentCondition {
    /// Returns the string representation of the condition.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Credit => "CREDIT",
        }
    }

    /// Parses a condition from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CASH" => Some(Self::Cash),
            "CREDIT" => Some(Self::Credit),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a single installment.
///
/// `Paid` is terminal: payments never "unpay" an installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallmentStatus {
    /// Nothing paid and not yet due.
    Pending,
    /// Something paid, not fully settled.
    Partial,
    /// Nothing paid and past its due date.
    Overdue,
    /// Capital and penalty fully settled.
    Paid,
}

impl InstallmentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Partial => "PARTIAL",
            Self::Overdue => "OVERDUE",
            Self::Paid => "PAID",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "PARTIAL" => Some(Self::Partial),
            "OVERDUE" => Some(Self::Overdue),
            "PAID" => Some(Self::Paid),
            _ => None,
        }
    }
}

impl fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of an accounts-receivable aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Debt outstanding.
    Active,
    /// Every installment settled.
    Paid,
    /// Cancelled together with its sale (sticky).
    Cancelled,
    /// Written off as uncollectible (sticky).
    BadDebt,
}

impl AccountStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Paid => "PAID",
            Self::Cancelled => "CANCELLED",
            Self::BadDebt => "BAD_DEBT",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Some(Self::Active),
            "PAID" => Some(Self::Paid),
            "CANCELLED" => Some(Self::Cancelled),
            "BAD_DEBT" => Some(Self::BadDebt),
            _ => None,
        }
    }

    /// Returns true if new collections may be applied.
    #[must_use]
    pub fn accepts_payments(&self) -> bool {
        matches!(self, Self::Active | Self::BadDebt)
    }

    /// Returns true if automatic recomputation must leave the status alone.
    #[must_use]
    pub fn is_sticky(&self) -> bool {
        matches!(self, Self::Cancelled | Self::BadDebt)
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a recorded collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollectionStatus {
    /// Counts towards the account.
    Active,
    /// Voided by a cancellation; kept for history.
    Void,
}

impl fmt::Display for CollectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Void => write!(f, "VOID"),
        }
    }
}

/// One scheduled payment obligation within an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    /// Unique identifier.
    pub id: InstallmentId,
    /// Sequence number, 1..N within the account.
    pub number: u32,
    /// Date the installment falls due.
    pub due_date: NaiveDate,
    /// Capital expected for this installment.
    pub expected_amount: Decimal,
    /// Capital collected so far (never above `expected_amount`).
    pub paid_amount: Decimal,
    /// Penalty collected so far.
    pub paid_penalty: Decimal,
    /// Capital cancelled by returned goods.
    #[serde(default)]
    pub returned_amount: Decimal,
    /// Current status.
    pub status: InstallmentStatus,
}

impl Installment {
    /// Creates a new, unpaid installment.
    #[must_use]
    pub fn new(number: u32, due_date: NaiveDate, expected_amount: Decimal) -> Self {
        Self {
            id: InstallmentId::new(),
            number,
            due_date,
            expected_amount,
            paid_amount: Decimal::ZERO,
            paid_penalty: Decimal::ZERO,
            returned_amount: Decimal::ZERO,
            status: InstallmentStatus::Pending,
        }
    }

    /// Capital still owed on this installment, net of returns.
    #[must_use]
    pub fn pending_capital(&self) -> Decimal {
        (self.expected_amount - self.paid_amount - self.returned_amount).max(Decimal::ZERO)
    }

    /// Returns true if the capital is settled (paid or returned) within the rounding unit.
    #[must_use]
    pub fn is_capital_paid(&self) -> bool {
        self.paid_amount + self.returned_amount >= self.expected_amount - ROUNDING_UNIT
    }

    /// Returns true once anything (capital or penalty) has been collected.
    #[must_use]
    pub fn has_payments(&self) -> bool {
        self.paid_amount > Decimal::ZERO || self.paid_penalty > Decimal::ZERO
    }

    /// Returns true if the installment is unsettled and past its due date.
    #[must_use]
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        self.status != InstallmentStatus::Paid && as_of > self.due_date
    }
}

/// The part of a payment that landed on one installment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentAllocation {
    /// The installment that received funds.
    pub installment_id: InstallmentId,
    /// Its sequence number.
    pub number: u32,
    /// Amount applied to pending penalty.
    pub penalty: Decimal,
    /// Amount applied to capital.
    pub capital: Decimal,
}

impl InstallmentAllocation {
    /// Total applied to the installment.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.penalty + self.capital
    }
}

/// Result of running a payment through the allocation waterfall.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAllocation {
    /// Per-installment breakdown, in the order funds were applied.
    pub allocations: Vec<InstallmentAllocation>,
    /// Amount no selected installment could absorb.
    pub unallocated: Decimal,
}

impl PaymentAllocation {
    /// Total applied to penalties.
    #[must_use]
    pub fn penalty_total(&self) -> Decimal {
        self.allocations.iter().map(|a| a.penalty).sum()
    }

    /// Total applied to capital.
    #[must_use]
    pub fn capital_total(&self) -> Decimal {
        self.allocations.iter().map(|a| a.capital).sum()
    }

    /// Total applied to installments.
    #[must_use]
    pub fn allocated_total(&self) -> Decimal {
        self.penalty_total() + self.capital_total()
    }
}

/// A recorded incoming payment.
///
/// Immutable once recorded except for the void transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Unique identifier.
    pub id: CollectionId,
    /// The account the payment was applied to.
    pub account_id: AccountsReceivableId,
    /// Installment explicitly targeted by the payer, if any.
    pub installment_id: Option<InstallmentId>,
    /// Amount received.
    pub amount: Decimal,
    /// Date the payment was received.
    pub collection_date: NaiveDate,
    /// External reference (receipt, bank operation number).
    pub reference_number: Option<String>,
    /// Current status.
    pub status: CollectionStatus,
    /// How the amount was distributed over installments.
    pub allocations: Vec<InstallmentAllocation>,
    /// Portion kept as customer credit.
    pub held_as_credit: Decimal,
}

/// How a return was absorbed by an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnApplication {
    /// Part that cancelled capital still owed.
    pub receivable: Decimal,
    /// Part exceeding what was owed, held as customer credit.
    pub credit: Decimal,
    /// True once the cumulative return covers the whole total.
    pub fully_returned: bool,
}

impl Collection {
    /// Returns true if the collection has not been voided.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == CollectionStatus::Active
    }

    /// Marks the collection as void. Returns false if it was already void.
    pub fn void(&mut self) -> bool {
        if self.status == CollectionStatus::Void {
            return false;
        }
        self.status = CollectionStatus::Void;
        true
    }
}
