//! The accounts-receivable aggregate.
//!
//! An `AccountsReceivable` owns its installments and collections by value.
//! Every mutating method either succeeds completely or leaves the aggregate
//! untouched: work is done on a copy, checked against the monetary invariants
//! and only then committed.

use std::cmp::Reverse;

use chrono::NaiveDate;
use receivables_shared::config::OverpaymentPolicy;
use receivables_shared::types::{
    AccountsReceivableId, CollectionId, InstallmentId, SaleId, has_money_precision,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::allocation::AllocationEngine;
use super::error::ReceivableError;
use super::penalty::PenaltyCalculator;
use super::status::{derive_account_status, derive_installment_status};
use super::types::{
    AccountStatus, Collection, CollectionStatus, Installment, InstallmentStatus, PaymentAllocation,
    ReturnApplication,
};

/// A payment to be recorded against an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    /// Amount received.
    pub amount: Decimal,
    /// Installment explicitly targeted, if any.
    pub target: Option<InstallmentId>,
    /// Date the payment was received; penalties accrue up to this date.
    pub collection_date: NaiveDate,
    /// External reference (receipt, bank operation number).
    pub reference_number: Option<String>,
}

/// Money owed on a sale, split into installments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsReceivable {
    /// Unique identifier.
    pub id: AccountsReceivableId,
    /// The sale this account was opened for.
    pub sale_id: SaleId,
    /// Sum of the installments' expected amounts.
    pub total_amount: Decimal,
    /// Current status.
    pub status: AccountStatus,
    /// Installments in sequence order. The count never changes.
    pub installments: Vec<Installment>,
    /// Append-only collection history.
    pub collections: Vec<Collection>,
    /// Overpayments held for the customer.
    pub credit_balance: Decimal,
    /// Sum of goods returned against the sale.
    pub returned_amount: Decimal,
}

/// Point-in-time summary of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatement {
    /// The account.
    pub account_id: AccountsReceivableId,
    /// Status at statement time.
    pub status: AccountStatus,
    /// Statement date.
    pub as_of: NaiveDate,
    /// Original total.
    pub total_amount: Decimal,
    /// Capital collected.
    pub capital_paid: Decimal,
    /// Capital still owed.
    pub capital_balance: Decimal,
    /// Penalty collected.
    pub penalty_paid: Decimal,
    /// Penalty accrued and not yet collected.
    pub pending_penalty: Decimal,
    /// Sum of non-void collections.
    pub collected_amount: Decimal,
    /// Overpayments held for the customer.
    pub credit_balance: Decimal,
    /// Goods returned against the sale.
    pub returned_amount: Decimal,
    /// Installments past due and unsettled.
    pub overdue_installments: usize,
    /// The earliest unsettled installment.
    pub next_due: Option<NextDue>,
}

/// The next installment the customer should pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextDue {
    /// Sequence number.
    pub number: u32,
    /// Due date.
    pub due_date: NaiveDate,
    /// Capital still owed on it.
    pub capital: Decimal,
    /// Penalty accrued on it.
    pub penalty: Decimal,
}

impl AccountsReceivable {
    /// Opens an account over a freshly generated schedule.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation` if the schedule is empty or malformed.
    pub fn open(sale_id: SaleId, installments: Vec<Installment>) -> Result<Self, ReceivableError> {
        let total_amount = installments.iter().map(|i| i.expected_amount).sum();
        let account = Self {
            id: AccountsReceivableId::new(),
            sale_id,
            total_amount,
            status: AccountStatus::Active,
            installments,
            collections: Vec::new(),
            credit_balance: Decimal::ZERO,
            returned_amount: Decimal::ZERO,
        };
        account.verify_invariants()?;
        Ok(account)
    }

    /// Looks up an installment of this account.
    #[must_use]
    pub fn installment(&self, id: InstallmentId) -> Option<&Installment> {
        self.installments.iter().find(|i| i.id == id)
    }

    /// Applies a payment through the allocation waterfall and re-derives statuses.
    ///
    /// The unallocated remainder is returned, not kept.
    ///
    /// # Errors
    ///
    /// - `AlreadySettled` if the account is `Paid` or `Cancelled`
    /// - `InvalidAmount` / `InstallmentNotFound` from the allocation engine
    /// - `InvariantViolation` if the result would break a monetary invariant
    pub fn apply_payment(
        &mut self,
        amount: Decimal,
        target: Option<InstallmentId>,
        as_of: NaiveDate,
        calculator: &PenaltyCalculator,
    ) -> Result<PaymentAllocation, ReceivableError> {
        self.ensure_accepts_payments()?;

        let mut installments = self.installments.clone();
        let allocation =
            AllocationEngine::apply(&mut installments, amount, target, as_of, calculator)?;

        if allocation.allocated_total() + allocation.unallocated != amount {
            return Err(ReceivableError::InvariantViolation(format!(
                "allocation of {amount} does not add up"
            )));
        }
        Self::verify_installments(&installments)?;

        self.installments = installments;
        self.refresh_statuses(as_of, calculator);
        Ok(allocation)
    }

    /// Applies a payment and appends it to the collection history.
    ///
    /// The unallocated remainder is handled by `policy`: rejected outright, or
    /// held as customer credit on the account.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::apply_payment`], plus `Overpayment` under the
    /// `Reject` policy. The account is unchanged on error.
    pub fn record_collection(
        &mut self,
        request: PaymentRequest,
        calculator: &PenaltyCalculator,
        policy: OverpaymentPolicy,
    ) -> Result<Collection, ReceivableError> {
        let mut next = self.clone();
        let allocation = next.apply_payment(
            request.amount,
            request.target,
            request.collection_date,
            calculator,
        )?;

        let held_as_credit = if allocation.unallocated > Decimal::ZERO {
            match policy {
                OverpaymentPolicy::Reject => {
                    return Err(ReceivableError::Overpayment {
                        unallocated: allocation.unallocated,
                    });
                }
                OverpaymentPolicy::HoldAsCredit => allocation.unallocated,
            }
        } else {
            Decimal::ZERO
        };
        next.credit_balance += held_as_credit;

        let collection = Collection {
            id: CollectionId::new(),
            account_id: self.id,
            installment_id: request.target,
            amount: request.amount,
            collection_date: request.collection_date,
            reference_number: request.reference_number,
            status: CollectionStatus::Active,
            allocations: allocation.allocations,
            held_as_credit,
        };
        next.collections.push(collection.clone());
        next.verify_invariants()?;

        *self = next;
        Ok(collection)
    }

    /// Cancels the account and voids every active collection.
    ///
    /// Installments are left as they are. Capital already collected and not
    /// offset by returns is moved to the customer's credit balance. Returns
    /// the number of collections voided.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCancelled` if the account is already cancelled; nothing changes.
    pub fn cancel(&mut self) -> Result<usize, ReceivableError> {
        if self.status == AccountStatus::Cancelled {
            return Err(ReceivableError::AlreadyCancelled(self.id));
        }

        self.credit_balance += self.refundable_capital();
        self.status = AccountStatus::Cancelled;
        Ok(self
            .collections
            .iter_mut()
            .map(Collection::void)
            .filter(|voided| *voided)
            .count())
    }

    /// Writes the account off as uncollectible.
    ///
    /// # Errors
    ///
    /// - `AlreadyWrittenOff` if the account is already `BadDebt`
    /// - `AlreadySettled` if the account is `Paid` or `Cancelled`
    pub fn write_off(&mut self) -> Result<(), ReceivableError> {
        match self.status {
            AccountStatus::Active => {
                self.status = AccountStatus::BadDebt;
                Ok(())
            }
            AccountStatus::BadDebt => Err(ReceivableError::AlreadyWrittenOff(self.id)),
            status @ (AccountStatus::Paid | AccountStatus::Cancelled) => {
                Err(ReceivableError::AlreadySettled {
                    account_id: self.id,
                    status,
                })
            }
        }
    }

    /// Records goods returned against the sale.
    ///
    /// The returned amount cancels capital still owed, latest due date first.
    /// Whatever exceeds what is owed was already paid and is held as customer
    /// credit.
    ///
    /// # Errors
    ///
    /// - `AlreadyCancelled` if the account is cancelled
    /// - `InvalidAmount` if the amount is not a positive cent amount
    /// - `InvariantViolation` if the cumulative return would exceed the total
    pub fn record_return(
        &mut self,
        amount: Decimal,
        as_of: NaiveDate,
        calculator: &PenaltyCalculator,
    ) -> Result<ReturnApplication, ReceivableError> {
        if self.status == AccountStatus::Cancelled {
            return Err(ReceivableError::AlreadyCancelled(self.id));
        }
        if amount <= Decimal::ZERO || !has_money_precision(amount) {
            return Err(ReceivableError::InvalidAmount(amount));
        }

        let returned = self.returned_amount + amount;
        if returned > self.total_amount {
            return Err(ReceivableError::InvariantViolation(format!(
                "returned {returned} exceeds account total {}",
                self.total_amount
            )));
        }

        let mut next = self.clone();
        let mut order: Vec<usize> = (0..next.installments.len())
            .filter(|&index| next.installments[index].status != InstallmentStatus::Paid)
            .collect();
        order.sort_by_key(|&index| {
            let installment = &next.installments[index];
            Reverse((installment.due_date, installment.number))
        });

        let mut remaining = amount;
        for index in order {
            if remaining <= Decimal::ZERO {
                break;
            }
            let installment = &mut next.installments[index];
            let cancelled = installment.pending_capital().min(remaining);
            installment.returned_amount += cancelled;
            remaining -= cancelled;
        }

        next.returned_amount = returned;
        next.credit_balance += remaining;
        next.verify_invariants()?;
        next.refresh_statuses(as_of, calculator);

        *self = next;
        Ok(ReturnApplication {
            receivable: amount - remaining,
            credit: remaining,
            fully_returned: returned == self.total_amount,
        })
    }

    /// Re-derives every installment status and then the account status.
    ///
    /// Cancelled accounts are frozen and left as they are.
    pub fn refresh_statuses(&mut self, as_of: NaiveDate, calculator: &PenaltyCalculator) {
        if self.status == AccountStatus::Cancelled {
            return;
        }

        for installment in &mut self.installments {
            let pending_penalty = calculator.pending(installment, as_of);
            installment.status = derive_installment_status(installment, pending_penalty, as_of);
        }
        self.status = derive_account_status(self.status, &self.installments);
    }

    /// Checks the aggregate's monetary invariants.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation` describing the first broken invariant.
    pub fn verify_invariants(&self) -> Result<(), ReceivableError> {
        Self::verify_installments(&self.installments)?;

        let expected: Decimal = self.installments.iter().map(|i| i.expected_amount).sum();
        if expected != self.total_amount {
            return Err(ReceivableError::InvariantViolation(format!(
                "installments sum to {expected} but account total is {}",
                self.total_amount
            )));
        }
        if self.credit_balance < Decimal::ZERO {
            return Err(ReceivableError::InvariantViolation(format!(
                "negative credit balance {}",
                self.credit_balance
            )));
        }
        if self.returned_amount < Decimal::ZERO || self.returned_amount > self.total_amount {
            return Err(ReceivableError::InvariantViolation(format!(
                "returned amount {} outside 0..={}",
                self.returned_amount, self.total_amount
            )));
        }
        Ok(())
    }

    fn verify_installments(installments: &[Installment]) -> Result<(), ReceivableError> {
        if installments.is_empty() {
            return Err(ReceivableError::InvariantViolation(
                "account has no installments".to_string(),
            ));
        }

        for (index, installment) in installments.iter().enumerate() {
            if usize::try_from(installment.number).ok() != Some(index + 1) {
                return Err(ReceivableError::InvariantViolation(format!(
                    "installment at position {} is numbered {}",
                    index + 1,
                    installment.number
                )));
            }
            if installment.expected_amount <= Decimal::ZERO {
                return Err(ReceivableError::InvariantViolation(format!(
                    "installment {} expects {}",
                    installment.number, installment.expected_amount
                )));
            }
            if installment.paid_amount < Decimal::ZERO
                || installment.returned_amount < Decimal::ZERO
                || installment.paid_amount + installment.returned_amount
                    > installment.expected_amount
            {
                return Err(ReceivableError::InvariantViolation(format!(
                    "installment {} paid {} and returned {} of {}",
                    installment.number,
                    installment.paid_amount,
                    installment.returned_amount,
                    installment.expected_amount
                )));
            }
            if installment.paid_penalty < Decimal::ZERO {
                return Err(ReceivableError::InvariantViolation(format!(
                    "installment {} has negative paid penalty",
                    installment.number
                )));
            }
        }
        Ok(())
    }

    fn ensure_accepts_payments(&self) -> Result<(), ReceivableError> {
        if self.status.accepts_payments() {
            Ok(())
        } else {
            Err(ReceivableError::AlreadySettled {
                account_id: self.id,
                status: self.status,
            })
        }
    }

    /// Capital collected across all installments.
    #[must_use]
    pub fn capital_paid(&self) -> Decimal {
        self.installments.iter().map(|i| i.paid_amount).sum()
    }

    /// Capital still owed across all installments, net of returns.
    #[must_use]
    pub fn capital_balance(&self) -> Decimal {
        self.installments.iter().map(Installment::pending_capital).sum()
    }

    /// Capital collected that returns have not yet offset: what the customer
    /// gets back as credit if the sale is cancelled.
    #[must_use]
    pub fn refundable_capital(&self) -> Decimal {
        (self.total_amount - self.returned_amount - self.capital_balance()).max(Decimal::ZERO)
    }

    /// Penalty accrued and not yet collected, as of the given date.
    #[must_use]
    pub fn pending_penalty(&self, as_of: NaiveDate, calculator: &PenaltyCalculator) -> Decimal {
        self.installments
            .iter()
            .map(|i| calculator.pending(i, as_of))
            .sum()
    }

    /// Sum of non-void collections.
    #[must_use]
    pub fn collected_amount(&self) -> Decimal {
        self.collections
            .iter()
            .filter(|c| c.is_active())
            .map(|c| c.amount)
            .sum()
    }

    /// Returns true if any installment is unsettled past its due date.
    #[must_use]
    pub fn has_overdue_installments(&self, as_of: NaiveDate) -> bool {
        self.installments.iter().any(|i| i.is_overdue(as_of))
    }

    /// Builds a statement of the account as of the given date.
    #[must_use]
    pub fn statement(&self, as_of: NaiveDate, calculator: &PenaltyCalculator) -> AccountStatement {
        let next_due = self
            .installments
            .iter()
            .filter(|i| i.status != InstallmentStatus::Paid)
            .min_by_key(|i| (i.due_date, i.number))
            .map(|i| NextDue {
                number: i.number,
                due_date: i.due_date,
                capital: i.pending_capital(),
                penalty: calculator.pending(i, as_of),
            });

        AccountStatement {
            account_id: self.id,
            status: self.status,
            as_of,
            total_amount: self.total_amount,
            capital_paid: self.capital_paid(),
            capital_balance: self.capital_balance(),
            penalty_paid: self.installments.iter().map(|i| i.paid_penalty).sum(),
            pending_penalty: self.pending_penalty(as_of, calculator),
            collected_amount: self.collected_amount(),
            credit_balance: self.credit_balance,
            returned_amount: self.returned_amount,
            overdue_installments: self
                .installments
                .iter()
                .filter(|i| i.is_overdue(as_of))
                .count(),
            next_due,
        }
    }
}
