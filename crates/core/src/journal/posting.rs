//! Standard postings generated by the sales ledger.
//!
//! Every total is tax-inclusive. The tax part is
//! `round(gross - gross / (1 + rate))` and the net part takes the remainder, so
//! the two always add back to the gross amount.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use receivables_shared::AppConfig;
use receivables_shared::config::{AccountsConfig, LedgerAccount};
use receivables_shared::types::round_money;
use rust_decimal::Decimal;

use super::entry::{JournalLine, NewJournalEntry};
use crate::receivable::{Collection, ReturnApplication};

/// A tax-inclusive amount split into net and tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxSplit {
    /// Amount before tax.
    pub net: Decimal,
    /// Tax included in the gross amount.
    pub tax: Decimal,
}

/// Chart of accounts and tax rate used to build postings.
#[derive(Debug, Clone)]
pub struct PostingRules {
    accounts: AccountsConfig,
    tax_rate: Decimal,
}

impl PostingRules {
    /// Creates posting rules.
    #[must_use]
    pub fn new(accounts: AccountsConfig, tax_rate: Decimal) -> Self {
        Self { accounts, tax_rate }
    }

    /// Creates posting rules from the application configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.accounts.clone(), config.ledger.tax_rate)
    }

    /// The chart of accounts.
    #[must_use]
    pub fn accounts(&self) -> &AccountsConfig {
        &self.accounts
    }

    /// Splits a tax-inclusive amount.
    #[must_use]
    pub fn split_tax(&self, gross: Decimal) -> TaxSplit {
        let net = gross
            .checked_div(Decimal::ONE + self.tax_rate)
            .unwrap_or(gross);
        let tax = round_money(gross - net);
        TaxSplit {
            net: gross - tax,
            tax,
        }
    }

    /// Sale: debit receivables for the total, credit tax payable and revenue.
    #[must_use]
    pub fn sale_entry(&self, reference: &str, total: Decimal, date: NaiveDate) -> NewJournalEntry {
        let split = self.split_tax(total);
        NewJournalEntry::new(date, "Sale on account", reference)
            .debit(&self.accounts.receivable, total)
            .credit(&self.accounts.tax_payable, split.tax)
            .credit(&self.accounts.revenue, split.net)
    }

    /// Collection: debit cash for the amount received, credit receivables for
    /// capital, late-payment income for penalty and customer advances for any
    /// amount held as credit.
    #[must_use]
    pub fn collection_entry(&self, reference: &str, collection: &Collection) -> NewJournalEntry {
        let capital: Decimal = collection.allocations.iter().map(|a| a.capital).sum();
        let penalty: Decimal = collection.allocations.iter().map(|a| a.penalty).sum();

        NewJournalEntry::new(collection.collection_date, "Collection received", reference)
            .debit(&self.accounts.cash, collection.amount)
            .credit(&self.accounts.receivable, capital)
            .credit(&self.accounts.penalty_income, penalty)
            .credit(&self.accounts.customer_advances, collection.held_as_credit)
    }

    /// Credit note for returned goods: debit sales returns and tax payable,
    /// credit receivables for the capital it cancels and customer advances for
    /// the part the customer had already paid.
    #[must_use]
    pub fn return_entry(
        &self,
        reference: &str,
        applied: &ReturnApplication,
        date: NaiveDate,
    ) -> NewJournalEntry {
        let split = self.split_tax(applied.receivable + applied.credit);
        NewJournalEntry::new(date, "Credit note for returned goods", reference)
            .debit(&self.accounts.sales_returns, split.net)
            .debit(&self.accounts.tax_payable, split.tax)
            .credit(&self.accounts.receivable, applied.receivable)
            .credit(&self.accounts.customer_advances, applied.credit)
    }

    /// Reversing entry for a cancelled sale.
    ///
    /// Revenue, tax and returns lines of `posted` (the sale and its credit
    /// notes) are netted and reversed. The receivable is closed for
    /// `outstanding` and capital already collected moves to customer advances
    /// as `refund`.
    #[must_use]
    pub fn cancellation_entry<'a>(
        &self,
        posted: impl IntoIterator<Item = &'a JournalLine>,
        outstanding: Decimal,
        refund: Decimal,
        date: NaiveDate,
        reference: &str,
    ) -> NewJournalEntry {
        let receivable = self.accounts.receivable.code.as_str();
        let advances = self.accounts.customer_advances.code.as_str();
        let revenue_side = posted
            .into_iter()
            .filter(|line| line.account_code != receivable && line.account_code != advances);

        reversal_of(revenue_side, date, "Sale cancelled", reference)
            .credit(&self.accounts.receivable, outstanding)
            .credit(&self.accounts.customer_advances, refund)
    }
}

/// Builds the entry that brings every account touched by `lines` back to zero.
///
/// For a single entry this swaps its debits and credits. Over a sale and its
/// credit notes it reverses only what is still outstanding. Accounts that
/// already net to zero produce no line, so the result may be empty.
#[must_use]
pub fn reversal_of<'a>(
    lines: impl IntoIterator<Item = &'a JournalLine>,
    date: NaiveDate,
    concept: &str,
    reference: &str,
) -> NewJournalEntry {
    let mut balances: BTreeMap<&str, (&str, Decimal)> = BTreeMap::new();
    let mut order: Vec<&str> = Vec::new();
    for line in lines {
        let slot = balances
            .entry(line.account_code.as_str())
            .or_insert_with(|| {
                order.push(line.account_code.as_str());
                (line.account_name.as_str(), Decimal::ZERO)
            });
        slot.1 += line.signed_amount();
    }

    let mut entry = NewJournalEntry::new(date, concept, reference);
    for code in order {
        let Some(&(name, balance)) = balances.get(code) else {
            continue;
        };
        let account = LedgerAccount::new(code, name);
        entry = if balance > Decimal::ZERO {
            entry.credit(&account, balance)
        } else {
            entry.debit(&account, -balance)
        };
    }
    entry
}
