//! Sales ledger: composes schedule generation, allocation, status derivation
//! and journal posting for sales, collections, cancellations and returns.

use std::sync::Arc;

use chrono::NaiveDate;
use receivables_shared::AppConfig;
use receivables_shared::config::OverpaymentPolicy;
use receivables_shared::types::{
    AccountsReceivableId, SaleId, SaleReturnId, has_money_precision,
};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::error::SalesError;
use super::locks::AccountLocks;
use super::repository::SalesRepository;
use super::types::{
    CollectionRecorded, CreateSaleInput, RegisterCollectionInput, RegisterReturnInput,
    ReturnRegistered, Sale, SaleCancelled, SaleCreated, SaleReturn, SaleStatus,
    collection_reference,
};
use crate::journal::{
    JournalLine, JournalRepository, JournalService, NewJournalEntry, PostingRules, validate_entry,
};
use crate::receivable::{
    AccountStatement, AccountsReceivable, PaymentRequest, PenaltyCalculator, ReceivableError,
    create_installment_schedule,
};

/// A cancellation computed but not yet persisted.
struct PendingCancellation {
    sale: Sale,
    account: AccountsReceivable,
    voided_collections: usize,
    reversal: Option<NewJournalEntry>,
}

/// Sales ledger service.
///
/// All mutations of one account are serialized through [`AccountLocks`];
/// journal entries are validated before anything is written.
pub struct SalesLedger<R: SalesRepository, J: JournalRepository> {
    repo: Arc<R>,
    journal: JournalService<J>,
    rules: PostingRules,
    calculator: PenaltyCalculator,
    overpayment: OverpaymentPolicy,
    locks: AccountLocks,
}

impl<R: SalesRepository, J: JournalRepository> SalesLedger<R, J> {
    /// Create a new sales ledger.
    #[must_use]
    pub fn new(repo: Arc<R>, journal_repo: Arc<J>, config: &AppConfig) -> Self {
        Self {
            repo,
            journal: JournalService::new(journal_repo),
            rules: PostingRules::from_config(config),
            calculator: PenaltyCalculator::from_config(&config.ledger),
            overpayment: config.ledger.overpayment,
            locks: AccountLocks::new(),
        }
    }

    /// The journal the ledger posts to.
    #[must_use]
    pub fn journal(&self) -> &JournalService<J> {
        &self.journal
    }

    /// The penalty calculator in use.
    #[must_use]
    pub fn calculator(&self) -> &PenaltyCalculator {
        &self.calculator
    }

    /// Creates a sale, its installment schedule and the sale posting.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` / `InvalidSchedule` from schedule generation
    /// - journal validation errors; nothing is persisted in that case
    /// - storage errors
    pub async fn create_sale(&self, input: CreateSaleInput) -> Result<SaleCreated, SalesError> {
        let schedule = create_installment_schedule(
            input.total_amount,
            input.payment_condition,
            input.installment_count,
            input.sale_date,
        )?;

        let sale_id = SaleId::new();
        let mut account = AccountsReceivable::open(sale_id, schedule)?;
        account.refresh_statuses(input.sale_date, &self.calculator);

        let sale = Sale {
            id: sale_id,
            total_amount: account.total_amount,
            payment_condition: input.payment_condition,
            sale_date: input.sale_date,
            status: SaleStatus::Issued,
            account_id: account.id,
        };

        let entry = self
            .rules
            .sale_entry(&sale.reference(), sale.total_amount, sale.sale_date);
        validate_entry(&entry)?;

        self.repo.save(sale.clone(), account.clone()).await?;
        let journal_entry = self.journal.post(entry).await?;

        info!(
            sale_id = %sale.id,
            account_id = %account.id,
            total = %sale.total_amount,
            condition = %sale.payment_condition,
            installments = account.installments.len(),
            "Sale created"
        );

        Ok(SaleCreated {
            sale,
            account,
            journal_entry,
        })
    }

    /// Registers a payment against an account and posts it.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound`
    /// - `AlreadySettled`, `InvalidAmount`, `InstallmentNotFound`, `Overpayment`
    /// - journal and storage errors
    pub async fn register_collection(
        &self,
        input: RegisterCollectionInput,
    ) -> Result<CollectionRecorded, SalesError> {
        let _guard = self.locks.lock(input.account_id).await;
        let mut account = self.load_account(input.account_id).await?;

        let request = PaymentRequest {
            amount: input.amount,
            target: input.installment_id,
            collection_date: input.collection_date,
            reference_number: input.reference_number,
        };
        let collection = account
            .record_collection(request, &self.calculator, self.overpayment)
            .inspect_err(|err| {
                warn!(
                    account_id = %input.account_id,
                    amount = %input.amount,
                    error = %err,
                    "Collection rejected"
                );
            })?;

        let entry = self
            .rules
            .collection_entry(&collection_reference(collection.id), &collection);
        validate_entry(&entry)?;

        self.repo.save_account(account.clone()).await?;
        let journal_entry = self.journal.post(entry).await?;

        let penalty: Decimal = collection.allocations.iter().map(|a| a.penalty).sum();
        info!(
            account_id = %account.id,
            collection_id = %collection.id,
            amount = %collection.amount,
            penalty = %penalty,
            held_as_credit = %collection.held_as_credit,
            status = %account.status,
            "Collection registered"
        );

        Ok(CollectionRecorded {
            collection,
            account_status: account.status,
            journal_entry,
        })
    }

    /// Cancels a sale: the account is cancelled, its collections voided, and
    /// whatever the sale and its credit notes still carry is reversed.
    ///
    /// # Errors
    ///
    /// - `SaleNotFound` / `AccountNotFound`
    /// - `AlreadyCancelled` if the sale is already cancelled
    /// - journal and storage errors
    pub async fn cancel_sale(
        &self,
        sale_id: SaleId,
        date: NaiveDate,
    ) -> Result<SaleCancelled, SalesError> {
        let account_id = self.load_sale(sale_id).await?.account_id;
        let _guard = self.locks.lock(account_id).await;

        let sale = self.load_sale(sale_id).await?;
        let account = self.load_account(account_id).await?;

        let pending = self
            .prepare_cancellation(sale, account, date, &[])
            .await
            .inspect_err(|err| warn!(sale_id = %sale_id, error = %err, "Cancellation rejected"))?;

        self.repo
            .save(pending.sale.clone(), pending.account.clone())
            .await?;
        self.post_cancellation(pending).await
    }

    /// Registers returned goods and posts the credit note.
    ///
    /// A return that brings the cumulative returned amount up to the sale total
    /// cancels the sale.
    ///
    /// # Errors
    ///
    /// - `SaleNotFound` / `AccountNotFound`
    /// - `AlreadyCancelled` if the sale is cancelled
    /// - `InvalidAmount` for a non-positive or sub-cent amount
    /// - `ReturnExceedsSale` if the cumulative return would exceed the sale total
    /// - journal and storage errors
    pub async fn register_return(
        &self,
        input: RegisterReturnInput,
    ) -> Result<ReturnRegistered, SalesError> {
        let account_id = self.load_sale(input.sale_id).await?.account_id;
        let _guard = self.locks.lock(account_id).await;

        let sale = self.load_sale(input.sale_id).await?;
        if sale.is_cancelled() {
            return Err(SalesError::AlreadyCancelled(sale.id));
        }
        let mut account = self.load_account(account_id).await?;

        if input.amount <= Decimal::ZERO || !has_money_precision(input.amount) {
            return Err(ReceivableError::InvalidAmount(input.amount).into());
        }
        let available = sale.total_amount - account.returned_amount;
        if input.amount > available {
            warn!(
                sale_id = %sale.id,
                requested = %input.amount,
                available = %available,
                "Return exceeds sale"
            );
            return Err(SalesError::ReturnExceedsSale {
                sale_id: sale.id,
                requested: input.amount,
                available,
            });
        }

        let applied = account.record_return(input.amount, input.return_date, &self.calculator)?;
        let sale_return = SaleReturn {
            id: SaleReturnId::new(),
            sale_id: sale.id,
            amount: input.amount,
            reason: input.reason,
            return_date: input.return_date,
        };
        let entry = self.rules.return_entry(
            &sale_return.reference(),
            &applied,
            sale_return.return_date,
        );
        validate_entry(&entry)?;

        let cancellation = if applied.fully_returned {
            Some(
                self.prepare_cancellation(sale, account, input.return_date, &entry.lines)
                    .await?,
            )
        } else {
            self.repo.save(sale, account).await?;
            None
        };
        if let Some(pending) = &cancellation {
            self.repo
                .save(pending.sale.clone(), pending.account.clone())
                .await?;
        }

        self.repo.insert_return(sale_return.clone()).await?;
        let journal_entry = self.journal.post(entry).await?;

        info!(
            sale_id = %sale_return.sale_id,
            return_id = %sale_return.id,
            amount = %sale_return.amount,
            credited = %applied.credit,
            fully_returned = applied.fully_returned,
            "Return registered"
        );

        let cancellation = match cancellation {
            Some(pending) => Some(self.post_cancellation(pending).await?),
            None => None,
        };

        Ok(ReturnRegistered {
            sale_return,
            journal_entry,
            cancellation,
        })
    }

    /// Writes an account off as bad debt.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound`
    /// - `AlreadyWrittenOff` / `AlreadySettled`
    /// - storage errors
    pub async fn write_off(
        &self,
        account_id: AccountsReceivableId,
    ) -> Result<AccountsReceivable, SalesError> {
        let _guard = self.locks.lock(account_id).await;
        let mut account = self.load_account(account_id).await?;

        account.write_off()?;
        self.repo.save_account(account.clone()).await?;

        info!(
            account_id = %account.id,
            balance = %account.capital_balance(),
            "Account written off as bad debt"
        );
        Ok(account)
    }

    /// Re-derives the statuses of one account as of the given date.
    ///
    /// The account is only written back when something changed.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` or storage errors.
    pub async fn refresh_statuses(
        &self,
        account_id: AccountsReceivableId,
        as_of: NaiveDate,
    ) -> Result<AccountsReceivable, SalesError> {
        let _guard = self.locks.lock(account_id).await;
        let mut account = self.load_account(account_id).await?;

        let before = account.clone();
        account.refresh_statuses(as_of, &self.calculator);
        if account != before {
            self.repo.save_account(account.clone()).await?;
            debug!(account_id = %account.id, status = %account.status, "Statuses refreshed");
        }
        Ok(account)
    }

    /// Re-derives the statuses of every account; returns how many changed.
    ///
    /// Meant to run once a day so unpaid installments turn overdue.
    ///
    /// # Errors
    ///
    /// Storage errors. Accounts processed before the failure stay refreshed.
    pub async fn refresh_all(&self, as_of: NaiveDate) -> Result<usize, SalesError> {
        let mut changed = 0;
        for account_id in self.repo.account_ids().await? {
            let _guard = self.locks.lock(account_id).await;
            let mut account = self.load_account(account_id).await?;

            let before = account.clone();
            account.refresh_statuses(as_of, &self.calculator);
            if account != before {
                self.repo.save_account(account).await?;
                changed += 1;
            }
        }

        info!(as_of = %as_of, changed, "Daily status refresh finished");
        Ok(changed)
    }

    /// Statement of an account as of the given date.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` or storage errors.
    pub async fn statement(
        &self,
        account_id: AccountsReceivableId,
        as_of: NaiveDate,
    ) -> Result<AccountStatement, SalesError> {
        let account = self.load_account(account_id).await?;
        Ok(account.statement(as_of, &self.calculator))
    }

    /// Look up a sale.
    ///
    /// # Errors
    ///
    /// `SaleNotFound` or storage errors.
    pub async fn sale(&self, sale_id: SaleId) -> Result<Sale, SalesError> {
        self.load_sale(sale_id).await
    }

    /// Look up an account.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` or storage errors.
    pub async fn account(
        &self,
        account_id: AccountsReceivableId,
    ) -> Result<AccountsReceivable, SalesError> {
        self.load_account(account_id).await
    }

    async fn load_sale(&self, sale_id: SaleId) -> Result<Sale, SalesError> {
        self.repo
            .find_sale(sale_id)
            .await?
            .ok_or(SalesError::SaleNotFound(sale_id))
    }

    async fn load_account(
        &self,
        account_id: AccountsReceivableId,
    ) -> Result<AccountsReceivable, SalesError> {
        self.repo
            .find_account(account_id)
            .await?
            .ok_or(SalesError::AccountNotFound(account_id))
    }

    /// Cancels sale and account in memory and builds the reversing entry.
    ///
    /// `pending_lines` are lines about to be posted for the sale that the
    /// journal does not hold yet.
    async fn prepare_cancellation(
        &self,
        mut sale: Sale,
        mut account: AccountsReceivable,
        date: NaiveDate,
        pending_lines: &[JournalLine],
    ) -> Result<PendingCancellation, SalesError> {
        if sale.is_cancelled() {
            return Err(SalesError::AlreadyCancelled(sale.id));
        }

        let outstanding = account.capital_balance();
        let refund = account.refundable_capital();
        let voided_collections = account.cancel()?;
        sale.status = SaleStatus::Cancelled;

        let mut lines = Vec::new();
        for entry in self.journal.entries_for_reference(&sale.reference()).await? {
            lines.extend(entry.lines);
        }
        for sale_return in self.repo.returns_for_sale(sale.id).await? {
            for entry in self
                .journal
                .entries_for_reference(&sale_return.reference())
                .await?
            {
                lines.extend(entry.lines);
            }
        }

        let reversal = self.rules.cancellation_entry(
            lines.iter().chain(pending_lines),
            outstanding,
            refund,
            date,
            &sale.reversal_reference(),
        );
        let reversal = if reversal.lines.is_empty() {
            None
        } else {
            validate_entry(&reversal)?;
            Some(reversal)
        };

        Ok(PendingCancellation {
            sale,
            account,
            voided_collections,
            reversal,
        })
    }

    async fn post_cancellation(
        &self,
        pending: PendingCancellation,
    ) -> Result<SaleCancelled, SalesError> {
        let reversal = match pending.reversal {
            Some(entry) => Some(self.journal.post(entry).await?),
            None => None,
        };

        info!(
            sale_id = %pending.sale.id,
            account_id = %pending.account.id,
            voided_collections = pending.voided_collections,
            reversed = reversal.is_some(),
            "Sale cancelled"
        );

        Ok(SaleCancelled {
            sale: pending.sale,
            voided_collections: pending.voided_collections,
            reversal,
        })
    }
}
