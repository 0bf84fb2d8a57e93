//! Persistence seam for sales, accounts and returns.

use std::future::Future;

use receivables_shared::types::{AccountsReceivableId, SaleId};

use super::error::SalesError;
use super::types::{Sale, SaleReturn};
use crate::receivable::AccountsReceivable;

/// Repository trait for sales persistence.
///
/// A sale and its account are always written together.
pub trait SalesRepository: Send + Sync {
    /// Insert or replace a sale together with its account.
    fn save(
        &self,
        sale: Sale,
        account: AccountsReceivable,
    ) -> impl Future<Output = Result<(), SalesError>> + Send;

    /// Replace an existing account.
    fn save_account(
        &self,
        account: AccountsReceivable,
    ) -> impl Future<Output = Result<(), SalesError>> + Send;

    /// Find a sale by ID.
    fn find_sale(
        &self,
        id: SaleId,
    ) -> impl Future<Output = Result<Option<Sale>, SalesError>> + Send;

    /// Find an account by ID.
    fn find_account(
        &self,
        id: AccountsReceivableId,
    ) -> impl Future<Output = Result<Option<AccountsReceivable>, SalesError>> + Send;

    /// IDs of every account, in no particular order.
    fn account_ids(
        &self,
    ) -> impl Future<Output = Result<Vec<AccountsReceivableId>, SalesError>> + Send;

    /// Record a return.
    fn insert_return(
        &self,
        sale_return: SaleReturn,
    ) -> impl Future<Output = Result<(), SalesError>> + Send;

    /// Returns recorded against a sale.
    fn returns_for_sale(
        &self,
        sale_id: SaleId,
    ) -> impl Future<Output = Result<Vec<SaleReturn>, SalesError>> + Send;
}
