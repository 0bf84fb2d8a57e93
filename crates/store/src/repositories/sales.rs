//! Sales, accounts and returns.

use std::collections::HashMap;

use receivables_core::receivable::AccountsReceivable;
use receivables_core::sales::{Sale, SaleReturn, SalesError, SalesRepository};
use receivables_shared::types::{AccountsReceivableId, SaleId};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct Tables {
    sales: HashMap<SaleId, Sale>,
    accounts: HashMap<AccountsReceivableId, AccountsReceivable>,
    returns: Vec<SaleReturn>,
}

/// In-memory sales store.
///
/// All tables sit behind one lock so a sale and its account are replaced together.
#[derive(Debug, Default)]
pub struct InMemorySalesStore {
    tables: RwLock<Tables>,
}

impl InMemorySalesStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sales stored.
    pub async fn sale_count(&self) -> usize {
        self.tables.read().await.sales.len()
    }
}

impl SalesRepository for InMemorySalesStore {
    async fn save(&self, sale: Sale, account: AccountsReceivable) -> Result<(), SalesError> {
        if sale.account_id != account.id || account.sale_id != sale.id {
            return Err(SalesError::Storage(format!(
                "sale {} and account {} do not reference each other",
                sale.id, account.id
            )));
        }

        let mut tables = self.tables.write().await;
        debug!(sale_id = %sale.id, account_id = %account.id, "Saving sale");
        tables.accounts.insert(account.id, account);
        tables.sales.insert(sale.id, sale);
        Ok(())
    }

    async fn save_account(&self, account: AccountsReceivable) -> Result<(), SalesError> {
        let mut tables = self.tables.write().await;
        if !tables.accounts.contains_key(&account.id) {
            return Err(SalesError::AccountNotFound(account.id));
        }
        tables.accounts.insert(account.id, account);
        Ok(())
    }

    async fn find_sale(&self, id: SaleId) -> Result<Option<Sale>, SalesError> {
        Ok(self.tables.read().await.sales.get(&id).cloned())
    }

    async fn find_account(
        &self,
        id: AccountsReceivableId,
    ) -> Result<Option<AccountsReceivable>, SalesError> {
        Ok(self.tables.read().await.accounts.get(&id).cloned())
    }

    async fn account_ids(&self) -> Result<Vec<AccountsReceivableId>, SalesError> {
        Ok(self.tables.read().await.accounts.keys().copied().collect())
    }

    async fn insert_return(&self, sale_return: SaleReturn) -> Result<(), SalesError> {
        let mut tables = self.tables.write().await;
        if !tables.sales.contains_key(&sale_return.sale_id) {
            return Err(SalesError::SaleNotFound(sale_return.sale_id));
        }
        tables.returns.push(sale_return);
        Ok(())
    }

    async fn returns_for_sale(&self, sale_id: SaleId) -> Result<Vec<SaleReturn>, SalesError> {
        Ok(self
            .tables
            .read()
            .await
            .returns
            .iter()
            .filter(|r| r.sale_id == sale_id)
            .cloned()
            .collect())
    }
}
