//! Per-account write serialization.

use std::sync::Arc;

use dashmap::DashMap;
use receivables_shared::types::AccountsReceivableId;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = DashMap<AccountsReceivableId, Arc<Mutex<()>>>;

/// One async mutex per account.
///
/// Every mutation of an account holds its guard across load, mutate and
/// commit. Different accounts never contend. An entry lives only while some
/// task holds or waits for it.
#[derive(Debug, Default)]
pub struct AccountLocks {
    locks: LockTable,
}

/// Exclusive access to one account; released on drop.
#[derive(Debug)]
pub struct AccountGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a LockTable,
    id: AccountsReceivableId,
}

impl Drop for AccountGuard<'_> {
    fn drop(&mut self) {
        // Release first so the guard's own Arc no longer counts.
        drop(self.guard.take());
        // Waiters hold a clone taken under the shard lock, so the count is exact here.
        self.locks
            .remove_if(&self.id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

impl AccountLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to the account.
    pub async fn lock(&self, id: AccountsReceivableId) -> AccountGuard<'_> {
        // Clone the Arc out so the shard lock is released before awaiting.
        let mutex = Arc::clone(self.locks.entry(id).or_default().value());
        let guard = mutex.lock_owned().await;
        AccountGuard {
            guard: Some(guard),
            locks: &self.locks,
            id,
        }
    }

    /// Number of accounts currently locked or awaited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Returns true if no account is locked or awaited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
