//! Journal entries, indexed by reference document.

use dashmap::DashMap;
use receivables_core::journal::{JournalEntry, JournalError, JournalRepository};
use tokio::sync::RwLock;

/// In-memory, append-only journal store.
#[derive(Debug, Default)]
pub struct InMemoryJournalStore {
    entries: RwLock<Vec<JournalEntry>>,
    by_reference: DashMap<String, Vec<usize>>,
}

impl InMemoryJournalStore {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of posted entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing has been posted.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl JournalRepository for InMemoryJournalStore {
    async fn insert(&self, entry: JournalEntry) -> Result<JournalEntry, JournalError> {
        let mut entries = self.entries.write().await;
        if entries.iter().any(|e| e.id == entry.id) {
            return Err(JournalError::Storage(format!(
                "journal entry {} already posted",
                entry.id
            )));
        }

        self.by_reference
            .entry(entry.reference_document.clone())
            .or_default()
            .push(entries.len());
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Vec<JournalEntry>, JournalError> {
        let Some(positions) = self.by_reference.get(reference).map(|p| p.value().clone()) else {
            return Ok(Vec::new());
        };

        let entries = self.entries.read().await;
        positions
            .into_iter()
            .map(|index| {
                entries.get(index).cloned().ok_or_else(|| {
                    JournalError::Storage(format!("dangling index {index} for {reference}"))
                })
            })
            .collect()
    }

    async fn list(&self) -> Result<Vec<JournalEntry>, JournalError> {
        Ok(self.entries.read().await.clone())
    }
}
