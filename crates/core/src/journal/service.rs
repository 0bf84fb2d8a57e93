//! Journal service: validates entries and hands them to the journal store.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use receivables_shared::types::JournalEntryId;
use tracing::{info, warn};

use super::entry::{JournalEntry, NewJournalEntry};
use super::error::JournalError;
use super::validation::validate_entry;

/// Repository trait for journal persistence.
///
/// Entries are immutable: the store only ever inserts and reads.
pub trait JournalRepository: Send + Sync {
    /// Persist an entry with all of its lines as one unit.
    fn insert(
        &self,
        entry: JournalEntry,
    ) -> impl Future<Output = Result<JournalEntry, JournalError>> + Send;

    /// All entries posted for a reference document.
    fn find_by_reference(
        &self,
        reference: &str,
    ) -> impl Future<Output = Result<Vec<JournalEntry>, JournalError>> + Send;

    /// Every posted entry.
    fn list(&self) -> impl Future<Output = Result<Vec<JournalEntry>, JournalError>> + Send;
}

/// Journal service.
pub struct JournalService<J: JournalRepository> {
    repo: Arc<J>,
}

impl<J: JournalRepository> Clone for JournalService<J> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<J: JournalRepository> JournalService<J> {
    /// Create a new journal service.
    #[must_use]
    pub fn new(repo: Arc<J>) -> Self {
        Self { repo }
    }

    /// Validates and posts an entry.
    ///
    /// Nothing is written when validation fails.
    ///
    /// # Errors
    ///
    /// - `EmptyEntry`, `InvalidLine` or `UnbalancedEntry` from validation
    /// - `Storage` if the store fails
    pub async fn post(&self, entry: NewJournalEntry) -> Result<JournalEntry, JournalError> {
        if let Err(err) = validate_entry(&entry) {
            warn!(
                reference = %entry.reference_document,
                error = %err,
                "Rejected journal entry"
            );
            return Err(err);
        }

        let entry = JournalEntry {
            id: JournalEntryId::new(),
            entry_date: entry.entry_date,
            concept: entry.concept,
            reference_document: entry.reference_document,
            lines: entry.lines,
            posted_at: Utc::now(),
        };

        let posted = self.repo.insert(entry).await?;
        info!(
            entry_id = %posted.id,
            reference = %posted.reference_document,
            amount = %posted.total_debit(),
            "Posted journal entry"
        );
        Ok(posted)
    }

    /// Entries posted for a reference document, oldest first.
    pub async fn entries_for_reference(
        &self,
        reference: &str,
    ) -> Result<Vec<JournalEntry>, JournalError> {
        let mut entries = self.repo.find_by_reference(reference).await?;
        entries.sort_by_key(|e| (e.entry_date, e.posted_at));
        Ok(entries)
    }

    /// Every posted entry, newest first.
    pub async fn list(&self) -> Result<Vec<JournalEntry>, JournalError> {
        let mut entries = self.repo.list().await?;
        entries.sort_by(|a, b| {
            b.entry_date
                .cmp(&a.entry_date)
                .then_with(|| b.posted_at.cmp(&a.posted_at))
        });
        Ok(entries)
    }
}
