//! Double-entry journal.
//!
//! - Journal entries and lines
//! - Balance validation (debits must equal credits within 0.001)
//! - Standard postings for sales, collections, returns and reversals
//! - The journal service and its repository seam

pub mod entry;
pub mod error;
pub mod posting;
pub mod service;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use entry::{JournalEntry, JournalLine, NewJournalEntry};
pub use error::JournalError;
pub use posting::{PostingRules, TaxSplit, reversal_of};
pub use service::{JournalRepository, JournalService};
pub use validation::validate_entry;
