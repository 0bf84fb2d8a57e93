//! Repository implementations.

pub mod journal;
pub mod sales;

pub use journal::InMemoryJournalStore;
pub use sales::InMemorySalesStore;
