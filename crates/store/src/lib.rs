//! In-memory persistence for the receivables ledger.
//!
//! This crate provides:
//! - `InMemorySalesStore` implementing `SalesRepository`
//! - `InMemoryJournalStore` implementing `JournalRepository`
//!
//! Both are cheap to construct and safe to share behind an `Arc`.

pub mod repositories;

pub use repositories::{InMemoryJournalStore, InMemorySalesStore};
