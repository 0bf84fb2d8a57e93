//! Core business logic for the receivables ledger.
//!
//! This crate contains pure business logic with ZERO transport or database dependencies.
//! Persistence is reached through repository traits implemented elsewhere.
//!
//! # Modules
//!
//! - `receivable` - Installment schedules, penalties, payment allocation and account status
//! - `journal` - Double-entry journal entries, validation and standard postings
//! - `sales` - Sale lifecycle orchestration over the two modules above

pub mod journal;
pub mod receivable;
pub mod sales;
