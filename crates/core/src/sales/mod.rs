//! Sales ledger orchestration.
//!
//! Ties a sale to its accounts-receivable aggregate and keeps the journal in
//! step with every change: sale creation, collections, cancellations, returns,
//! write-offs and the daily status refresh.

pub mod error;
pub mod locks;
pub mod repository;
pub mod service;
pub mod types;

pub use error::SalesError;
pub use locks::{AccountGuard, AccountLocks};
pub use repository::SalesRepository;
pub use service::SalesLedger;
pub use types::{
    CollectionRecorded, CreateSaleInput, RegisterCollectionInput, RegisterReturnInput,
    ReturnRegistered, Sale, SaleCancelled, SaleCreated, SaleReturn, SaleStatus,
    collection_reference,
};
