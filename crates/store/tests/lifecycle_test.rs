//! End-to-end sale lifecycle against the in-memory stores.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use receivables_core::journal::{JournalEntry, JournalRepository};
use receivables_core::receivable::{AccountStatus, InstallmentStatus, PaymentCondition};
use receivables_core::sales::{
    CreateSaleInput, RegisterCollectionInput, RegisterReturnInput, SaleStatus, SalesLedger,
};
use receivables_shared::AppConfig;
use receivables_store::{InMemoryJournalStore, InMemorySalesStore};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn balances(entries: &[JournalEntry]) -> HashMap<String, Decimal> {
    let mut balances = HashMap::new();
    for line in entries.iter().flat_map(|e| &e.lines) {
        *balances.entry(line.account_code.clone()).or_insert(Decimal::ZERO) += line.signed_amount();
    }
    balances
}

#[tokio::test]
async fn test_credit_sale_lifecycle() {
    let sales = Arc::new(InMemorySalesStore::new());
    let journal = Arc::new(InMemoryJournalStore::new());
    let ledger = SalesLedger::new(Arc::clone(&sales), Arc::clone(&journal), &AppConfig::default());

    // 1200 on credit in 3 installments of 400, due Feb 1, Mar 1, Apr 1
    let created = ledger
        .create_sale(CreateSaleInput {
            total_amount: dec!(1200),
            payment_condition: PaymentCondition::Credit,
            installment_count: 3,
            sale_date: date(2024, 1, 1),
        })
        .await
        .unwrap();
    let account_id = created.account.id;
    assert_eq!(sales.sale_count().await, 1);

    // Daily job on Mar 1: first installment overdue
    ledger.refresh_all(date(2024, 3, 1)).await.unwrap();
    let account = ledger.account(account_id).await.unwrap();
    assert_eq!(account.installments[0].status, InstallmentStatus::Overdue);

    // Paid 29 days late: 400 * 0.009 * 29 / 30 = 3.48 penalty, then 400 capital, then 96.52 on the next
    let recorded = ledger
        .register_collection(RegisterCollectionInput {
            account_id,
            amount: dec!(500),
            installment_id: None,
            collection_date: date(2024, 3, 1),
            reference_number: None,
        })
        .await
        .unwrap();
    assert_eq!(recorded.collection.allocations[0].penalty, dec!(3.48));
    assert_eq!(recorded.collection.allocations[0].capital, dec!(400));
    assert_eq!(recorded.collection.allocations[1].capital, dec!(96.52));

    let statement = ledger.statement(account_id, date(2024, 3, 1)).await.unwrap();
    assert_eq!(statement.capital_paid, dec!(496.52));
    assert_eq!(statement.penalty_paid, dec!(3.48));
    assert_eq!(statement.collected_amount, dec!(500));
    assert_eq!(statement.next_due.unwrap().number, 2);

    // Partial return cancels capital on the last installment
    let returned = ledger
        .register_return(RegisterReturnInput {
            sale_id: created.sale.id,
            amount: dec!(118),
            reason: "Wrong size".to_string(),
            return_date: date(2024, 3, 5),
        })
        .await
        .unwrap();
    assert_eq!(returned.journal_entry.net_for_account("12.1"), dec!(-118));
    let account = ledger.account(account_id).await.unwrap();
    assert_eq!(account.installments[2].pending_capital(), dec!(282));
    assert_eq!(account.capital_balance(), dec!(585.48));

    let cancelled = ledger
        .cancel_sale(created.sale.id, date(2024, 3, 6))
        .await
        .unwrap();
    assert_eq!(cancelled.sale.status, SaleStatus::Cancelled);
    assert_eq!(cancelled.voided_collections, 1);

    let account = ledger.account(account_id).await.unwrap();
    assert_eq!(account.status, AccountStatus::Cancelled);
    // Capital collected is now owed back to the customer
    assert_eq!(account.credit_balance, dec!(496.52));

    let entries = journal.list().await.unwrap();
    assert!(entries.iter().all(|e| e.total_debit() == e.total_credit()));

    // Sale, credit note and reversal cancel out; the collection stays as customer credit.
    let balances = balances(&entries);
    assert_eq!(balances["10.1"], dec!(500));
    assert!(balances["12.1"].is_zero());
    assert_eq!(balances["12.2"], dec!(-496.52));
    assert_eq!(balances["77.2"], dec!(-3.48));
    assert!(balances["70.1"].is_zero());
    assert!(balances["40.1"].is_zero());
    assert!(balances["74.1"].is_zero());

    let reversal = ledger
        .journal()
        .entries_for_reference(&created.sale.reversal_reference())
        .await
        .unwrap();
    assert_eq!(reversal.len(), 1);
}

#[tokio::test]
async fn test_cash_sale_paid_on_the_spot() {
    let ledger = SalesLedger::new(
        Arc::new(InMemorySalesStore::new()),
        Arc::new(InMemoryJournalStore::new()),
        &AppConfig::default(),
    );

    let created = ledger
        .create_sale(CreateSaleInput {
            total_amount: dec!(59),
            payment_condition: PaymentCondition::Cash,
            installment_count: 12,
            sale_date: date(2024, 6, 1),
        })
        .await
        .unwrap();
    assert_eq!(created.account.installments.len(), 1);
    assert_eq!(created.account.installments[0].due_date, date(2024, 6, 1));

    let recorded = ledger
        .register_collection(RegisterCollectionInput {
            account_id: created.account.id,
            amount: dec!(59),
            installment_id: Some(created.account.installments[0].id),
            collection_date: date(2024, 6, 1),
            reference_number: Some("TICKET-9".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(recorded.account_status, AccountStatus::Paid);
    assert_eq!(ledger.journal().list().await.unwrap().len(), 2);
}
