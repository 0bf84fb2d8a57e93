//! Demo ledger seeder.
//!
//! Builds an in-memory ledger with a handful of sales covering every lifecycle
//! path (cash, credit with a late payment, cancellation, return, write-off) and
//! prints each account statement followed by the journal.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use receivables_core::receivable::PaymentCondition;
use receivables_core::sales::{
    CreateSaleInput, RegisterCollectionInput, RegisterReturnInput, SaleCreated, SalesLedger,
};
use receivables_shared::AppConfig;
use receivables_shared::config::LoggingConfig;
use receivables_shared::types::AccountsReceivableId;
use receivables_store::{InMemoryJournalStore, InMemorySalesStore};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Ledger = SalesLedger<InMemorySalesStore, InMemoryJournalStore>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let journal = Arc::new(InMemoryJournalStore::new());
    let ledger = SalesLedger::new(
        Arc::new(InMemorySalesStore::new()),
        Arc::clone(&journal),
        &config,
    );
    info!(
        penalty_rate = %config.ledger.penalty_monthly_rate,
        tax_rate = %config.ledger.tax_rate,
        "Ledger ready"
    );

    println!("Seeding cash sale...");
    let cash = seed_cash_sale(&ledger).await?;

    println!("Seeding credit sale with a late payment...");
    let credit = seed_credit_sale(&ledger).await?;

    println!("Seeding cancelled sale...");
    let cancelled = seed_cancelled_sale(&ledger).await?;

    println!("Seeding partially returned sale...");
    let returned = seed_returned_sale(&ledger).await?;

    println!("Seeding bad debt...");
    let bad_debt = seed_bad_debt(&ledger).await?;

    let as_of = date(2024, 6, 30)?;
    let changed = ledger.refresh_all(as_of).await?;
    println!("Status refresh as of {as_of}: {changed} account(s) changed");

    for (label, account_id) in [
        ("Cash sale", cash),
        ("Credit sale", credit),
        ("Cancelled sale", cancelled),
        ("Returned sale", returned),
        ("Bad debt", bad_debt),
    ] {
        let statement = ledger.statement(account_id, as_of).await?;
        println!("\n== {label} ==");
        println!("{}", serde_json::to_string_pretty(&statement)?);
    }

    println!("\n== Journal ==");
    for entry in ledger.journal().list().await? {
        println!(
            "{} {:<32} {:<48} {:>12}",
            entry.entry_date,
            entry.concept,
            entry.reference_document,
            entry.total_debit()
        );
        for line in &entry.lines {
            println!(
                "    {:<6} {:<30} {:>12} {:>12}",
                line.account_code, line.account_name, line.debit, line.credit
            );
        }
    }
    println!("\n{} journal entries posted", journal.len().await);

    println!("Seeding complete!");
    Ok(())
}

/// Installs the tracing subscriber: `RUST_LOG` wins over the configured filter.
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter.clone().into());

    tracing_subscriber::registry()
        .with(filter)
        .with(logging.json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!logging.json).then(tracing_subscriber::fmt::layer))
        .init();
}

fn date(y: i32, m: u32, d: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d).with_context(|| format!("invalid date {y}-{m}-{d}"))
}

async fn create_sale(
    ledger: &Ledger,
    total: Decimal,
    condition: PaymentCondition,
    installments: i32,
    sale_date: NaiveDate,
) -> anyhow::Result<SaleCreated> {
    Ok(ledger
        .create_sale(CreateSaleInput {
            total_amount: total,
            payment_condition: condition,
            installment_count: installments,
            sale_date,
        })
        .await?)
}

async fn collect(
    ledger: &Ledger,
    account_id: AccountsReceivableId,
    amount: Decimal,
    on: NaiveDate,
    reference: &str,
) -> anyhow::Result<()> {
    ledger
        .register_collection(RegisterCollectionInput {
            account_id,
            amount,
            installment_id: None,
            collection_date: on,
            reference_number: Some(reference.to_string()),
        })
        .await?;
    Ok(())
}

/// A cash sale paid at the counter.
async fn seed_cash_sale(ledger: &Ledger) -> anyhow::Result<AccountsReceivableId> {
    let created = create_sale(ledger, dec!(236), PaymentCondition::Cash, 1, date(2024, 1, 5)?).await?;
    collect(ledger, created.account.id, dec!(236), date(2024, 1, 5)?, "TICKET-0001").await?;
    Ok(created.account.id)
}

/// 1,800 in six installments; the second one is paid three weeks late.
async fn seed_credit_sale(ledger: &Ledger) -> anyhow::Result<AccountsReceivableId> {
    let created =
        create_sale(ledger, dec!(1800), PaymentCondition::Credit, 6, date(2024, 1, 10)?).await?;
    let account_id = created.account.id;

    collect(ledger, account_id, dec!(300), date(2024, 2, 10)?, "OP-1001").await?;
    let calculator = ledger.calculator();
    let account = ledger.account(account_id).await?;
    let late = date(2024, 3, 31)?;
    let owed = account.installments[1].pending_capital()
        + calculator.pending(&account.installments[1], late);
    collect(ledger, account_id, owed, late, "OP-1002").await?;
    Ok(account_id)
}

/// A credit sale cancelled after its first payment.
async fn seed_cancelled_sale(ledger: &Ledger) -> anyhow::Result<AccountsReceivableId> {
    let created =
        create_sale(ledger, dec!(590), PaymentCondition::Credit, 2, date(2024, 2, 1)?).await?;
    collect(ledger, created.account.id, dec!(100), date(2024, 2, 20)?, "OP-2001").await?;
    ledger.cancel_sale(created.sale.id, date(2024, 2, 25)?).await?;
    Ok(created.account.id)
}

/// A credit sale with part of the goods returned.
async fn seed_returned_sale(ledger: &Ledger) -> anyhow::Result<AccountsReceivableId> {
    let created =
        create_sale(ledger, dec!(944), PaymentCondition::Credit, 4, date(2024, 3, 1)?).await?;
    ledger
        .register_return(RegisterReturnInput {
            sale_id: created.sale.id,
            amount: dec!(118),
            reason: "Damaged on delivery".to_string(),
            return_date: date(2024, 3, 4)?,
        })
        .await?;
    Ok(created.account.id)
}

/// A customer who stopped paying after the first installment.
async fn seed_bad_debt(ledger: &Ledger) -> anyhow::Result<AccountsReceivableId> {
    let created =
        create_sale(ledger, dec!(1200), PaymentCondition::Credit, 3, date(2023, 10, 1)?).await?;
    collect(ledger, created.account.id, dec!(400), date(2023, 11, 1)?, "OP-3001").await?;
    ledger.write_off(created.account.id).await?;
    Ok(created.account.id)
}
