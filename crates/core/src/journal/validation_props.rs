//! Property-based tests for journal balance validation.

use chrono::NaiveDate;
use proptest::prelude::*;
use receivables_shared::config::LedgerAccount;
use rust_decimal::Decimal;

use super::entry::NewJournalEntry;
use super::error::JournalError;
use super::validation::validate_entry;

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn entry() -> NewJournalEntry {
    NewJournalEntry::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "Test", "TEST")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// One debit split over any number of credits always balances.
    #[test]
    fn prop_split_credits_balance(credits in prop::collection::vec(amount(), 1..8)) {
        let total: Decimal = credits.iter().copied().sum();
        let mut entry = entry().debit(&LedgerAccount::new("12.1", "Receivable"), total);
        for (index, credit) in credits.into_iter().enumerate() {
            entry = entry.credit(&LedgerAccount::new(format!("70.{index}"), "Revenue"), credit);
        }

        prop_assert!(validate_entry(&entry).is_ok());
    }

    /// Any difference of a tenth of a cent or more is rejected.
    #[test]
    fn prop_difference_rejected(base in amount(), gap in 1i64..1_000_000i64) {
        let gap = Decimal::new(gap, 3);
        let entry = entry()
            .debit(&LedgerAccount::new("12.1", "Receivable"), base + gap)
            .credit(&LedgerAccount::new("70.1", "Revenue"), base);

        let rejected = matches!(
            validate_entry(&entry),
            Err(JournalError::UnbalancedEntry { .. })
        );
        prop_assert!(rejected);
    }
}
