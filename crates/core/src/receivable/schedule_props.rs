//! Property-based tests for installment schedule generation.

use chrono::NaiveDate;
use proptest::prelude::*;
use receivables_shared::types::{ROUNDING_UNIT, round_money};
use rust_decimal::Decimal;

use super::schedule::create_installment_schedule;
use super::types::PaymentCondition;

/// Totals from 10.00 to 1,000,000.00 (large enough for 36 installments).
fn total_amount() -> impl Strategy<Value = Decimal> {
    (1_000i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn base_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..3650).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Duration::days(offset)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Expected amounts always sum to the total exactly.
    #[test]
    fn prop_schedule_sums_to_total(
        total in total_amount(),
        count in 1i32..=36,
        base in base_date(),
    ) {
        let schedule = create_installment_schedule(total, PaymentCondition::Credit, count, base)
            .unwrap();

        let sum: Decimal = schedule.iter().map(|i| i.expected_amount).sum();
        prop_assert_eq!(sum, total);
        prop_assert_eq!(schedule.len(), usize::try_from(count).unwrap());
    }

    /// The remainder never drives the last installment to zero or below, and it
    /// differs from the regular installment by less than one cent per installment.
    #[test]
    fn prop_last_installment_positive_and_close(
        total in total_amount(),
        count in 1i32..=36,
        base in base_date(),
    ) {
        let schedule = create_installment_schedule(total, PaymentCondition::Credit, count, base)
            .unwrap();

        let last = schedule.last().unwrap().expected_amount;
        prop_assert!(last > Decimal::ZERO);

        let regular = schedule[0].expected_amount;
        let drift = (last - regular).abs();
        prop_assert!(drift <= ROUNDING_UNIT * Decimal::from(count));
        prop_assert!(schedule.iter().all(|i| round_money(i.expected_amount) == i.expected_amount));
    }

    /// Due dates strictly increase and every installment is numbered in order.
    #[test]
    fn prop_due_dates_increase(
        total in total_amount(),
        count in 2i32..=24,
        base in base_date(),
    ) {
        let schedule = create_installment_schedule(total, PaymentCondition::Credit, count, base)
            .unwrap();

        prop_assert!(schedule[0].due_date > base);
        for pair in schedule.windows(2) {
            prop_assert!(pair[0].due_date < pair[1].due_date);
            prop_assert_eq!(pair[0].number + 1, pair[1].number);
        }
    }

    /// Cash sales ignore the requested count.
    #[test]
    fn prop_cash_is_single_installment(
        total in total_amount(),
        count in -10i32..=36,
        base in base_date(),
    ) {
        let schedule = create_installment_schedule(total, PaymentCondition::Cash, count, base)
            .unwrap();

        prop_assert_eq!(schedule.len(), 1);
        prop_assert_eq!(schedule[0].expected_amount, total);
        prop_assert_eq!(schedule[0].due_date, base);
    }
}
