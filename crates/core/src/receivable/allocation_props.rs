//! Property-based tests for the payment allocation waterfall.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::allocation::AllocationEngine;
use super::penalty::PenaltyCalculator;
use super::types::Installment;

fn cents(min: i64, max: i64) -> impl Strategy<Value = Decimal> {
    (min..max).prop_map(|c| Decimal::new(c, 2))
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Monthly installments with arbitrary expected amounts and prior capital payments.
fn installments() -> impl Strategy<Value = Vec<Installment>> {
    prop::collection::vec((cents(1, 1_000_000), 0u32..=100), 1..12).prop_map(|specs| {
        specs
            .into_iter()
            .zip(1u32..)
            .map(|((expected, paid_pct), number)| {
                let due = start() + Duration::days(i64::from(number) * 30);
                let mut installment = Installment::new(number, due, expected);
                installment.paid_amount =
                    (expected * Decimal::from(paid_pct) / Decimal::from(100)).round_dp(2);
                installment
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// No installment is ever paid beyond what it owes, and every cent is accounted for.
    #[test]
    fn prop_never_overpays(
        mut installments in installments(),
        amount in cents(1, 5_000_000),
        days in 0i64..720,
    ) {
        let as_of = start() + Duration::days(days);
        let calc = PenaltyCalculator::default();
        let before = installments.clone();

        let result = AllocationEngine::apply(&mut installments, amount, None, as_of, &calc).unwrap();

        prop_assert_eq!(result.allocated_total() + result.unallocated, amount);
        prop_assert!(result.unallocated >= Decimal::ZERO);
        for (after, before) in installments.iter().zip(&before) {
            prop_assert!(after.paid_amount <= after.expected_amount);
            prop_assert!(after.paid_amount >= before.paid_amount);
            prop_assert!(after.paid_penalty <= calc.calculate(before, as_of));
        }
    }

    /// Capital is only touched once the installment's pending penalty is cleared.
    #[test]
    fn prop_penalty_before_capital(
        mut installments in installments(),
        amount in cents(1, 5_000_000),
        days in 0i64..720,
    ) {
        let as_of = start() + Duration::days(days);
        let calc = PenaltyCalculator::default();
        let before = installments.clone();

        let result = AllocationEngine::apply(&mut installments, amount, None, as_of, &calc).unwrap();

        for allocation in &result.allocations {
            let original = before.iter().find(|i| i.id == allocation.installment_id).unwrap();
            if allocation.capital > Decimal::ZERO {
                prop_assert_eq!(allocation.penalty, calc.pending(original, as_of));
            }
        }
    }

    /// A later installment only receives funds once every earlier one is settled.
    #[test]
    fn prop_oldest_first(
        mut installments in installments(),
        amount in cents(1, 5_000_000),
        days in 0i64..720,
    ) {
        let as_of = start() + Duration::days(days);
        let calc = PenaltyCalculator::default();

        let result = AllocationEngine::apply(&mut installments, amount, None, as_of, &calc).unwrap();

        let funded = result.allocations.len();
        for allocation in result.allocations.iter().take(funded.saturating_sub(1)) {
            let installment = installments
                .iter()
                .find(|i| i.id == allocation.installment_id)
                .unwrap();
            prop_assert_eq!(installment.pending_capital(), Decimal::ZERO);
        }
        for pair in result.allocations.windows(2) {
            prop_assert!(pair[0].number < pair[1].number);
        }
    }
}
