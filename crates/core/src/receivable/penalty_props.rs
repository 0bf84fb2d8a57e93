//! Property-based tests for penalty calculation.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::penalty::PenaltyCalculator;
use super::types::Installment;

fn cents(min: i64, max: i64) -> impl Strategy<Value = Decimal> {
    (min..max).prop_map(|c| Decimal::new(c, 2))
}

fn due_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The penalty never decreases as the reference date moves forward.
    #[test]
    fn prop_monotonic_in_time(
        expected in cents(1, 10_000_000),
        first in -60i64..720,
        extra in 0i64..720,
    ) {
        let calc = PenaltyCalculator::default();
        let installment = Installment::new(1, due_date(), expected);

        let earlier = calc.calculate(&installment, due_date() + Duration::days(first));
        let later = calc.calculate(&installment, due_date() + Duration::days(first + extra));

        prop_assert!(earlier >= Decimal::ZERO);
        prop_assert!(later >= earlier);
    }

    /// Paying capital never increases the penalty.
    #[test]
    fn prop_monotonic_in_capital(
        expected in cents(1, 10_000_000),
        paid_pct in 0u32..=100,
        days in 1i64..720,
    ) {
        let calc = PenaltyCalculator::default();
        let as_of = due_date() + Duration::days(days);
        let unpaid = Installment::new(1, due_date(), expected);
        let mut partly_paid = unpaid.clone();
        partly_paid.paid_amount =
            (expected * Decimal::from(paid_pct) / Decimal::from(100)).round_dp(2);

        prop_assert!(calc.calculate(&partly_paid, as_of) <= calc.calculate(&unpaid, as_of));
    }

    /// Pending penalty is never negative, whatever has been collected.
    #[test]
    fn prop_pending_non_negative(
        expected in cents(1, 10_000_000),
        paid_penalty in cents(0, 100_000),
        days in -30i64..720,
    ) {
        let calc = PenaltyCalculator::default();
        let mut installment = Installment::new(1, due_date(), expected);
        installment.paid_penalty = paid_penalty;

        let pending = calc.pending(&installment, due_date() + Duration::days(days));
        prop_assert!(pending >= Decimal::ZERO);
        prop_assert!(pending <= calc.calculate(&installment, due_date() + Duration::days(days)));
    }
}
