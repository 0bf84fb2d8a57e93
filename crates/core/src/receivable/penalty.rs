//! Late-payment penalty calculation.
//!
//! The penalty is simple interest on outstanding capital, prorated by days late
//! over a fixed-length month. It is recomputed on demand and never stored; only
//! the penalty actually collected (`paid_penalty`) is persisted.

use chrono::NaiveDate;
use receivables_shared::config::LedgerConfig;
use receivables_shared::types::round_money;
use rust_decimal::Decimal;

use super::types::Installment;

/// Penalty calculator with a configurable monthly rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyCalculator {
    monthly_rate: Decimal,
    days_per_month: u32,
}

impl Default for PenaltyCalculator {
    /// 0.9% per 30-day month.
    fn default() -> Self {
        Self::new(Decimal::new(9, 3), 30)
    }
}

impl PenaltyCalculator {
    /// Creates a calculator. A zero `days_per_month` is treated as one.
    #[must_use]
    pub fn new(monthly_rate: Decimal, days_per_month: u32) -> Self {
        Self {
            monthly_rate,
            days_per_month: days_per_month.max(1),
        }
    }

    /// Creates a calculator from the ledger configuration.
    #[must_use]
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.penalty_monthly_rate, config.penalty_days_per_month)
    }

    /// The monthly rate.
    #[must_use]
    pub fn monthly_rate(&self) -> Decimal {
        self.monthly_rate
    }

    /// Whole days between the due date and `as_of` (zero when not late).
    #[must_use]
    pub fn days_late(due_date: NaiveDate, as_of: NaiveDate) -> i64 {
        (as_of - due_date).num_days().max(0)
    }

    /// Accrued penalty for the installment as of the given date.
    ///
    /// `pending_capital * rate * days_late / days_per_month`, rounded half-up to cents.
    /// Zero on or before the due date.
    #[must_use]
    pub fn calculate(&self, installment: &Installment, as_of: NaiveDate) -> Decimal {
        if as_of <= installment.due_date {
            return Decimal::ZERO;
        }

        let capital = installment.pending_capital();
        if capital <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let days = Decimal::from(Self::days_late(installment.due_date, as_of));
        let accrued = capital * self.monthly_rate * days / Decimal::from(self.days_per_month);
        round_money(accrued).max(Decimal::ZERO)
    }

    /// Penalty still owed: accrued penalty minus what was already collected, floored at zero.
    #[must_use]
    pub fn pending(&self, installment: &Installment, as_of: NaiveDate) -> Decimal {
        (self.calculate(installment, as_of) - installment.paid_penalty).max(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn installment(expected: Decimal, paid: Decimal) -> Installment {
        let mut installment = Installment::new(1, date(2024, 1, 1), expected);
        installment.paid_amount = paid;
        installment
    }

    #[rstest]
    #[case(date(2023, 12, 1))]
    #[case(date(2024, 1, 1))]
    fn test_no_penalty_on_or_before_due_date(#[case] as_of: NaiveDate) {
        let calc = PenaltyCalculator::default();
        assert_eq!(calc.calculate(&installment(dec!(1000), dec!(0)), as_of), Decimal::ZERO);
    }

    #[test]
    fn test_thirty_days_late_is_one_month_of_interest() {
        // 1000 * 0.009 * 30 / 30 = 9.00
        let calc = PenaltyCalculator::default();
        let penalty = calc.calculate(&installment(dec!(1000), dec!(0)), date(2024, 1, 31));
        assert_eq!(penalty, dec!(9.00));
    }

    #[test]
    fn test_penalty_prorated_and_rounded_half_up() {
        // 500 * 0.009 * 10 / 30 = 1.5
        let calc = PenaltyCalculator::default();
        assert_eq!(
            calc.calculate(&installment(dec!(500), dec!(0)), date(2024, 1, 11)),
            dec!(1.50)
        );
        // 100 * 0.009 * 5 / 30 = 0.15
        assert_eq!(
            calc.calculate(&installment(dec!(100), dec!(0)), date(2024, 1, 6)),
            dec!(0.15)
        );
        // 10 * 0.009 * 1 / 30 = 0.003 -> 0.00
        assert_eq!(
            calc.calculate(&installment(dec!(10), dec!(0)), date(2024, 1, 2)),
            dec!(0.00)
        );
    }

    #[test]
    fn test_penalty_only_on_outstanding_capital() {
        // 400 of 1000 still owed: 400 * 0.009 * 30 / 30 = 3.60
        let calc = PenaltyCalculator::default();
        let penalty = calc.calculate(&installment(dec!(1000), dec!(600)), date(2024, 1, 31));
        assert_eq!(penalty, dec!(3.60));

        let settled = installment(dec!(1000), dec!(1000));
        assert_eq!(calc.calculate(&settled, date(2024, 6, 1)), Decimal::ZERO);
    }

    #[test]
    fn test_pending_subtracts_collected_penalty() {
        let calc = PenaltyCalculator::default();
        let mut inst = installment(dec!(1000), dec!(0));
        inst.paid_penalty = dec!(4);
        assert_eq!(calc.pending(&inst, date(2024, 1, 31)), dec!(5.00));

        inst.paid_penalty = dec!(20);
        assert_eq!(calc.pending(&inst, date(2024, 1, 31)), Decimal::ZERO);
    }

    #[test]
    fn test_custom_rate() {
        let calc = PenaltyCalculator::new(dec!(0.2), 30);
        assert_eq!(
            calc.calculate(&installment(dec!(50), dec!(0)), date(2024, 1, 31)),
            dec!(10.00)
        );
    }

    #[test]
    fn test_days_late() {
        assert_eq!(PenaltyCalculator::days_late(date(2024, 1, 1), date(2024, 3, 1)), 60);
        assert_eq!(PenaltyCalculator::days_late(date(2024, 3, 1), date(2024, 1, 1)), 0);
    }

    #[test]
    fn test_from_config() {
        let calc = PenaltyCalculator::from_config(&LedgerConfig::default());
        assert_eq!(calc, PenaltyCalculator::default());
        assert_eq!(calc.monthly_rate(), dec!(0.009));
    }
}
