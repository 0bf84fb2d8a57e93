//! Balance validation for journal entries.

use receivables_shared::types::BALANCE_TOLERANCE;
use rust_decimal::Decimal;

use super::entry::{JournalLine, NewJournalEntry};
use super::error::JournalError;

/// Validates an entry before it is posted.
///
/// # Errors
///
/// - `EmptyEntry` if the entry has no lines
/// - `InvalidLine` if a line is negative, zero on both sides, or set on both sides
/// - `UnbalancedEntry` if `|debit - credit| >= 0.001`
pub fn validate_entry(entry: &NewJournalEntry) -> Result<(), JournalError> {
    if entry.lines.is_empty() {
        return Err(JournalError::EmptyEntry);
    }

    for line in &entry.lines {
        validate_line(line)?;
    }

    let debit = entry.total_debit();
    let credit = entry.total_credit();
    if (debit - credit).abs() >= BALANCE_TOLERANCE {
        return Err(JournalError::UnbalancedEntry { debit, credit });
    }

    Ok(())
}

fn validate_line(line: &JournalLine) -> Result<(), JournalError> {
    let reason = if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
        "amounts cannot be negative"
    } else if line.debit.is_zero() && line.credit.is_zero() {
        "line has no amount"
    } else if !line.debit.is_zero() && !line.credit.is_zero() {
        "line cannot be both debit and credit"
    } else {
        return Ok(());
    };

    Err(JournalError::InvalidLine {
        account_code: line.account_code.clone(),
        reason: reason.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use receivables_shared::config::LedgerAccount;
    use rust_decimal_macros::dec;

    fn account(code: &str) -> LedgerAccount {
        LedgerAccount::new(code, code)
    }

    fn entry() -> NewJournalEntry {
        NewJournalEntry::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "Test", "TEST-1")
    }

    #[test]
    fn test_sale_entry_balances() {
        let entry = entry()
            .debit(&account("12.1"), dec!(118))
            .credit(&account("40.1"), dec!(18))
            .credit(&account("70.1"), dec!(100));
        assert!(validate_entry(&entry).is_ok());
    }

    #[test]
    fn test_unbalanced_entry_rejected() {
        let entry = entry()
            .debit(&account("12.1"), dec!(100))
            .credit(&account("70.1"), dec!(90));
        let result = validate_entry(&entry);
        assert!(matches!(
            result,
            Err(JournalError::UnbalancedEntry { debit, credit })
                if debit == dec!(100) && credit == dec!(90)
        ));
    }

    #[test]
    fn test_tolerance_boundary() {
        let within = entry()
            .debit(&account("12.1"), dec!(100.0009))
            .credit(&account("70.1"), dec!(100));
        assert!(validate_entry(&within).is_ok());

        let outside = entry()
            .debit(&account("12.1"), dec!(100.001))
            .credit(&account("70.1"), dec!(100));
        assert!(matches!(
            validate_entry(&outside),
            Err(JournalError::UnbalancedEntry { .. })
        ));
    }

    #[test]
    fn test_empty_entry_rejected() {
        assert!(matches!(validate_entry(&entry()), Err(JournalError::EmptyEntry)));
    }

    #[test]
    fn test_invalid_lines_rejected() {
        let mut both_sides = entry().debit(&account("12.1"), dec!(10));
        both_sides.lines[0].credit = dec!(10);
        assert!(matches!(
            validate_entry(&both_sides),
            Err(JournalError::InvalidLine { .. })
        ));

        let mut negative = entry()
            .debit(&account("12.1"), dec!(-10))
            .credit(&account("70.1"), dec!(-10));
        assert!(matches!(
            validate_entry(&negative),
            Err(JournalError::InvalidLine { .. })
        ));

        negative.lines.clear();
        negative.lines.push(JournalLine {
            account_code: "12.1".into(),
            account_name: "Accounts Receivable".into(),
            debit: Decimal::ZERO,
            credit: Decimal::ZERO,
        });
        assert!(matches!(
            validate_entry(&negative),
            Err(JournalError::InvalidLine { .. })
        ));
    }
}
