//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AppError;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Ledger policy configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Chart-of-accounts mapping used for generated postings.
    #[serde(default)]
    pub accounts: AccountsConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// What to do with the part of a payment that no installment can absorb.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverpaymentPolicy {
    /// Reject the whole collection; nothing is recorded.
    #[default]
    Reject,
    /// Record the collection and keep the excess as customer credit.
    HoldAsCredit,
}

/// Ledger policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Monthly simple-interest rate applied to overdue capital.
    #[serde(default = "default_penalty_monthly_rate")]
    pub penalty_monthly_rate: Decimal,
    /// Days in a penalty month (days late are prorated over this).
    #[serde(default = "default_penalty_days_per_month")]
    pub penalty_days_per_month: u32,
    /// Sales tax rate included in sale totals (0.18 = 18%).
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,
    /// Policy for unallocated payment remainders.
    #[serde(default)]
    pub overpayment: OverpaymentPolicy,
}

fn default_penalty_monthly_rate() -> Decimal {
    Decimal::new(9, 3) // 0.9% per month
}

fn default_penalty_days_per_month() -> u32 {
    30
}

fn default_tax_rate() -> Decimal {
    Decimal::new(18, 2)
}

impl LedgerConfig {
    /// Rejects rates and day counts that would corrupt postings or penalties.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` naming the offending field.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.penalty_monthly_rate < Decimal::ZERO {
            return Err(AppError::Configuration(format!(
                "ledger.penalty_monthly_rate must not be negative, got {}",
                self.penalty_monthly_rate
            )));
        }
        if self.penalty_days_per_month == 0 {
            return Err(AppError::Configuration(
                "ledger.penalty_days_per_month must be positive".to_string(),
            ));
        }
        if self.tax_rate < Decimal::ZERO {
            return Err(AppError::Configuration(format!(
                "ledger.tax_rate must not be negative, got {}",
                self.tax_rate
            )));
        }
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            penalty_monthly_rate: default_penalty_monthly_rate(),
            penalty_days_per_month: default_penalty_days_per_month(),
            tax_rate: default_tax_rate(),
            overpayment: OverpaymentPolicy::default(),
        }
    }
}

/// A chart-of-accounts entry referenced by generated postings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerAccount {
    /// Account code (e.g. "12.1").
    pub code: String,
    /// Human-readable account name.
    pub name: String,
}

impl LedgerAccount {
    /// Creates a new account reference.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Accounts used by the sale, payment, reversal and return postings.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountsConfig {
    /// Trade receivables (debited on sale).
    #[serde(default = "default_receivable_account")]
    pub receivable: LedgerAccount,
    /// Sales tax payable (credited on sale).
    #[serde(default = "default_tax_payable_account")]
    pub tax_payable: LedgerAccount,
    /// Merchandise revenue (credited on sale).
    #[serde(default = "default_revenue_account")]
    pub revenue: LedgerAccount,
    /// Cash and banks (debited on collection).
    #[serde(default = "default_cash_account")]
    pub cash: LedgerAccount,
    /// Late-payment interest income (credited with collected penalty).
    #[serde(default = "default_penalty_income_account")]
    pub penalty_income: LedgerAccount,
    /// Customer advances (credited with overpayments held as credit).
    #[serde(default = "default_customer_advances_account")]
    pub customer_advances: LedgerAccount,
    /// Sales returns (debited on credit notes).
    #[serde(default = "default_sales_returns_account")]
    pub sales_returns: LedgerAccount,
}

fn default_receivable_account() -> LedgerAccount {
    LedgerAccount::new("12.1", "Accounts Receivable")
}

fn default_tax_payable_account() -> LedgerAccount {
    LedgerAccount::new("40.1", "Tax Payable")
}

fn default_revenue_account() -> LedgerAccount {
    LedgerAccount::new("70.1", "Revenue")
}

fn default_cash_account() -> LedgerAccount {
    LedgerAccount::new("10.1", "Cash")
}

fn default_penalty_income_account() -> LedgerAccount {
    LedgerAccount::new("77.2", "Late Payment Interest Income")
}

fn default_customer_advances_account() -> LedgerAccount {
    LedgerAccount::new("12.2", "Customer Advances")
}

fn default_sales_returns_account() -> LedgerAccount {
    LedgerAccount::new("74.1", "Sales Returns")
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            receivable: default_receivable_account(),
            tax_payable: default_tax_payable_account(),
            revenue: default_revenue_account(),
            cash: default_cash_account(),
            penalty_income: default_penalty_income_account(),
            customer_advances: default_customer_advances_account(),
            sales_returns: default_sales_returns_account(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "receivables=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` if configuration cannot be loaded or
    /// holds invalid ledger values.
    pub fn load() -> Result<Self, AppError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("RECEIVABLES").separator("__"))
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.ledger.validate()?;
        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.ledger.penalty_monthly_rate, dec!(0.009));
        assert_eq!(config.ledger.penalty_days_per_month, 30);
        assert_eq!(config.ledger.tax_rate, dec!(0.18));
        assert_eq!(config.ledger.overpayment, OverpaymentPolicy::Reject);
        assert_eq!(config.accounts.receivable.code, "12.1");
        assert_eq!(config.accounts.tax_payable.code, "40.1");
        assert_eq!(config.accounts.revenue.code, "70.1");
        assert_eq!(config.logging.filter, "receivables=debug");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_load_without_sources_uses_defaults() {
        temp_env::with_vars_unset(
            [
                "RUN_MODE",
                "RECEIVABLES__LEDGER__TAX_RATE",
                "RECEIVABLES__LEDGER__OVERPAYMENT",
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.ledger.tax_rate, dec!(0.18));
                assert_eq!(config.ledger.overpayment, OverpaymentPolicy::Reject);
            },
        );
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("RECEIVABLES__LEDGER__TAX_RATE", Some("0.10")),
                ("RECEIVABLES__LEDGER__OVERPAYMENT", Some("hold_as_credit")),
                ("RECEIVABLES__LOGGING__JSON", Some("true")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.ledger.tax_rate, dec!(0.10));
                assert_eq!(config.ledger.overpayment, OverpaymentPolicy::HoldAsCredit);
                assert!(config.logging.json);
                assert_eq!(config.ledger.penalty_monthly_rate, dec!(0.009));
            },
        );
    }

    #[test]
    fn test_negative_rates_rejected() {
        temp_env::with_vars(
            [
                ("RECEIVABLES__LEDGER__TAX_RATE", Some("-0.18")),
                ("RECEIVABLES__LEDGER__OVERPAYMENT", None::<&str>),
            ],
            || {
                let err = AppConfig::load().unwrap_err();
                assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
                assert!(err.to_string().contains("tax_rate"));
            },
        );
    }

    #[test]
    fn test_ledger_validate() {
        assert!(LedgerConfig::default().validate().is_ok());

        let negative_penalty = LedgerConfig {
            penalty_monthly_rate: dec!(-0.009),
            ..LedgerConfig::default()
        };
        assert!(matches!(
            negative_penalty.validate(),
            Err(AppError::Configuration(msg)) if msg.contains("penalty_monthly_rate")
        ));

        let no_days = LedgerConfig {
            penalty_days_per_month: 0,
            ..LedgerConfig::default()
        };
        assert!(no_days.validate().is_err());

        let zero_tax = LedgerConfig {
            tax_rate: Decimal::ZERO,
            ..LedgerConfig::default()
        };
        assert!(zero_tax.validate().is_ok());
    }
}
