//! Credit policy configuration
//!
//! Business-rule knobs that vary by deployment: the tax rate applied at
//! invoicing, whether an account may temporarily run past its limit, what
//! happens to an overpayment, and the billing timezone that anchors due
//! dates. Defaults match the standard production setup.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{Rate, Timezone};

/// What to do with a payment that exceeds the invoice's outstanding balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverpaymentPolicy {
    /// Reject the payment outright; nothing is ever silently clamped
    Reject,
    /// Settle the invoice and accrue the excess to the account
    CreditToAccount,
}

/// Deployment-level credit policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditPolicy {
    /// Tax rate applied to invoice subtotals, as a percentage
    pub tax_rate_percent: Decimal,
    /// Whether invoicing may push an account past its credit limit
    pub allow_over_limit: bool,
    /// Overpayment handling
    pub overpayment: OverpaymentPolicy,
    /// Billing timezone anchoring due-date day boundaries
    pub billing_timezone: Timezone,
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self {
            tax_rate_percent: dec!(9.0),
            allow_over_limit: false,
            overpayment: OverpaymentPolicy::Reject,
            billing_timezone: Timezone::default(),
        }
    }
}

impl CreditPolicy {
    /// Loads policy overrides from `CREDIT_*` environment variables
    ///
    /// Unset variables fall back to the defaults, e.g.
    /// `CREDIT_TAX_RATE_PERCENT=8.25 CREDIT_ALLOW_OVER_LIMIT=true`.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("CREDIT"))
            .build()?
            .try_deserialize()
    }

    /// The tax rate as a `Rate`
    pub fn tax_rate(&self) -> Rate {
        Rate::from_percentage(self.tax_rate_percent)
    }
}
