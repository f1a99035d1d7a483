//! Test fixtures
//!
//! Pre-built values for common test setups. Dates are pinned so that
//! anything derived from "now" is reproducible across runs.

use chrono::{DateTime, TimeZone, Utc};
use fake::faker::company::en::CompanyName;
use fake::faker::number::en::NumberWithFormat;
use fake::Fake;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{CompanyId, Currency, Money};

static REFERENCE_NOW: Lazy<DateTime<Utc>> =
    Lazy::new(|| Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap());

/// Pinned timestamps for deterministic tests
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// The suite's injected "now": 2025-06-15 12:00:00 UTC
    pub fn now() -> DateTime<Utc> {
        *REFERENCE_NOW
    }

    /// A date `days` after the reference now
    pub fn days_from_now(days: i64) -> DateTime<Utc> {
        Self::now() + chrono::Duration::days(days)
    }
}

/// Standard monetary amounts
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    /// The standard mid-size credit limit used across the suite
    pub fn credit_limit() -> Money {
        Self::usd(dec!(25000))
    }

    /// A typical wholesale order subtotal
    pub fn order_subtotal() -> Money {
        Self::usd(dec!(4954.05))
    }
}

/// Identifier fixtures
pub struct IdFixtures;

impl IdFixtures {
    pub fn company_id() -> CompanyId {
        CompanyId::new()
    }
}

/// Generated strings for references and names
pub struct StringFixtures;

impl StringFixtures {
    /// An opaque settlement reference like a payment provider would return
    pub fn settlement_reference() -> String {
        NumberWithFormat("SETTLE-########").fake()
    }

    /// A business customer name
    pub fn company_name() -> String {
        CompanyName().fake()
    }

    /// Product names from the wholesale catalog
    pub fn product_name(index: usize) -> &'static str {
        const CATALOG: [&str; 6] = [
            "Single Malt 12yr",
            "London Dry Gin",
            "Reposado Tequila",
            "Small Batch Bourbon",
            "Aged Rum",
            "Rye Whiskey Case",
        ];
        CATALOG[index % CATALOG.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_now_is_stable() {
        assert_eq!(TemporalFixtures::now(), TemporalFixtures::now());
        assert_eq!(
            TemporalFixtures::days_from_now(30),
            Utc.with_ymd_and_hms(2025, 7, 15, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_settlement_reference_shape() {
        let reference = StringFixtures::settlement_reference();
        assert!(reference.starts_with("SETTLE-"));
        assert_eq!(reference.len(), "SETTLE-".len() + 8);
    }

    #[test]
    fn test_product_names_cycle() {
        assert_eq!(
            StringFixtures::product_name(0),
            StringFixtures::product_name(6)
        );
    }
}
