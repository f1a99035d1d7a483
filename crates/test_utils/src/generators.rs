//! Property-based test generators
//!
//! Proptest strategies producing domain values that respect construction
//! invariants.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money};
use domain_credit::PaymentMethod;

/// Positive amounts in cents, up to $1M
pub fn positive_cents_strategy() -> impl Strategy<Value = i64> {
    1i64..100_000_000i64
}

/// Positive USD money values
pub fn usd_money_strategy() -> impl Strategy<Value = Money> {
    positive_cents_strategy().prop_map(|cents| Money::from_minor(cents, Currency::USD))
}

/// Utilization percentages spanning every health band, over-limit included
pub fn utilization_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..15_000u32).prop_map(|basis_points| Decimal::new(basis_points as i64, 2))
}

/// Order line shapes: (quantity, unit price cents)
pub fn order_line_strategy() -> impl Strategy<Value = (u32, i64)> {
    (1u32..100u32, 100i64..1_000_00i64)
}

/// Any payment method
pub fn payment_method_strategy() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![
        Just(PaymentMethod::BankTransfer),
        Just(PaymentMethod::CreditCard),
        Just(PaymentMethod::DebitCard),
        Just(PaymentMethod::Check),
    ]
}
