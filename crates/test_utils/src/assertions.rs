//! Custom test assertions
//!
//! Domain-aware assertion helpers with clearer failure messages than bare
//! equality checks.

use core_kernel::Money;
use domain_credit::{CreditAccount, Invoice};

/// Asserts the account balance identity holds
///
/// # Panics
///
/// Panics when `available_credit != credit_limit - used_credit`.
pub fn assert_account_consistent(account: &CreditAccount) {
    let expected = account.credit_limit - account.used_credit;
    assert_eq!(
        account.available_credit, expected,
        "account {} inconsistent: limit={}, used={}, available={}",
        account.id, account.credit_limit, account.used_credit, account.available_credit
    );
}

/// Asserts invoice arithmetic: line totals, subtotal, and total all agree
///
/// # Panics
///
/// Panics when any of the invoice amount identities is violated.
pub fn assert_invoice_consistent(invoice: &Invoice) {
    let item_sum = invoice
        .items
        .iter()
        .fold(Money::zero(invoice.currency), |acc, item| acc + item.total);
    assert_eq!(
        invoice.subtotal, item_sum,
        "invoice {} subtotal {} does not match item sum {}",
        invoice.id, invoice.subtotal, item_sum
    );
    assert_eq!(
        invoice.total,
        invoice.subtotal + invoice.tax_amount,
        "invoice {} total {} does not equal subtotal {} + tax {}",
        invoice.id,
        invoice.total,
        invoice.subtotal,
        invoice.tax_amount
    );
    assert!(
        !invoice.outstanding_balance().is_negative(),
        "invoice {} outstanding balance {} is negative",
        invoice.id,
        invoice.outstanding_balance()
    );
}

/// Asserts two money values are equal with a currency-aware message
pub fn assert_money_eq(actual: Money, expected: Money) {
    assert_eq!(
        actual, expected,
        "expected {} but got {}",
        expected, actual
    );
}
