//! Ledger operations
//!
//! Invariant-preserving mutations over an account and its invoices. Each
//! operation validates everything before touching state, then applies both
//! sides of the mutation (invoice and account) so that
//! `available_credit == credit_limit - used_credit` holds on return. The
//! functions are pure with respect to I/O: the facade runs them on working
//! copies and persists the full result in one atomic commit.

use chrono::{DateTime, Utc};
use tracing::debug;

use core_kernel::Money;

use crate::account::CreditAccount;
use crate::error::CreditError;
use crate::invoice::{Invoice, InvoiceStatus, LineItem};
use crate::order::OrderSnapshot;
use crate::payment::{Payment, PaymentMethod};
use crate::policy::{CreditPolicy, OverpaymentPolicy};

/// Issues a pending invoice for an order and draws the account
///
/// The subtotal comes from the order lines, tax from the configured rate,
/// and the due date from the account's net terms anchored to the end of the
/// billing day.
///
/// # Errors
///
/// - `AccountNotActive` unless the account status is active
/// - `Validation` for a malformed order or currency mismatch
/// - `CreditLimitExceeded` when the draw would pass the limit and the
///   policy disallows running over
pub fn issue_invoice(
    account: &mut CreditAccount,
    order: &OrderSnapshot,
    policy: &CreditPolicy,
    now: DateTime<Utc>,
) -> Result<Invoice, CreditError> {
    if !account.is_active() {
        return Err(CreditError::AccountNotActive(account.id));
    }
    if order.company_id != account.company_id {
        return Err(CreditError::validation(format!(
            "order {} belongs to company {}, not {}",
            order.order_id, order.company_id, account.company_id
        )));
    }
    if order.currency != account.currency {
        return Err(CreditError::validation(format!(
            "order currency {} does not match account currency {}",
            order.currency, account.currency
        )));
    }
    order.validate()?;

    let items = order
        .lines
        .iter()
        .map(|line| LineItem::new(line.product_id, line.name.clone(), line.quantity, line.unit_price))
        .collect::<Result<Vec<_>, _>>()?;

    let subtotal = order.subtotal();
    let tax_amount = policy.tax_rate().apply(&subtotal);
    let total = subtotal.checked_add(&tax_amount)?;

    let projected = account.used_credit.checked_add(&total)?;
    let over_limit = projected.checked_sub(&account.credit_limit)?.is_positive();
    if over_limit && !policy.allow_over_limit {
        return Err(CreditError::CreditLimitExceeded {
            requested: total,
            available: account.available_credit,
        });
    }

    let due_date = policy
        .billing_timezone
        .net_terms_due(now, account.payment_terms_days)?;

    let invoice = Invoice::issue(
        order.order_id,
        account.company_id,
        items,
        tax_amount,
        now,
        due_date,
    )?;

    account.draw(total, now)?;
    debug!(
        invoice_id = %invoice.id,
        total = %total,
        used_credit = %account.used_credit,
        "invoice issued"
    );
    Ok(invoice)
}

/// Applies a payment against a pending invoice and releases the account
///
/// A payment covering the exact outstanding balance settles the invoice.
/// A smaller payment reduces the balance and leaves the invoice pending.
/// A larger payment is governed by the overpayment policy: rejected by
/// default, or settled with the excess accrued to the account when the
/// policy allows carrying credit.
///
/// # Errors
///
/// - `InvoiceNotPayable` unless the invoice is pending
/// - `InvalidAmount` unless the amount is strictly positive
/// - `Overpayment` when rejecting an amount above the invoice total
/// - `PaymentExceedsBalance` when rejecting an amount above the
///   outstanding balance
pub fn apply_payment(
    account: &mut CreditAccount,
    invoice: &mut Invoice,
    amount: Money,
    method: PaymentMethod,
    reference: Option<String>,
    policy: &CreditPolicy,
    now: DateTime<Utc>,
) -> Result<Payment, CreditError> {
    if invoice.company_id != account.company_id {
        return Err(CreditError::validation(format!(
            "invoice {} belongs to company {}, not {}",
            invoice.id, invoice.company_id, account.company_id
        )));
    }
    if invoice.status != InvoiceStatus::Pending {
        return Err(CreditError::InvoiceNotPayable {
            id: invoice.id,
            status: invoice.status,
        });
    }
    if !amount.is_positive() {
        return Err(CreditError::InvalidAmount {
            amount: amount.amount(),
        });
    }

    let outstanding = invoice.outstanding_balance();
    let excess = amount.checked_sub(&outstanding)?;

    let settled = if excess.is_positive() {
        match policy.overpayment {
            OverpaymentPolicy::Reject => {
                return Err(if amount.checked_sub(&invoice.total)?.is_positive() {
                    CreditError::Overpayment {
                        amount,
                        total: invoice.total,
                    }
                } else {
                    CreditError::PaymentExceedsBalance {
                        amount,
                        outstanding,
                    }
                });
            }
            OverpaymentPolicy::CreditToAccount => outstanding,
        }
    } else {
        amount
    };

    let mut payment = Payment::new(invoice.id, amount, method, now)?;
    if let Some(reference) = reference {
        payment = payment.with_reference(reference);
    }

    invoice.record_payment(settled, now)?;
    account.release(settled, now)?;
    if excess.is_positive() {
        account.accrue_on_account_credit(excess, now)?;
    }
    account.last_payment_date = Some(now);
    payment.complete(now);

    debug!(
        payment_id = %payment.id,
        invoice_id = %invoice.id,
        settled = %settled,
        outstanding = %invoice.outstanding_balance(),
        "payment applied"
    );
    Ok(payment)
}

/// Voids a pending invoice and releases its outstanding balance
///
/// Amounts already settled by partial payments stay settled; only the
/// remaining balance is released from the account.
pub fn cancel_invoice(
    account: &mut CreditAccount,
    invoice: &mut Invoice,
    now: DateTime<Utc>,
) -> Result<Money, CreditError> {
    if invoice.company_id != account.company_id {
        return Err(CreditError::validation(format!(
            "invoice {} belongs to company {}, not {}",
            invoice.id, invoice.company_id, account.company_id
        )));
    }
    let released = invoice.outstanding_balance();
    invoice.cancel(now)?;
    account.release(released, now)?;
    debug!(invoice_id = %invoice.id, released = %released, "invoice cancelled");
    Ok(released)
}

/// The balance still owed on an invoice: `total - completed payments`
pub fn outstanding_balance(invoice: &Invoice) -> Money {
    invoice.outstanding_balance()
}

/// Earliest due date among still-pending invoices
///
/// Used to maintain `CreditAccount::next_payment_due` after every
/// mutation; `None` when nothing is owed.
pub fn next_payment_due(invoices: &[Invoice]) -> Option<DateTime<Utc>> {
    invoices
        .iter()
        .filter(|invoice| invoice.status == InvoiceStatus::Pending)
        .map(|invoice| invoice.due_date)
        .min()
}
