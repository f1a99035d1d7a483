//! Invoice entity
//!
//! Invoices are issued against a credit account at order completion and
//! settle through payments. Only `Pending`, `Paid`, and `Cancelled` are
//! persisted; "overdue" is always derived from the due date and an injected
//! `now` so it can never go stale.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CompanyId, Currency, InvoiceId, Money, OrderId, ProductId};

use crate::error::CreditError;

/// Persisted invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Outstanding balance remains
    Pending,
    /// Fully settled; immutable from here on
    Paid,
    /// Voided before settlement
    Cancelled,
}

/// Display status, including the derived overdue state
///
/// Never persisted; computed at read time from (`due_date`, `status`, `now`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceDisplayStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

/// A priced line on an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Catalog product reference
    pub product_id: ProductId,
    /// Product name at invoicing time
    pub name: String,
    /// Units invoiced
    pub quantity: u32,
    /// Price per unit
    pub unit_price: Money,
    /// Extended total: `quantity * unit_price`
    pub total: Money,
}

impl LineItem {
    /// Creates a line item, computing the extended total
    ///
    /// # Errors
    ///
    /// Returns `CreditError::Validation` for a zero quantity or negative
    /// unit price.
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Result<Self, CreditError> {
        let name = name.into();
        if quantity == 0 {
            return Err(CreditError::validation(format!(
                "line '{}' has zero quantity",
                name
            )));
        }
        if unit_price.is_negative() {
            return Err(CreditError::validation(format!(
                "line '{}' has negative unit price",
                name
            )));
        }
        let total = unit_price * Decimal::from(quantity);
        Ok(Self {
            product_id,
            name,
            quantity,
            unit_price,
            total,
        })
    }
}

/// An invoice owed against a credit account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// Order this invoice bills (external reference, read-only)
    pub order_id: OrderId,
    /// Owning company
    pub company_id: CompanyId,
    /// Invoice currency
    pub currency: Currency,
    /// When the invoice was issued
    pub issue_date: DateTime<Utc>,
    /// End of the payment window
    pub due_date: DateTime<Utc>,
    /// When the invoice was fully settled
    pub paid_date: Option<DateTime<Utc>>,
    /// Billed line items
    pub items: Vec<LineItem>,
    /// Sum of line totals
    pub subtotal: Money,
    /// Tax charged on the subtotal
    pub tax_amount: Money,
    /// `subtotal + tax_amount`, exact
    pub total: Money,
    /// Completed payments applied so far
    pub amount_paid: Money,
    /// Persisted status
    pub status: InvoiceStatus,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Issues a new pending invoice from priced line items
    ///
    /// # Errors
    ///
    /// Returns `CreditError::Validation` when the item list is empty, an
    /// item's extended total disagrees with `quantity * unit_price`, the
    /// tax amount is negative or in the wrong currency, or the due date
    /// precedes the issue date.
    pub fn issue(
        order_id: OrderId,
        company_id: CompanyId,
        items: Vec<LineItem>,
        tax_amount: Money,
        issue_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) -> Result<Self, CreditError> {
        if items.is_empty() {
            return Err(CreditError::validation("invoice has no line items"));
        }
        let currency = items[0].unit_price.currency();
        let mut subtotal = Money::zero(currency);
        for item in &items {
            let expected = item.unit_price * Decimal::from(item.quantity);
            if item.total != expected {
                return Err(CreditError::validation(format!(
                    "line '{}' total {} does not equal quantity * unit price {}",
                    item.name, item.total, expected
                )));
            }
            subtotal = subtotal.checked_add(&item.total)?;
        }
        if tax_amount.is_negative() {
            return Err(CreditError::validation("tax amount must be non-negative"));
        }
        if due_date < issue_date {
            return Err(CreditError::validation(format!(
                "due date {} precedes issue date {}",
                due_date, issue_date
            )));
        }
        let total = subtotal.checked_add(&tax_amount)?;

        Ok(Self {
            id: InvoiceId::new_v7(),
            order_id,
            company_id,
            currency,
            issue_date,
            due_date,
            paid_date: None,
            items,
            subtotal,
            tax_amount,
            total,
            amount_paid: Money::zero(currency),
            status: InvoiceStatus::Pending,
            created_at: issue_date,
            updated_at: issue_date,
        })
    }

    /// The balance still owed: `total - amount_paid`
    pub fn outstanding_balance(&self) -> Money {
        self.total - self.amount_paid
    }

    /// Records a settled amount against the invoice
    ///
    /// The amount must not exceed the outstanding balance; the payment
    /// operation enforces the overpayment policy before calling this.
    /// Transitions to `Paid` when the outstanding balance reaches exactly
    /// zero.
    pub fn record_payment(&mut self, amount: Money, now: DateTime<Utc>) -> Result<(), CreditError> {
        if self.status != InvoiceStatus::Pending {
            return Err(CreditError::InvoiceNotPayable {
                id: self.id,
                status: self.status,
            });
        }
        let outstanding = self.outstanding_balance();
        if amount.checked_sub(&outstanding)?.is_positive() {
            return Err(CreditError::PaymentExceedsBalance {
                amount,
                outstanding,
            });
        }

        self.amount_paid = self.amount_paid.checked_add(&amount)?;
        self.updated_at = now;
        if self.outstanding_balance().is_zero() {
            self.status = InvoiceStatus::Paid;
            self.paid_date = Some(now);
        }
        Ok(())
    }

    /// Voids a pending invoice
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), CreditError> {
        if self.status != InvoiceStatus::Pending {
            return Err(CreditError::InvoiceNotCancellable {
                id: self.id,
                status: self.status,
            });
        }
        self.status = InvoiceStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }

    /// True when the payment window has closed on an unsettled invoice
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now > self.due_date && self.status == InvoiceStatus::Pending
    }

    /// Status for display, with overdue derived from `now`
    pub fn display_status(&self, now: DateTime<Utc>) -> InvoiceDisplayStatus {
        match self.status {
            InvoiceStatus::Paid => InvoiceDisplayStatus::Paid,
            InvoiceStatus::Cancelled => InvoiceDisplayStatus::Cancelled,
            InvoiceStatus::Pending if self.is_overdue(now) => InvoiceDisplayStatus::Overdue,
            InvoiceStatus::Pending => InvoiceDisplayStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn due() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 15, 23, 59, 59).unwrap()
    }

    fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    fn test_invoice() -> Invoice {
        let items = vec![
            LineItem::new(ProductId::new(), "Bourbon Case", 10, usd(dec!(450.00))).unwrap(),
            LineItem::new(ProductId::new(), "Mezcal", 6, usd(dec!(75.66))).unwrap(),
        ];
        // subtotal 4953.96, 9% tax 445.86, total 5399.82
        Invoice::issue(
            OrderId::new(),
            CompanyId::new(),
            items,
            usd(dec!(445.86)),
            now(),
            due(),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_computes_totals() {
        let invoice = test_invoice();
        assert_eq!(invoice.subtotal.amount(), dec!(4953.96));
        assert_eq!(invoice.total, invoice.subtotal + invoice.tax_amount);
        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.outstanding_balance(), invoice.total);
    }

    #[test]
    fn test_issue_rejects_empty_items() {
        let result = Invoice::issue(
            OrderId::new(),
            CompanyId::new(),
            vec![],
            usd(dec!(0)),
            now(),
            due(),
        );
        assert!(matches!(result, Err(CreditError::Validation(_))));
    }

    #[test]
    fn test_issue_rejects_tampered_line_total() {
        let mut item = LineItem::new(ProductId::new(), "Rum", 2, usd(dec!(30.00))).unwrap();
        item.total = usd(dec!(61.00));

        let result = Invoice::issue(
            OrderId::new(),
            CompanyId::new(),
            vec![item],
            usd(dec!(0)),
            now(),
            due(),
        );
        assert!(matches!(result, Err(CreditError::Validation(_))));
    }

    #[test]
    fn test_issue_rejects_due_before_issue() {
        let items = vec![LineItem::new(ProductId::new(), "Rum", 1, usd(dec!(30))).unwrap()];
        let result = Invoice::issue(
            OrderId::new(),
            CompanyId::new(),
            items,
            usd(dec!(0)),
            due(),
            now(),
        );
        assert!(matches!(result, Err(CreditError::Validation(_))));
    }

    #[test]
    fn test_partial_payment_keeps_pending() {
        let mut invoice = test_invoice();
        invoice.record_payment(usd(dec!(2000.00)), now()).unwrap();

        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.outstanding_balance().amount(), dec!(3399.82));
        assert!(invoice.paid_date.is_none());
    }

    #[test]
    fn test_full_payment_transitions_to_paid() {
        let mut invoice = test_invoice();
        let total = invoice.total;
        invoice.record_payment(total, now()).unwrap();

        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert!(invoice.outstanding_balance().is_zero());
        assert_eq!(invoice.paid_date, Some(now()));
    }

    #[test]
    fn test_payment_beyond_outstanding_is_rejected() {
        let mut invoice = test_invoice();
        let too_much = invoice.total + usd(dec!(0.01));

        let result = invoice.record_payment(too_much, now());
        assert!(matches!(result, Err(CreditError::PaymentExceedsBalance { .. })));
        // Ledger unchanged
        assert!(invoice.amount_paid.is_zero());
    }

    #[test]
    fn test_paid_invoice_is_immutable() {
        let mut invoice = test_invoice();
        let total = invoice.total;
        invoice.record_payment(total, now()).unwrap();

        assert!(matches!(
            invoice.record_payment(usd(dec!(1)), now()),
            Err(CreditError::InvoiceNotPayable { .. })
        ));
        assert!(matches!(
            invoice.cancel(now()),
            Err(CreditError::InvoiceNotCancellable { .. })
        ));
    }

    #[test]
    fn test_cancel_pending_invoice() {
        let mut invoice = test_invoice();
        invoice.cancel(now()).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Cancelled);
    }

    #[test]
    fn test_overdue_is_derived_not_stored() {
        let invoice = test_invoice();
        let before_due = due() - chrono::Duration::days(1);
        let after_due = due() + chrono::Duration::days(1);

        assert!(!invoice.is_overdue(before_due));
        assert!(invoice.is_overdue(after_due));
        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.display_status(after_due), InvoiceDisplayStatus::Overdue);
        assert_eq!(invoice.display_status(before_due), InvoiceDisplayStatus::Pending);
    }

    #[test]
    fn test_paid_invoice_is_never_overdue() {
        let mut invoice = test_invoice();
        let total = invoice.total;
        invoice.record_payment(total, now()).unwrap();

        let after_due = due() + chrono::Duration::days(10);
        assert!(!invoice.is_overdue(after_due));
        assert_eq!(invoice.display_status(after_due), InvoiceDisplayStatus::Paid);
    }
}
