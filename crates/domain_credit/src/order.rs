//! Order snapshots consumed by invoicing
//!
//! Orders are owned by an external system; invoicing only ever reads a
//! point-in-time snapshot of the confirmed line items. The credit core
//! never mutates orders.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CompanyId, Currency, Money, OrderId, ProductId};

use crate::error::CreditError;

/// A confirmed order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Catalog product reference
    pub product_id: ProductId,
    /// Product name at order time
    pub name: String,
    /// Units ordered
    pub quantity: u32,
    /// Price per unit at order time
    pub unit_price: Money,
}

impl OrderLine {
    /// Creates a new order line
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            product_id,
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    /// The extended line total: `quantity * unit_price`
    pub fn total(&self) -> Money {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A read-only snapshot of a completed order, ready for invoicing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    /// External order reference
    pub order_id: OrderId,
    /// Ordering company
    pub company_id: CompanyId,
    /// Order currency
    pub currency: Currency,
    /// Confirmed line items
    pub lines: Vec<OrderLine>,
}

impl OrderSnapshot {
    /// Creates a new order snapshot
    pub fn new(
        order_id: OrderId,
        company_id: CompanyId,
        currency: Currency,
        lines: Vec<OrderLine>,
    ) -> Self {
        Self {
            order_id,
            company_id,
            currency,
            lines,
        }
    }

    /// Sum of line totals
    pub fn subtotal(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(self.currency), |acc, line| acc + line.total())
    }

    /// Validates the snapshot before invoicing
    ///
    /// # Errors
    ///
    /// Returns `CreditError::Validation` when the snapshot has no lines,
    /// a zero quantity, a negative unit price, or a currency mismatch.
    pub fn validate(&self) -> Result<(), CreditError> {
        if self.lines.is_empty() {
            return Err(CreditError::validation("order has no line items"));
        }
        for line in &self.lines {
            if line.quantity == 0 {
                return Err(CreditError::validation(format!(
                    "line '{}' has zero quantity",
                    line.name
                )));
            }
            if line.unit_price.is_negative() {
                return Err(CreditError::validation(format!(
                    "line '{}' has negative unit price",
                    line.name
                )));
            }
            if line.unit_price.currency() != self.currency {
                return Err(CreditError::validation(format!(
                    "line '{}' is priced in {} but the order is in {}",
                    line.name,
                    line.unit_price.currency(),
                    self.currency
                )));
            }
        }
        Ok(())
    }
}
