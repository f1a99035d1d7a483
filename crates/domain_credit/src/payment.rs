//! Payment entity
//!
//! One payment settles (fully or partially) one invoice. Completed payments
//! are immutable; a failed payment has no ledger effect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{InvoiceId, Money, PaymentId};

use crate::error::CreditError;

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Bank transfer / ACH
    BankTransfer,
    /// Credit card
    CreditCard,
    /// Debit card
    DebitCard,
    /// Check
    Check,
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Submitted, settlement not yet confirmed
    Pending,
    /// Settled; immutable from here on
    Completed,
    /// Settlement failed; no ledger effect
    Failed,
}

/// A settlement transaction against an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Invoice being settled
    pub invoice_id: InvoiceId,
    /// Amount tendered (strictly positive)
    pub amount: Money,
    /// How the payment was made
    pub method: PaymentMethod,
    /// Opaque settlement reference from the payment provider
    pub reference: Option<String>,
    /// Status
    pub status: PaymentStatus,
    /// When the payment was submitted
    pub payment_date: DateTime<Utc>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a pending payment
    ///
    /// # Errors
    ///
    /// Returns `CreditError::InvalidAmount` unless the amount is strictly
    /// positive.
    pub fn new(
        invoice_id: InvoiceId,
        amount: Money,
        method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> Result<Self, CreditError> {
        if !amount.is_positive() {
            return Err(CreditError::InvalidAmount {
                amount: amount.amount(),
            });
        }

        Ok(Self {
            id: PaymentId::new_v7(),
            invoice_id,
            amount,
            method,
            reference: None,
            status: PaymentStatus::Pending,
            payment_date: now,
            created_at: now,
        })
    }

    /// Attaches the provider's settlement reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Marks the payment as settled
    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.status = PaymentStatus::Completed;
        self.payment_date = now;
    }

    /// Marks the payment as failed
    pub fn fail(&mut self) {
        self.status = PaymentStatus::Failed;
    }
}
