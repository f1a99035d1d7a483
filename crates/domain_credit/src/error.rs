//! Credit domain errors

use core_kernel::{CompanyId, CreditAccountId, InvoiceId, Money, MoneyError, PortError, TemporalError};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::invoice::InvoiceStatus;

/// Errors that can occur in the credit domain
///
/// Grouped by how callers should react: validation errors are safe to retry
/// after correcting input, policy errors are business-rule rejections that
/// must be surfaced verbatim, not-found errors are expected outcomes to
/// branch on, and persistence errors are retryable with backoff.
#[derive(Debug, Error)]
pub enum CreditError {
    /// Input failed shape or range validation before any mutation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Payment amount must be strictly positive
    #[error("Invalid payment amount: {amount}")]
    InvalidAmount { amount: Decimal },

    /// Issuing the invoice would push the account past its credit limit
    #[error("Credit limit exceeded: requested {requested}, available {available}")]
    CreditLimitExceeded { requested: Money, available: Money },

    /// Payment is larger than the whole invoice
    #[error("Overpayment: {amount} exceeds invoice total {total}")]
    Overpayment { amount: Money, total: Money },

    /// Payment is larger than what remains outstanding on the invoice
    #[error("Payment {amount} exceeds outstanding balance {outstanding}")]
    PaymentExceedsBalance { amount: Money, outstanding: Money },

    /// Account must be active for the operation
    #[error("Account {0} is not active")]
    AccountNotActive(CreditAccountId),

    /// Invoice is not in a payable state
    #[error("Invoice {id} is not payable (status {status:?})")]
    InvoiceNotPayable { id: InvoiceId, status: InvoiceStatus },

    /// Invoice is not in a cancellable state
    #[error("Invoice {id} cannot be cancelled (status {status:?})")]
    InvoiceNotCancellable { id: InvoiceId, status: InvoiceStatus },

    /// The company has no credit account; callers branch to an
    /// "apply for credit" flow rather than treating this as fatal
    #[error("No credit account for company {0}")]
    NoCreditAccount(CompanyId),

    /// Referenced invoice does not exist
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(InvoiceId),

    /// The persistence collaborator failed; retryable by the caller,
    /// never retried by the core
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(#[from] PortError),

    /// Monetary arithmetic failed (currency mismatch)
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Due-date computation failed
    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),
}

impl CreditError {
    pub fn validation(message: impl Into<String>) -> Self {
        CreditError::Validation(message.into())
    }

    /// Returns true if the failure is worth retrying with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, CreditError::PersistenceUnavailable(e) if e.is_transient())
    }
}
