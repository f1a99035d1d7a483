//! Domain events for the credit ledger
//!
//! Events are emitted by the facade after a mutation has committed. They
//! feed external notifiers (email, push) and reporting; delivery is
//! fire-and-forget, so a listener can never roll back a ledger mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CompanyId, CreditAccountId, InvoiceId, Money, PaymentId};

/// Events emitted by the credit ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CreditEvent {
    /// An invoice was issued and credit drawn
    InvoiceIssued {
        invoice_id: InvoiceId,
        company_id: CompanyId,
        total: Money,
        due_date: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    /// A pending invoice was voided and its balance released
    InvoiceCancelled {
        invoice_id: InvoiceId,
        company_id: CompanyId,
        released: Money,
        timestamp: DateTime<Utc>,
    },

    /// A payment completed against an invoice
    PaymentCompleted {
        payment_id: PaymentId,
        invoice_id: InvoiceId,
        company_id: CompanyId,
        amount: Money,
        /// True when this payment settled the invoice in full
        invoice_settled: bool,
        timestamp: DateTime<Utc>,
    },

    /// Purchasing on credit was blocked for the account
    AccountSuspended {
        account_id: CreditAccountId,
        company_id: CompanyId,
        timestamp: DateTime<Utc>,
    },

    /// A suspended account was restored to active
    AccountReinstated {
        account_id: CreditAccountId,
        company_id: CompanyId,
        timestamp: DateTime<Utc>,
    },
}

/// Subscriber for credit events
///
/// Implementations must be fast and must not panic; they run inline after
/// the commit and their outcome has no effect on the ledger.
pub trait CreditEventListener: Send + Sync {
    /// Handles one event
    fn handle(&self, event: &CreditEvent);
}
