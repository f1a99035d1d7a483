//! Credit domain ports
//!
//! The `CreditStore` trait is everything the credit core needs from its
//! persistence collaborator. Adapters must provide read-committed reads and
//! an atomic `commit_ledger_update`: either the whole account/invoice/
//! payment write lands, or none of it does. The in-workspace adapter lives
//! in `infra_store`; database-backed adapters implement the same trait.

use async_trait::async_trait;

use core_kernel::{CompanyId, DomainPort, InvoiceId, PortError};

use crate::account::CreditAccount;
use crate::invoice::Invoice;
use crate::payment::Payment;

/// Persistence port for the credit ledger
#[async_trait]
pub trait CreditStore: DomainPort {
    /// Loads the account owned by a company, if one exists
    async fn load_account(&self, company_id: CompanyId) -> Result<Option<CreditAccount>, PortError>;

    /// Creates or replaces an account
    async fn save_account(&self, account: &CreditAccount) -> Result<(), PortError>;

    /// Loads a single invoice by id
    async fn load_invoice(&self, invoice_id: InvoiceId) -> Result<Option<Invoice>, PortError>;

    /// Loads all invoices owned by a company
    async fn load_invoices(&self, company_id: CompanyId) -> Result<Vec<Invoice>, PortError>;

    /// Loads all payments against a company's invoices
    async fn load_payments(&self, company_id: CompanyId) -> Result<Vec<Payment>, PortError>;

    /// Atomically persists one ledger mutation
    ///
    /// Writes the account, the invoice, and (for payment operations) the
    /// payment in a single transaction so a failure leaves no partial
    /// ledger state observable.
    async fn commit_ledger_update(
        &self,
        account: &CreditAccount,
        invoice: &Invoice,
        payment: Option<&Payment>,
    ) -> Result<(), PortError>;
}
