//! In-memory credit store
//!
//! A `CreditStore` adapter backed by tokio-guarded maps. Every read takes
//! the read lock, and `commit_ledger_update` applies all of its writes
//! under one write-lock critical section, giving the same no-partial-write
//! guarantee a database transaction would.
//!
//! The availability toggle lets tests exercise the persistence-failure
//! paths without a real backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use core_kernel::{CompanyId, DomainPort, InvoiceId, PaymentId, PortError};
use domain_credit::{CreditAccount, CreditStore, Invoice, Payment};

const SERVICE_NAME: &str = "memory-credit-store";

#[derive(Default)]
struct StoreInner {
    accounts: HashMap<CompanyId, CreditAccount>,
    invoices: HashMap<InvoiceId, Invoice>,
    payments: HashMap<PaymentId, Payment>,
}

/// In-memory `CreditStore` implementation
pub struct MemoryCreditStore {
    inner: RwLock<StoreInner>,
    available: AtomicBool,
    fail_commits: AtomicBool,
}

impl Default for MemoryCreditStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCreditStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            available: AtomicBool::new(true),
            fail_commits: AtomicBool::new(false),
        }
    }

    /// Toggles availability; while false every operation fails as a
    /// transient outage
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// While true, reads succeed but `commit_ledger_update` fails, which
    /// simulates the backend dropping out mid-operation
    pub fn set_commit_failures(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Number of stored payments (test introspection)
    pub async fn payment_count(&self) -> usize {
        self.inner.read().await.payments.len()
    }

    fn check_available(&self) -> Result<(), PortError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(PortError::unavailable(SERVICE_NAME))
        }
    }
}

impl DomainPort for MemoryCreditStore {}

#[async_trait]
impl CreditStore for MemoryCreditStore {
    #[instrument(skip(self), fields(company_id = %company_id))]
    async fn load_account(
        &self,
        company_id: CompanyId,
    ) -> Result<Option<CreditAccount>, PortError> {
        self.check_available()?;
        debug!("loading account");
        Ok(self.inner.read().await.accounts.get(&company_id).cloned())
    }

    #[instrument(skip(self, account), fields(company_id = %account.company_id))]
    async fn save_account(&self, account: &CreditAccount) -> Result<(), PortError> {
        self.check_available()?;
        debug!("saving account");
        self.inner
            .write()
            .await
            .accounts
            .insert(account.company_id, account.clone());
        Ok(())
    }

    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    async fn load_invoice(&self, invoice_id: InvoiceId) -> Result<Option<Invoice>, PortError> {
        self.check_available()?;
        Ok(self.inner.read().await.invoices.get(&invoice_id).cloned())
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    async fn load_invoices(&self, company_id: CompanyId) -> Result<Vec<Invoice>, PortError> {
        self.check_available()?;
        let inner = self.inner.read().await;
        Ok(inner
            .invoices
            .values()
            .filter(|invoice| invoice.company_id == company_id)
            .cloned()
            .collect())
    }

    #[instrument(skip(self), fields(company_id = %company_id))]
    async fn load_payments(&self, company_id: CompanyId) -> Result<Vec<Payment>, PortError> {
        self.check_available()?;
        let inner = self.inner.read().await;
        Ok(inner
            .payments
            .values()
            .filter(|payment| {
                inner
                    .invoices
                    .get(&payment.invoice_id)
                    .map(|invoice| invoice.company_id == company_id)
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    #[instrument(
        skip(self, account, invoice, payment),
        fields(company_id = %account.company_id, invoice_id = %invoice.id)
    )]
    async fn commit_ledger_update(
        &self,
        account: &CreditAccount,
        invoice: &Invoice,
        payment: Option<&Payment>,
    ) -> Result<(), PortError> {
        self.check_available()?;
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(PortError::unavailable(SERVICE_NAME));
        }
        debug!(with_payment = payment.is_some(), "committing ledger update");

        // Single critical section: either every write lands or none does
        let mut inner = self.inner.write().await;
        inner.accounts.insert(account.company_id, account.clone());
        inner.invoices.insert(invoice.id, invoice.clone());
        if let Some(payment) = payment {
            inner.payments.insert(payment.id, payment.clone());
        }
        Ok(())
    }
}
