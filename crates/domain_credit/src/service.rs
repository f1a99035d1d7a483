//! Credit facade
//!
//! `CreditService` is the single entry point the rest of the platform
//! calls: account summaries and timelines for presentation, invoice
//! issuance for order completion, payments for settlement. It owns the
//! concurrency contract: mutations against one account serialize through a
//! per-account async lock, so the outstanding-balance check-then-update is
//! a critical section; different accounts never contend.
//!
//! Wall-clock time enters the system here and only here; everything below
//! takes an explicit `now`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use core_kernel::{CompanyId, InvoiceId, Money, PaymentId};

use crate::account::CreditAccount;
use crate::error::CreditError;
use crate::events::{CreditEvent, CreditEventListener};
use crate::invoice::{Invoice, InvoiceStatus};
use crate::operations;
use crate::order::OrderSnapshot;
use crate::payment::{Payment, PaymentMethod};
use crate::policy::CreditPolicy;
use crate::ports::CreditStore;
use crate::valuation::{self, CreditHealth};

/// How many invoices and payments a summary carries
const RECENT_ENTRIES: usize = 5;

/// Read-only account overview for presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    /// The account snapshot
    pub account: CreditAccount,
    /// Utilization percentage (over 100 means over limit)
    pub utilization: Decimal,
    /// Health classification of the utilization
    pub health: CreditHealth,
    /// Due-date bucket for the next scheduled payment
    pub next_payment_due_label: String,
    /// Most recent invoices, newest first
    pub recent_invoices: Vec<Invoice>,
    /// Most recent payments, newest first
    pub recent_payments: Vec<Payment>,
}

/// One entry in the account activity timeline
///
/// A tagged union so presentation code matches exhaustively instead of
/// sniffing fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineEntry {
    Invoice {
        id: InvoiceId,
        date: DateTime<Utc>,
        amount: Money,
        reference: String,
        status: InvoiceStatus,
    },
    Payment {
        id: PaymentId,
        date: DateTime<Utc>,
        amount: Money,
        reference: String,
    },
}

impl TimelineEntry {
    /// The entry's date, for ordering
    pub fn date(&self) -> DateTime<Utc> {
        match self {
            TimelineEntry::Invoice { date, .. } => *date,
            TimelineEntry::Payment { date, .. } => *date,
        }
    }

    fn entity_uuid(&self) -> Uuid {
        match self {
            TimelineEntry::Invoice { id, .. } => *id.as_uuid(),
            TimelineEntry::Payment { id, .. } => *id.as_uuid(),
        }
    }
}

/// Per-company async locks serializing ledger mutations
#[derive(Default)]
struct AccountLocks {
    inner: Mutex<HashMap<CompanyId, Arc<tokio::sync::Mutex<()>>>>,
}

impl AccountLocks {
    fn for_company(&self, company_id: CompanyId) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().expect("account lock map poisoned");
        map.entry(company_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

/// The credit facade
pub struct CreditService {
    store: Arc<dyn CreditStore>,
    policy: CreditPolicy,
    listeners: Vec<Arc<dyn CreditEventListener>>,
    locks: AccountLocks,
}

impl CreditService {
    /// Creates a service over a store with the given policy
    pub fn new(store: Arc<dyn CreditStore>, policy: CreditPolicy) -> Self {
        Self {
            store,
            policy,
            listeners: Vec::new(),
            locks: AccountLocks::default(),
        }
    }

    /// Registers an event listener
    pub fn with_listener(mut self, listener: Arc<dyn CreditEventListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Composes the account overview consumed by the account screen
    ///
    /// # Errors
    ///
    /// `NoCreditAccount` when the company has no account; callers branch to
    /// an "apply for credit" state.
    pub async fn get_account_summary(
        &self,
        company_id: CompanyId,
    ) -> Result<AccountSummary, CreditError> {
        self.summary_at(company_id, Utc::now()).await
    }

    /// `get_account_summary` with an injected clock, for deterministic reads
    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn summary_at(
        &self,
        company_id: CompanyId,
        now: DateTime<Utc>,
    ) -> Result<AccountSummary, CreditError> {
        let account = self.require_account(company_id).await?;
        let mut invoices = self.store.load_invoices(company_id).await?;
        let mut payments = self.store.load_payments(company_id).await?;

        invoices.sort_by(|a, b| {
            b.issue_date
                .cmp(&a.issue_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        payments.sort_by(|a, b| {
            b.payment_date
                .cmp(&a.payment_date)
                .then_with(|| a.id.cmp(&b.id))
        });
        invoices.truncate(RECENT_ENTRIES);
        payments.truncate(RECENT_ENTRIES);

        let utilization = valuation::credit_utilization(&account);
        let health = CreditHealth::classify(utilization);
        let next_payment_due_label = valuation::next_payment_due_label(&account, now);
        debug!(%utilization, ?health, "summary composed");

        Ok(AccountSummary {
            account,
            utilization,
            health,
            next_payment_due_label,
            recent_invoices: invoices,
            recent_payments: payments,
        })
    }

    /// Issues an invoice for a completed order
    pub async fn issue_invoice(
        &self,
        company_id: CompanyId,
        order: &OrderSnapshot,
    ) -> Result<Invoice, CreditError> {
        self.issue_invoice_at(company_id, order, Utc::now()).await
    }

    /// `issue_invoice` with an injected clock
    #[instrument(skip(self, order), fields(company_id = %company_id, order_id = %order.order_id))]
    pub async fn issue_invoice_at(
        &self,
        company_id: CompanyId,
        order: &OrderSnapshot,
        now: DateTime<Utc>,
    ) -> Result<Invoice, CreditError> {
        let lock = self.locks.for_company(company_id);
        let _guard = lock.lock().await;

        let mut account = self.require_account(company_id).await?;
        let invoice = operations::issue_invoice(&mut account, order, &self.policy, now)?;

        let mut invoices = self.store.load_invoices(company_id).await?;
        invoices.push(invoice.clone());
        account.next_payment_due = operations::next_payment_due(&invoices);

        self.store
            .commit_ledger_update(&account, &invoice, None)
            .await?;
        info!(invoice_id = %invoice.id, total = %invoice.total, "invoice committed");

        self.emit(CreditEvent::InvoiceIssued {
            invoice_id: invoice.id,
            company_id,
            total: invoice.total,
            due_date: invoice.due_date,
            timestamp: now,
        });
        Ok(invoice)
    }

    /// Applies a payment to an invoice
    pub async fn pay_invoice(
        &self,
        invoice_id: InvoiceId,
        amount: Money,
        method: PaymentMethod,
        reference: Option<String>,
    ) -> Result<Payment, CreditError> {
        self.pay_invoice_at(invoice_id, amount, method, reference, Utc::now())
            .await
    }

    /// `pay_invoice` with an injected clock
    #[instrument(skip(self, reference), fields(invoice_id = %invoice_id, amount = %amount))]
    pub async fn pay_invoice_at(
        &self,
        invoice_id: InvoiceId,
        amount: Money,
        method: PaymentMethod,
        reference: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Payment, CreditError> {
        // First load only discovers the owning company; the authoritative
        // read happens under the account lock.
        let company_id = self
            .store
            .load_invoice(invoice_id)
            .await?
            .ok_or(CreditError::InvoiceNotFound(invoice_id))?
            .company_id;

        let lock = self.locks.for_company(company_id);
        let _guard = lock.lock().await;

        let mut invoice = self
            .store
            .load_invoice(invoice_id)
            .await?
            .ok_or(CreditError::InvoiceNotFound(invoice_id))?;
        let mut account = self.require_account(company_id).await?;

        let payment = operations::apply_payment(
            &mut account,
            &mut invoice,
            amount,
            method,
            reference,
            &self.policy,
            now,
        )?;

        let mut invoices = self.store.load_invoices(company_id).await?;
        if let Some(stored) = invoices.iter_mut().find(|i| i.id == invoice.id) {
            *stored = invoice.clone();
        }
        account.next_payment_due = operations::next_payment_due(&invoices);

        self.store
            .commit_ledger_update(&account, &invoice, Some(&payment))
            .await?;
        info!(
            payment_id = %payment.id,
            outstanding = %invoice.outstanding_balance(),
            "payment committed"
        );

        self.emit(CreditEvent::PaymentCompleted {
            payment_id: payment.id,
            invoice_id: invoice.id,
            company_id,
            amount: payment.amount,
            invoice_settled: invoice.status == InvoiceStatus::Paid,
            timestamp: now,
        });
        Ok(payment)
    }

    /// Voids a pending invoice and releases its balance
    pub async fn cancel_invoice(&self, invoice_id: InvoiceId) -> Result<Invoice, CreditError> {
        self.cancel_invoice_at(invoice_id, Utc::now()).await
    }

    /// `cancel_invoice` with an injected clock
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn cancel_invoice_at(
        &self,
        invoice_id: InvoiceId,
        now: DateTime<Utc>,
    ) -> Result<Invoice, CreditError> {
        let company_id = self
            .store
            .load_invoice(invoice_id)
            .await?
            .ok_or(CreditError::InvoiceNotFound(invoice_id))?
            .company_id;

        let lock = self.locks.for_company(company_id);
        let _guard = lock.lock().await;

        let mut invoice = self
            .store
            .load_invoice(invoice_id)
            .await?
            .ok_or(CreditError::InvoiceNotFound(invoice_id))?;
        let mut account = self.require_account(company_id).await?;

        let released = operations::cancel_invoice(&mut account, &mut invoice, now)?;

        let mut invoices = self.store.load_invoices(company_id).await?;
        if let Some(stored) = invoices.iter_mut().find(|i| i.id == invoice.id) {
            *stored = invoice.clone();
        }
        account.next_payment_due = operations::next_payment_due(&invoices);

        self.store
            .commit_ledger_update(&account, &invoice, None)
            .await?;
        info!(released = %released, "invoice cancellation committed");

        self.emit(CreditEvent::InvoiceCancelled {
            invoice_id: invoice.id,
            company_id,
            released,
            timestamp: now,
        });
        Ok(invoice)
    }

    /// Blocks further invoicing for a company's account
    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn suspend_account(&self, company_id: CompanyId) -> Result<CreditAccount, CreditError> {
        let now = Utc::now();
        let lock = self.locks.for_company(company_id);
        let _guard = lock.lock().await;

        let mut account = self.require_account(company_id).await?;
        account.suspend(now);
        self.store.save_account(&account).await?;

        self.emit(CreditEvent::AccountSuspended {
            account_id: account.id,
            company_id,
            timestamp: now,
        });
        Ok(account)
    }

    /// Restores a suspended account to active
    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn reinstate_account(
        &self,
        company_id: CompanyId,
    ) -> Result<CreditAccount, CreditError> {
        let now = Utc::now();
        let lock = self.locks.for_company(company_id);
        let _guard = lock.lock().await;

        let mut account = self.require_account(company_id).await?;
        account.reinstate(now);
        self.store.save_account(&account).await?;

        self.emit(CreditEvent::AccountReinstated {
            account_id: account.id,
            company_id,
            timestamp: now,
        });
        Ok(account)
    }

    /// Merged invoice/payment history, newest first
    ///
    /// Ordered descending by date; equal dates break ties by entity id so
    /// the result is deterministic.
    #[instrument(skip(self), fields(company_id = %company_id))]
    pub async fn build_timeline(
        &self,
        company_id: CompanyId,
    ) -> Result<Vec<TimelineEntry>, CreditError> {
        // Surface NoCreditAccount consistently with the summary
        let _ = self.require_account(company_id).await?;
        let invoices = self.store.load_invoices(company_id).await?;
        let payments = self.store.load_payments(company_id).await?;

        let mut entries: Vec<TimelineEntry> = invoices
            .into_iter()
            .map(|invoice| TimelineEntry::Invoice {
                id: invoice.id,
                date: invoice.issue_date,
                amount: invoice.total,
                reference: invoice.order_id.to_string(),
                status: invoice.status,
            })
            .chain(payments.into_iter().map(|payment| {
                let reference = payment
                    .reference
                    .clone()
                    .unwrap_or_else(|| payment.id.to_string());
                TimelineEntry::Payment {
                    id: payment.id,
                    date: payment.payment_date,
                    amount: payment.amount,
                    reference,
                }
            }))
            .collect();

        entries.sort_by(|a, b| {
            b.date()
                .cmp(&a.date())
                .then_with(|| a.entity_uuid().cmp(&b.entity_uuid()))
        });
        Ok(entries)
    }

    async fn require_account(&self, company_id: CompanyId) -> Result<CreditAccount, CreditError> {
        self.store
            .load_account(company_id)
            .await?
            .ok_or(CreditError::NoCreditAccount(company_id))
    }

    fn emit(&self, event: CreditEvent) {
        for listener in &self.listeners {
            listener.handle(&event);
        }
    }
}
