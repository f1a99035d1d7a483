//! Credit Domain - Trade-Credit Ledger and Valuation
//!
//! This crate implements the trade-credit subsystem for business accounts:
//! credit limits and drawn balances, invoices issued at order completion,
//! payments that settle them, and the derived utilization and health
//! metrics that gate purchasing.
//!
//! # Invariants
//!
//! - `available_credit == credit_limit - used_credit` after every operation
//! - `invoice.total == subtotal + tax_amount`, exact decimal arithmetic
//! - Payments never exceed an invoice's outstanding balance unless the
//!   overpayment policy explicitly carries the excess to the account
//! - "Overdue" is derived from the due date and an injected `now`, never
//!   persisted
//!
//! # Entry point
//!
//! External callers go through [`CreditService`]:
//!
//! ```rust,ignore
//! use domain_credit::{CreditService, CreditPolicy};
//!
//! let service = CreditService::new(store, CreditPolicy::default());
//! let summary = service.get_account_summary(company_id).await?;
//! let payment = service
//!     .pay_invoice(invoice_id, amount, PaymentMethod::BankTransfer, None)
//!     .await?;
//! ```

pub mod account;
pub mod error;
pub mod events;
pub mod invoice;
pub mod operations;
pub mod order;
pub mod payment;
pub mod policy;
pub mod ports;
pub mod service;
pub mod valuation;

pub use account::{AccountStatus, CreditAccount};
pub use error::CreditError;
pub use events::{CreditEvent, CreditEventListener};
pub use invoice::{Invoice, InvoiceDisplayStatus, InvoiceStatus, LineItem};
pub use order::{OrderLine, OrderSnapshot};
pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use policy::{CreditPolicy, OverpaymentPolicy};
pub use ports::CreditStore;
pub use service::{AccountSummary, CreditService, TimelineEntry};
pub use valuation::CreditHealth;
