//! Core Kernel - Foundational types for the trade-credit system
//!
//! This crate provides the building blocks shared by every domain module:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed entity identifiers
//! - Billing-timezone handling for due-date boundaries
//! - Port error types for external collaborators

pub mod error;
pub mod identifiers;
pub mod money;
pub mod ports;
pub mod temporal;

pub use error::CoreError;
pub use identifiers::{CompanyId, CreditAccountId, InvoiceId, OrderId, PaymentId, ProductId};
pub use money::{Currency, Money, MoneyError, Rate};
pub use ports::{DomainPort, PortError};
pub use temporal::{TemporalError, Timezone};
