//! Test Utilities Crate
//!
//! Shared test infrastructure for the trade-credit workspace.
//!
//! # Modules
//!
//! - `fixtures`: pinned timestamps, standard amounts, generated strings
//! - `builders`: builder patterns for accounts and order snapshots
//! - `generators`: proptest strategies for domain values
//! - `assertions`: ledger-aware assertion helpers

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod generators;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use generators::*;
