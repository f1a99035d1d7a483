//! Credit account entity
//!
//! A `CreditAccount` is the per-company ledger head: the credit limit
//! extended by underwriting, the credit currently drawn by unpaid invoices,
//! and the payment terms applied to new invoices. Balance fields are
//! maintained exclusively by the ledger operations; after every operation
//! `available_credit == credit_limit - used_credit` holds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CompanyId, CreditAccountId, Currency, Money};

use crate::error::CreditError;

/// Maximum supported credit score
pub const MAX_CREDIT_SCORE: u16 = 850;

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Account can be invoiced against
    Active,
    /// Purchasing on credit is blocked; history remains readable
    Suspended,
    /// Staged ahead of underwriting approval
    Pending,
}

/// A trade-credit account for a business customer
///
/// Accounts are created when underwriting approves a company and are never
/// deleted, only suspended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditAccount {
    /// Unique identifier
    pub id: CreditAccountId,
    /// Owning company (at most one active account per company)
    pub company_id: CompanyId,
    /// Account currency; all invoices and payments must match
    pub currency: Currency,
    /// Credit extended by underwriting (non-negative)
    pub credit_limit: Money,
    /// Sum of unpaid and partially paid invoice balances
    pub used_credit: Money,
    /// `credit_limit - used_credit`; negative only for accounts permitted
    /// to run over limit
    pub available_credit: Money,
    /// Overpayment carry accrued under the credit-to-account policy
    pub on_account_credit: Money,
    /// Net payment terms applied to new invoices (e.g., 30, 45)
    pub payment_terms_days: u16,
    /// Status
    pub status: AccountStatus,
    /// Credit score in [0, 850]
    pub credit_score: u16,
    /// When the last completed payment was applied
    pub last_payment_date: Option<DateTime<Utc>>,
    /// Earliest due date among open invoices
    pub next_payment_due: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl CreditAccount {
    /// Opens a new account for an approved company
    ///
    /// # Arguments
    ///
    /// * `company_id` - Owning company
    /// * `credit_limit` - Approved limit, must be non-negative
    /// * `payment_terms_days` - Net terms for new invoices
    /// * `credit_score` - Underwriting score, at most 850
    /// * `now` - Creation instant
    ///
    /// # Errors
    ///
    /// Returns `CreditError::Validation` for a negative limit or an
    /// out-of-range score.
    pub fn open(
        company_id: CompanyId,
        credit_limit: Money,
        payment_terms_days: u16,
        credit_score: u16,
        now: DateTime<Utc>,
    ) -> Result<Self, CreditError> {
        if credit_limit.is_negative() {
            return Err(CreditError::validation(format!(
                "credit limit must be non-negative, got {}",
                credit_limit
            )));
        }
        if credit_score > MAX_CREDIT_SCORE {
            return Err(CreditError::validation(format!(
                "credit score {} exceeds maximum {}",
                credit_score, MAX_CREDIT_SCORE
            )));
        }

        let currency = credit_limit.currency();
        Ok(Self {
            id: CreditAccountId::new_v7(),
            company_id,
            currency,
            credit_limit,
            used_credit: Money::zero(currency),
            available_credit: credit_limit,
            on_account_credit: Money::zero(currency),
            payment_terms_days,
            status: AccountStatus::Active,
            credit_score,
            last_payment_date: None,
            next_payment_due: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns true if the account can be invoiced against
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Draws credit when an invoice is issued
    ///
    /// Maintained by the ledger operations; callers elsewhere should go
    /// through `operations::issue_invoice`.
    pub fn draw(&mut self, amount: Money, now: DateTime<Utc>) -> Result<(), CreditError> {
        self.used_credit = self.used_credit.checked_add(&amount)?;
        self.recalculate(now);
        Ok(())
    }

    /// Releases drawn credit when an invoice balance is settled or cancelled
    ///
    /// # Errors
    ///
    /// Returns `CreditError::Validation` if the release would take
    /// `used_credit` below zero; the payment operations guarantee this
    /// never happens, so tripping it indicates a corrupted ledger.
    pub fn release(&mut self, amount: Money, now: DateTime<Utc>) -> Result<(), CreditError> {
        let remaining = self.used_credit.checked_sub(&amount)?;
        if remaining.is_negative() {
            return Err(CreditError::validation(format!(
                "release of {} exceeds drawn credit {}",
                amount, self.used_credit
            )));
        }
        self.used_credit = remaining;
        self.recalculate(now);
        Ok(())
    }

    /// Accrues an overpayment carry under the credit-to-account policy
    pub fn accrue_on_account_credit(
        &mut self,
        amount: Money,
        now: DateTime<Utc>,
    ) -> Result<(), CreditError> {
        self.on_account_credit = self.on_account_credit.checked_add(&amount)?;
        self.updated_at = now;
        Ok(())
    }

    /// Blocks further invoicing; history remains readable
    pub fn suspend(&mut self, now: DateTime<Utc>) {
        self.status = AccountStatus::Suspended;
        self.updated_at = now;
    }

    /// Restores a suspended or pending account to active
    pub fn reinstate(&mut self, now: DateTime<Utc>) {
        self.status = AccountStatus::Active;
        self.updated_at = now;
    }

    fn recalculate(&mut self, now: DateTime<Utc>) {
        self.available_credit = self.credit_limit - self.used_credit;
        self.updated_at = now;
    }
}
