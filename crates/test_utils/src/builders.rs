//! Test data builders
//!
//! Builders with sensible defaults so tests specify only the fields they
//! care about.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{CompanyId, Currency, Money, OrderId, ProductId};
use domain_credit::{AccountStatus, CreditAccount, OrderLine, OrderSnapshot};

use crate::fixtures::{MoneyFixtures, StringFixtures, TemporalFixtures};

/// Builder for credit accounts
pub struct CreditAccountBuilder {
    company_id: CompanyId,
    credit_limit: Money,
    payment_terms_days: u16,
    credit_score: u16,
    status: AccountStatus,
    used_credit: Money,
}

impl Default for CreditAccountBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CreditAccountBuilder {
    /// Creates a builder with the suite defaults: a 25,000 USD limit,
    /// Net 30 terms, nothing drawn
    pub fn new() -> Self {
        Self {
            company_id: CompanyId::new(),
            credit_limit: MoneyFixtures::credit_limit(),
            payment_terms_days: 30,
            credit_score: 720,
            status: AccountStatus::Active,
            used_credit: Money::zero(Currency::USD),
        }
    }

    /// Sets the owning company
    pub fn with_company_id(mut self, company_id: CompanyId) -> Self {
        self.company_id = company_id;
        self
    }

    /// Sets the credit limit
    pub fn with_credit_limit(mut self, limit: Money) -> Self {
        self.credit_limit = limit;
        self
    }

    /// Sets the payment terms
    pub fn with_payment_terms_days(mut self, days: u16) -> Self {
        self.payment_terms_days = days;
        self
    }

    /// Sets the credit score
    pub fn with_credit_score(mut self, score: u16) -> Self {
        self.credit_score = score;
        self
    }

    /// Sets the account status
    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    /// Pre-draws the given amount, as if invoices were already issued
    pub fn with_used_credit(mut self, used: Money) -> Self {
        self.used_credit = used;
        self
    }

    /// Builds the account
    ///
    /// # Panics
    ///
    /// Panics on invalid builder state; builders are test-only.
    pub fn build(self) -> CreditAccount {
        let now = TemporalFixtures::now();
        let mut account = CreditAccount::open(
            self.company_id,
            self.credit_limit,
            self.payment_terms_days,
            self.credit_score,
            now,
        )
        .expect("builder produced an invalid account");

        if !self.used_credit.is_zero() {
            account
                .draw(self.used_credit, now)
                .expect("builder produced an invalid draw");
        }
        account.status = self.status;
        account
    }
}

/// Builder for order snapshots
pub struct OrderSnapshotBuilder {
    order_id: OrderId,
    company_id: CompanyId,
    currency: Currency,
    lines: Vec<OrderLine>,
}

impl Default for OrderSnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderSnapshotBuilder {
    pub fn new() -> Self {
        Self {
            order_id: OrderId::new(),
            company_id: CompanyId::new(),
            currency: Currency::USD,
            lines: Vec::new(),
        }
    }

    /// Sets the ordering company
    pub fn with_company_id(mut self, company_id: CompanyId) -> Self {
        self.company_id = company_id;
        self
    }

    /// Adds a line
    pub fn with_line(mut self, name: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        self.lines
            .push(OrderLine::new(ProductId::new(), name, quantity, unit_price));
        self
    }

    /// Adds a line priced in dollars
    pub fn with_usd_line(self, quantity: u32, unit_price: Decimal) -> Self {
        let index = self.lines.len();
        let name = StringFixtures::product_name(index);
        self.with_line(name, quantity, MoneyFixtures::usd(unit_price))
    }

    /// Builds the snapshot; defaults to one case of twelve if no line was
    /// added
    pub fn build(self) -> OrderSnapshot {
        let lines = if self.lines.is_empty() {
            vec![OrderLine::new(
                ProductId::new(),
                StringFixtures::product_name(0),
                12,
                MoneyFixtures::usd(dec!(44.99)),
            )]
        } else {
            self.lines
        };
        OrderSnapshot::new(self.order_id, self.company_id, self.currency, lines)
    }
}
