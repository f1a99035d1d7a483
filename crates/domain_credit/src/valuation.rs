//! Credit valuation engine
//!
//! Pure, side-effect-free functions over account and invoice snapshots.
//! Every date computation takes an explicit `now` so results are
//! deterministic; the facade supplies wall-clock time at the boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::account::CreditAccount;
use crate::invoice::Invoice;

const SECONDS_PER_DAY: i64 = 86_400;

/// Credit health classification derived from utilization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditHealth {
    /// Utilization below 50%
    Excellent,
    /// Utilization in [50%, 70%)
    Good,
    /// Utilization in [70%, 90%)
    Caution,
    /// Utilization at or above 90%
    AtRisk,
}

impl CreditHealth {
    /// Classifies a utilization percentage
    ///
    /// Bands are lower-bound inclusive: exactly 50 is `Good`, exactly 70 is
    /// `Caution`, exactly 90 is `AtRisk`. Values over 100 stay `AtRisk`;
    /// the over-limit signal is preserved in the utilization number itself.
    pub fn classify(utilization: Decimal) -> Self {
        if utilization >= dec!(90) {
            CreditHealth::AtRisk
        } else if utilization >= dec!(70) {
            CreditHealth::Caution
        } else if utilization >= dec!(50) {
            CreditHealth::Good
        } else {
            CreditHealth::Excellent
        }
    }
}

/// Percentage of the credit limit currently drawn
///
/// `used_credit / credit_limit * 100`, exact decimal. Values above 100 are
/// meaningful (over-limit accounts) and are not clamped here. A zero-limit
/// account reports 0 when nothing is drawn and 100 otherwise.
pub fn credit_utilization(account: &CreditAccount) -> Decimal {
    let limit = account.credit_limit.amount();
    let used = account.used_credit.amount();
    if limit.is_zero() {
        return if used.is_zero() { dec!(0) } else { dec!(100) };
    }
    (used / limit * dec!(100)).round_dp(2)
}

/// Whole days until the due instant, rounding partial days up
///
/// Negative means overdue by that many days; zero means due today; one
/// means due tomorrow.
pub fn days_until_due(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (due - now).num_seconds();
    let days = seconds / SECONDS_PER_DAY;
    if seconds > 0 && seconds % SECONDS_PER_DAY != 0 {
        days + 1
    } else {
        days
    }
}

/// True when the payment window has closed on an unsettled invoice
pub fn is_overdue(invoice: &Invoice, now: DateTime<Utc>) -> bool {
    invoice.is_overdue(now)
}

/// Human-readable due-date bucket
///
/// Buckets: overdue ("N days overdue"), "Due today", "Due tomorrow",
/// "Due in N days" inside a week, otherwise the absolute date.
pub fn due_label(due: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = days_until_due(due, now);
    match days {
        d if d < 0 => {
            let overdue = -d;
            if overdue == 1 {
                "1 day overdue".to_string()
            } else {
                format!("{} days overdue", overdue)
            }
        }
        0 => "Due today".to_string(),
        1 => "Due tomorrow".to_string(),
        d if d < 7 => format!("Due in {} days", d),
        _ => format!("Due {}", due.format("%b %-d, %Y")),
    }
}

/// Due-date bucket for the account's next scheduled payment
///
/// Absent a next due date the account owes nothing: "No payments due".
pub fn next_payment_due_label(account: &CreditAccount, now: DateTime<Utc>) -> String {
    match account.next_payment_due {
        Some(due) => due_label(due, now),
        None => "No payments due".to_string(),
    }
}
