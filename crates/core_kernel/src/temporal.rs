//! Time handling for billing boundaries
//!
//! Due dates are business-day boundaries, not instants: a "Net 30" invoice
//! is payable until the end of the 30th day in the seller's billing
//! timezone. This module anchors those boundaries in UTC.

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid date arithmetic: {0}")]
    InvalidDate(String),
}

/// Timezone wrapper for the billing jurisdiction
///
/// Wraps chrono_tz::Tz with string-based serde support so it can live in
/// configuration files and environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Converts a UTC datetime to the local timezone
    pub fn to_local(&self, utc: DateTime<Utc>) -> DateTime<Tz> {
        utc.with_timezone(&self.0)
    }

    /// Gets the start of day (00:00:00) in this timezone as UTC
    pub fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>, TemporalError> {
        date.and_hms_opt(0, 0, 0)
            .and_then(|dt| dt.and_local_timezone(self.0).single())
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| TemporalError::InvalidDate(date.to_string()))
    }

    /// Gets the end of day (23:59:59) in this timezone as UTC
    pub fn end_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>, TemporalError> {
        date.and_hms_opt(23, 59, 59)
            .and_then(|dt| dt.and_local_timezone(self.0).single())
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| TemporalError::InvalidDate(date.to_string()))
    }

    /// Computes the due instant for net payment terms: end of the local
    /// business day `terms_days` days after the issue instant.
    pub fn net_terms_due(
        &self,
        issued_at: DateTime<Utc>,
        terms_days: u16,
    ) -> Result<DateTime<Utc>, TemporalError> {
        let local_issue_date = issued_at.with_timezone(&self.0).date_naive();
        let due_date = local_issue_date
            .checked_add_days(Days::new(terms_days as u64))
            .ok_or_else(|| TemporalError::InvalidDate(local_issue_date.to_string()))?;
        self.end_of_day(due_date)
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}
