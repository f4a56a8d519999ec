//! # Temporal Types — UTC Dates
//!
//! Defines [`Date`], the value bound into date-typed fields. Dates are the
//! one primitive whose coercion never fails on kind: a number is read as
//! epoch milliseconds and a string is parsed. What is checked instead is
//! that the result is a well-formed, representable instant.
//!
//! ## Accepted Inputs
//!
//! - JSON numbers: milliseconds since the Unix epoch. Fractional parts are
//!   truncated toward zero.
//! - RFC 3339 strings with any offset, converted to UTC.
//! - `YYYY-MM-DD`, taken as midnight UTC.
//! - `YYYY-MM-DDTHH:MM:SS[.fff]` without an offset, taken as UTC.
//!
//! Every other kind is rejected.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::kind::Kind;

/// Reason a value could not form a date.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DateError {
    /// Epoch milliseconds outside the representable range.
    #[error("{0} ms is outside the representable date range")]
    OutOfRange(f64),

    /// String matched none of the accepted formats.
    #[error("{0:?} is not an RFC 3339 timestamp or YYYY-MM-DD date")]
    Unparsable(String),

    /// Value kind cannot describe a date.
    #[error("a {0} cannot be read as a date")]
    UnsupportedKind(Kind),
}

/// A UTC instant with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Date(DateTime<Utc>);

impl Date {
    /// Build a date from epoch milliseconds.
    pub fn from_epoch_millis(millis: i64) -> Result<Self, DateError> {
        DateTime::from_timestamp_millis(millis)
            .map(Self)
            .ok_or(DateError::OutOfRange(millis as f64))
    }

    /// Build a date from a `chrono::DateTime<Utc>`, truncating to milliseconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        let millis = dt.timestamp_millis();
        Self(DateTime::from_timestamp_millis(millis).unwrap_or(dt))
    }

    /// Parse a date string in one of the accepted formats.
    pub fn parse(s: &str) -> Result<Self, DateError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::from_utc(dt.with_timezone(&Utc)));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Ok(Self::from_utc(naive.and_utc()));
        }
        if let Some(midnight) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(Self::from_utc(midnight.and_utc()));
        }
        Err(DateError::Unparsable(s.to_string()))
    }

    /// Read a date out of a raw JSON value.
    pub fn from_value(value: &Value) -> Result<Self, DateError> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Self::from_epoch_millis(i);
                }
                let f = n.as_f64().unwrap_or(f64::NAN);
                if !f.is_finite() || f.abs() >= i64::MAX as f64 {
                    return Err(DateError::OutOfRange(f));
                }
                Self::from_epoch_millis(f.trunc() as i64)
            }
            Value::String(s) => Self::parse(s),
            other => Err(DateError::UnsupportedKind(Kind::of(other))),
        }
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Milliseconds since the Unix epoch.
    pub fn epoch_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Render as RFC 3339 with millisecond precision and `Z` suffix.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}
