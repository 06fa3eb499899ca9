//! Validation of user-supplied times and dates.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Format for user-supplied dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Invalid command-line time or date input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Not four digits.
    #[error("time must be in HHMM format (e.g., 1200 for noon), got {value:?}")]
    InvalidTimeFormat { value: String },
    /// Four digits, but hour or minute out of range.
    #[error("invalid time values: hour must be 00-23 and minute 00-59, got {value:?}")]
    InvalidTimeValues { value: String },
    /// Not a `YYYY-MM-DD` date.
    #[error("invalid date format: expected YYYY-MM-DD, got {value:?}")]
    InvalidDateFormat { value: String },
}

/// Parses `HHMM` into a timestamp on `date`, seconds zeroed.
pub fn parse_hhmm(value: &str, date: NaiveDate) -> Result<NaiveDateTime, InputError> {
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::InvalidTimeFormat {
            value: value.to_string(),
        });
    }
    let invalid = || InputError::InvalidTimeValues {
        value: value.to_string(),
    };
    let hour: u32 = value[..2].parse().map_err(|_| invalid())?;
    let minute: u32 = value[2..].parse().map_err(|_| invalid())?;
    date.and_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| InputError::InvalidDateFormat {
        value: value.to_string(),
    })
}

/// Formats a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
