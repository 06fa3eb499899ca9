//! Core type definitions with validation.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marks the end of tracking for the day.
pub const STOP: &str = "STOP";

/// Marks a lunch break, excluded from the work total by default.
pub const LUNCH: &str = "LUNCH";

/// Name used by `start` when no project is given.
pub const DEFAULT: &str = "DEFAULT";

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// Generates a validated string newtype with common trait implementations.
macro_rules! define_name {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new name after validation.
            pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
                let name = name.into();
                if name.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(name))
            }

            /// Returns the name as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValidationError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(name: $name) -> Self {
                name.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

define_name!(
    /// A validated project or subtask name.
    ///
    /// Names are arbitrary non-empty strings. `STOP` and `LUNCH` are ordinary
    /// names as far as this type is concerned; their meaning lives in
    /// aggregation and verification.
    EventName, "event name"
);

impl EventName {
    /// Returns true if this is the `STOP` marker.
    pub fn is_stop(&self) -> bool {
        self.0 == STOP
    }
}

/// A whole-second duration.
///
/// Kept distinct from timestamps so durations and points in time cannot be
/// mixed up in arithmetic. Timestamps are second precision, so no fractional
/// part is ever needed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Seconds(i64);

impl Seconds {
    /// Zero seconds.
    pub const ZERO: Self = Self(0);

    /// Creates a duration from a number of seconds.
    #[must_use]
    pub const fn new(seconds: i64) -> Self {
        Self(seconds)
    }

    /// Elapsed seconds from `start` to `end`. Negative if `end` precedes `start`.
    #[must_use]
    pub fn between(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self::from(end - start)
    }

    /// Returns the inner number of seconds.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Clamps negative durations to zero.
    #[must_use]
    pub const fn floor_zero(self) -> Self {
        if self.0 < 0 { Self::ZERO } else { self }
    }

    /// Formats as `HH:MM:SS`. Hours are not wrapped at 24.
    pub fn hms(self) -> String {
        let total = self.0.max(0);
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

impl From<TimeDelta> for Seconds {
    fn from(delta: TimeDelta) -> Self {
        Self(delta.num_seconds())
    }
}

impl Add for Seconds {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Seconds {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Seconds {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Seconds {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Seconds {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn event_name_rejects_empty() {
        assert!(EventName::new("").is_err());
        assert!(EventName::new("Coding").is_ok());
    }

    #[test]
    fn event_name_serde_roundtrip() {
        let name = EventName::new("Coding").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"Coding\"");
        let parsed: EventName = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, name);
    }

    #[test]
    fn event_name_serde_rejects_empty() {
        let result: Result<EventName, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn event_name_compares_with_str() {
        let name = EventName::new(STOP).unwrap();
        assert!(name.is_stop());
        assert_eq!(name, "STOP");
        assert!(!EventName::new("stop").unwrap().is_stop());
    }

    #[test]
    fn seconds_between_timestamps() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let start = day.and_hms_opt(9, 0, 0).unwrap();
        let end = day.and_hms_opt(10, 30, 15).unwrap();
        assert_eq!(Seconds::between(start, end), Seconds::new(5415));
        assert_eq!(Seconds::between(end, start), Seconds::new(-5415));
    }

    #[test]
    fn seconds_sum_and_floor() {
        let total: Seconds = [Seconds::new(10), Seconds::new(20)].iter().sum();
        assert_eq!(total, Seconds::new(30));
        assert_eq!(Seconds::new(-5).floor_zero(), Seconds::ZERO);
        assert_eq!(Seconds::new(5).floor_zero(), Seconds::new(5));
    }

    #[test]
    fn seconds_hms_format() {
        assert_eq!(Seconds::ZERO.hms(), "00:00:00");
        assert_eq!(Seconds::new(3661).hms(), "01:01:01");
        assert_eq!(Seconds::new(90_000).hms(), "25:00:00");
        assert_eq!(Seconds::new(-30).hms(), "00:00:00");
    }
}
