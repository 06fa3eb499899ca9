//! Shared utilities for CLI commands.

use chrono::{Days, NaiveDate, NaiveDateTime};
use zit_core::{InputError, parse_date, parse_hhmm};

/// The day a command operates on: `date` if given, otherwise `today`.
pub fn resolve_date(date: Option<&str>, today: NaiveDate) -> Result<NaiveDate, InputError> {
    date.map_or(Ok(today), parse_date)
}

/// Days a listing covers: one day, or every day with data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateScope {
    Day(NaiveDate),
    All,
}

impl DateScope {
    /// [`All`](Self::All) when `all` is set, otherwise the day
    /// [`resolve_date`] picks.
    pub fn resolve(all: bool, date: Option<&str>, today: NaiveDate) -> Result<Self, InputError> {
        if all {
            return Ok(Self::All);
        }
        resolve_date(date, today).map(Self::Day)
    }

    /// The days to visit. `recorded` lists every day with data and is only
    /// called for [`All`](Self::All).
    pub fn days<E>(
        self,
        recorded: impl FnOnce() -> Result<Vec<NaiveDate>, E>,
    ) -> Result<Vec<NaiveDate>, E> {
        match self {
            Self::Day(date) => Ok(vec![date]),
            Self::All => recorded(),
        }
    }
}

/// The day `status` shows and how to refer to it when it is empty.
pub fn status_day(
    yesterday: bool,
    date: Option<&str>,
    today: NaiveDate,
) -> Result<(NaiveDate, String), InputError> {
    if yesterday {
        let day = today.checked_sub_days(Days::new(1)).unwrap_or(today);
        return Ok((day, "yesterday".to_string()));
    }
    match date {
        Some(value) => {
            let day = parse_date(value)?;
            Ok((day, value.to_string()))
        }
        None => Ok((today, "today".to_string())),
    }
}

/// `HHMM` today, or `now` when no time is given.
pub fn event_time(time: Option<&str>, now: NaiveDateTime) -> Result<NaiveDateTime, InputError> {
    time.map_or(Ok(now), |value| parse_hhmm(value, now.date()))
}
