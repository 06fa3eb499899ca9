//! The still-open interval after the day's last event.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;

use crate::event::{Named, Record};
use crate::types::{STOP, Seconds};

const LAST_SECOND_OF_DAY: i64 = 24 * 60 * 60 - 1;

/// The interval opened by the last event and not yet closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OngoingInterval {
    pub name: String,
    pub start: NaiveDateTime,
    pub duration: Seconds,
}

/// 23:59:59 on `date`.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + TimeDelta::seconds(LAST_SECOND_OF_DAY)
}

/// Seconds from `start` to `now`, capped at the end of `start`'s day and
/// floored at zero.
pub fn ongoing_seconds(start: NaiveDateTime, now: NaiveDateTime) -> Seconds {
    let until_now = Seconds::between(start, now);
    let until_end_of_day = Seconds::between(start, end_of_day(start.date()));
    until_now.min(until_end_of_day).floor_zero()
}

/// The ongoing interval for a sorted day of events.
///
/// `None` when there are no events or the last one is `STOP`.
pub fn ongoing_interval<E: Record + Named>(
    events: &[E],
    now: NaiveDateTime,
) -> Option<OngoingInterval> {
    let last = events.last()?;
    if last.name() == STOP {
        return None;
    }
    Some(OngoingInterval {
        name: last.name().to_string(),
        start: last.timestamp(),
        duration: ongoing_seconds(last.timestamp(), now),
    })
}
