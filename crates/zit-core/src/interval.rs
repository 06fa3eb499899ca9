//! Interval derivation from consecutive project events.
//!
//! Each pair of consecutive events `(a, b)` yields one interval from
//! `a.timestamp` to `b.timestamp`, attributed to `a`'s name: the time belongs
//! to the state the earlier event opened.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::event::{Named, Record};
use crate::types::Seconds;

/// A closed span of time attributed to one name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub name: String,
}

impl Interval {
    pub fn duration(&self) -> Seconds {
        Seconds::between(self.start, self.end)
    }
}

/// Intervals grouped by name, in first-seen order within each group.
pub type IntervalsByName = BTreeMap<String, Vec<Interval>>;

/// Pairs consecutive events into intervals.
///
/// Events must be sorted ascending. Fewer than two events yield no intervals.
pub fn derive_intervals<E: Record + Named>(events: &[E]) -> Vec<Interval> {
    events
        .windows(2)
        .map(|pair| Interval {
            start: pair[0].timestamp(),
            end: pair[1].timestamp(),
            name: pair[0].name().to_string(),
        })
        .collect()
}

/// Groups intervals by name.
pub fn group_by_name<I: IntoIterator<Item = Interval>>(intervals: I) -> IntervalsByName {
    let mut grouped = IntervalsByName::new();
    for interval in intervals {
        grouped
            .entry(interval.name.clone())
            .or_default()
            .push(interval);
    }
    grouped
}
