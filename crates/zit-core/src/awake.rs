//! Awake spans reconstructed from system events.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::event::SystemEvent;
use crate::event_type::SystemEventType;
use crate::types::Seconds;

/// A span between a wake and the following sleep or shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AwakeInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// True when no sleep or shutdown closed the span and `end` is "now".
    pub open: bool,
}

impl AwakeInterval {
    pub fn duration(&self) -> Seconds {
        Seconds::between(self.start, self.end)
    }
}

/// Pairs wakes with the next sleep or shutdown.
///
/// A wake while already awake is ignored, as is a sleep while not awake. A
/// span still open after the last event ends at `now`.
pub fn awake_intervals(events: &[SystemEvent], now: NaiveDateTime) -> Vec<AwakeInterval> {
    let mut intervals = Vec::new();
    let mut current_start: Option<NaiveDateTime> = None;

    for event in events {
        match (event.event_type, current_start) {
            (SystemEventType::Wake, None) => current_start = Some(event.timestamp),
            (kind, Some(start)) if kind.ends_awake() => {
                intervals.push(AwakeInterval {
                    start,
                    end: event.timestamp,
                    open: false,
                });
                current_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = current_start {
        intervals.push(AwakeInterval {
            start,
            end: now,
            open: true,
        });
    }
    intervals
}

/// Sum of all span durations.
pub fn total_awake(intervals: &[AwakeInterval]) -> Seconds {
    intervals.iter().map(AwakeInterval::duration).sum()
}
