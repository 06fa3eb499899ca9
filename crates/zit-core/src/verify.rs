//! Day completeness checks.

use serde::Serialize;

use crate::event::Named;
use crate::types::{DEFAULT, LUNCH, STOP};

/// Returns true if any event has the given name.
pub fn contains_name<E: Named>(events: &[E], name: &str) -> bool {
    events.iter().any(|e| e.name() == name)
}

/// The day has a lunch break.
pub fn verify_lunch<E: Named>(events: &[E]) -> bool {
    contains_name(events, LUNCH)
}

/// The day ends with `STOP`.
pub fn verify_stop<E: Named>(events: &[E]) -> bool {
    events.last().is_some_and(|e| e.name() == STOP)
}

/// No time was logged against the placeholder project.
pub fn verify_no_default<E: Named>(events: &[E]) -> bool {
    !contains_name(events, DEFAULT)
}

/// Results of all checks for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub lunch: bool,
    pub stop: bool,
    pub no_default: bool,
}

impl Verification {
    pub fn check<E: Named>(events: &[E]) -> Self {
        Self {
            lunch: verify_lunch(events),
            stop: verify_stop(events),
            no_default: verify_no_default(events),
        }
    }

    pub const fn all(&self) -> bool {
        self.lunch && self.stop && self.no_default
    }
}
