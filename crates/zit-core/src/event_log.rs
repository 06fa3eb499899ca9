//! Ordered, deduplicated event log for one day.
//!
//! An [`EventLog`] is read whole from storage, mutated in memory and written
//! back wholesale. Every mutation leaves the events in ascending timestamp
//! order.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::aggregate::ExcludeSet;
use crate::event::{MalformedRow, Named, Record, SystemEvent};

/// Errors from index-based log mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LogError {
    /// The index does not name an event in the log.
    #[error("index {index} is out of range for a log of {len} events")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Result of appending an event.
///
/// A rejected append leaves the log untouched; it is a warning for the
/// caller, not an error.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The event was inserted.
    Inserted,
    /// An event with the same timestamp already exists.
    DuplicateTimestamp,
    /// A system event of the same type and details exists a few seconds away.
    NearDuplicate,
}

impl AppendOutcome {
    /// Returns true if the log changed.
    pub const fn is_inserted(self) -> bool {
        matches!(self, Self::Inserted)
    }
}

/// A row that was skipped while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// Zero-based position of the row in the input.
    pub line: usize,
    pub error: MalformedRow,
}

/// Events of one kind for one day, sorted by timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog<E> {
    events: Vec<E>,
}

impl<E> Default for EventLog<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E: Record> EventLog<E> {
    /// Creates an empty log.
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Builds a log from events in any order.
    pub fn from_events(events: Vec<E>) -> Self {
        let mut log = Self { events };
        log.sort();
        log
    }

    /// Parses rows into a sorted log, skipping malformed rows with a warning.
    pub fn load<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let (log, skipped) = Self::load_reporting(rows);
        for row in &skipped {
            tracing::warn!(kind = E::KIND, line = row.line, error = %row.error, "skipping malformed row");
        }
        log
    }

    /// Parses rows into a sorted log and returns the rows that were skipped.
    pub fn load_reporting<I, R, S>(rows: I) -> (Self, Vec<SkippedRow>)
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut events = Vec::new();
        let mut skipped = Vec::new();
        for (line, row) in rows.into_iter().enumerate() {
            let row = row.as_ref();
            if row.is_empty() {
                continue;
            }
            match E::from_row(row) {
                Ok(event) => events.push(event),
                Err(error) => skipped.push(SkippedRow { line, error }),
            }
        }
        (Self::from_events(events), skipped)
    }

    /// Serializes every event to its row, in order.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        self.events.iter().map(Record::to_row).collect()
    }

    /// Returns true if an event with exactly this timestamp exists.
    pub fn contains_timestamp(&self, timestamp: NaiveDateTime) -> bool {
        self.events.iter().any(|e| e.timestamp() == timestamp)
    }

    /// Inserts an event in timestamp order.
    ///
    /// Rejects the event if another one already has the same timestamp. Two
    /// different events within the same second are indistinguishable here and
    /// the later append is dropped.
    pub fn append(&mut self, event: E) -> AppendOutcome {
        let timestamp = event.timestamp();
        if self.contains_timestamp(timestamp) {
            tracing::debug!(kind = E::KIND, %timestamp, "event already exists at timestamp");
            return AppendOutcome::DuplicateTimestamp;
        }
        let index = self.events.partition_point(|e| e.timestamp() <= timestamp);
        self.events.insert(index, event);
        AppendOutcome::Inserted
    }

    /// Stable ascending sort by timestamp.
    pub fn sort(&mut self) {
        self.events.sort_by_key(Record::timestamp);
    }

    /// Removes and returns the event at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<E, LogError> {
        self.check_index(index)?;
        Ok(self.events.remove(index))
    }

    /// Replaces the event at `index`, returning the old one.
    ///
    /// The log is re-sorted afterwards, so the new event may end up at a
    /// different position if its timestamp differs.
    pub fn replace_at(&mut self, index: usize, event: E) -> Result<E, LogError> {
        self.check_index(index)?;
        let old = std::mem::replace(&mut self.events[index], event);
        self.sort();
        Ok(old)
    }

    /// Mutates the event at `index` in place, then re-sorts.
    pub fn modify_at<T>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut E) -> T,
    ) -> Result<T, LogError> {
        self.check_index(index)?;
        let value = f(&mut self.events[index]);
        self.sort();
        Ok(value)
    }

    fn check_index(&self, index: usize) -> Result<(), LogError> {
        if index >= self.events.len() {
            return Err(LogError::IndexOutOfRange {
                index,
                len: self.events.len(),
            });
        }
        Ok(())
    }

    pub fn events(&self) -> &[E] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.events.iter()
    }

    pub fn get(&self, index: usize) -> Option<&E> {
        self.events.get(index)
    }

    pub fn last(&self) -> Option<&E> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The last event at or before `timestamp`.
    pub fn active_at(&self, timestamp: NaiveDateTime) -> Option<&E> {
        self.events.iter().take_while(|e| e.timestamp() <= timestamp).last()
    }
}

impl<E: Record + Named> EventLog<E> {
    /// Drops every event whose dedupe key equals the previous kept event's,
    /// folding it into the kept one with [`Named::absorb`].
    ///
    /// Returns the number of events removed. Only consecutive duplicates are
    /// collapsed; the same name later in the day is kept.
    pub fn combine_adjacent_duplicates(&mut self) -> usize {
        let before = self.events.len();
        self.events.dedup_by(|later, kept| {
            let duplicate = later.dedup_key() == kept.dedup_key();
            if duplicate {
                kept.absorb(later);
            }
            duplicate
        });
        before - self.events.len()
    }

    /// Sorts and collapses consecutive duplicates.
    pub fn clean(&mut self) -> usize {
        self.sort();
        self.combine_adjacent_duplicates()
    }

    /// Name of the last event, unless the log is empty or it is excluded.
    pub fn current_name(&self, exclude: &ExcludeSet) -> Option<&str> {
        self.last()
            .map(Named::name)
            .filter(|name| !exclude.contains(name))
    }
}

impl EventLog<SystemEvent> {
    /// Appends a system event unless the same occurrence is already logged.
    pub fn append_distinct(&mut self, event: SystemEvent) -> AppendOutcome {
        if self.events.iter().any(|e| e.is_near_duplicate(&event)) {
            return AppendOutcome::NearDuplicate;
        }
        self.append(event)
    }
}

impl<'a, E> IntoIterator for &'a EventLog<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
