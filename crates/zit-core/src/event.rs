//! Timestamped events and their persisted row format.
//!
//! Every event kind is stored as one CSV row whose first field is an
//! ISO-8601 local timestamp with second precision. Trailing optional fields
//! may be missing on read; they are always written.

use chrono::{NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event_type::SystemEventType;
use crate::types::EventName;

/// Format used when writing timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Formats accepted when reading timestamps. `%.f` also matches no fraction.
const TIMESTAMP_READ_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Window within which two imported system events count as the same event.
const SYSTEM_EVENT_DUPLICATE_WINDOW_SECS: i64 = 5;

/// A persisted row that could not be turned into an event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedRow {
    /// The row has fewer fields than the event kind requires.
    #[error("{kind} row has {found} fields, expected at least {expected}")]
    TooFewFields {
        kind: &'static str,
        expected: usize,
        found: usize,
    },
    /// The timestamp field is not an ISO-8601 datetime.
    #[error("invalid timestamp: {value:?}")]
    Timestamp { value: String },
    /// Some other field failed validation.
    #[error("invalid {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
}

/// Parses a persisted timestamp, dropping any fractional seconds.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_READ_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|timestamp| timestamp.trunc_subsecs(0))
}

/// Formats a timestamp for persistence.
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// An event that can be stored as a row and ordered by time.
pub trait Record: Clone {
    /// Human-readable kind, used in error messages.
    const KIND: &'static str;

    /// Returns when the event happened.
    fn timestamp(&self) -> NaiveDateTime;

    /// Serializes the event to its row fields.
    fn to_row(&self) -> Vec<String>;

    /// Parses an event from row fields.
    fn from_row<S: AsRef<str>>(row: &[S]) -> Result<Self, MalformedRow>;
}

/// An event that carries a name usable for intervals.
pub trait Named {
    /// The name an interval opened by this event is attributed to.
    fn name(&self) -> &str;

    /// Key used when collapsing consecutive duplicates.
    fn dedup_key(&self) -> &str {
        self.name()
    }

    /// Folds `later`, a collapsed duplicate, into this event.
    fn absorb(&mut self, _later: &Self) {}
}

fn require_fields<S: AsRef<str>>(
    row: &[S],
    kind: &'static str,
    expected: usize,
) -> Result<(), MalformedRow> {
    if row.len() < expected {
        return Err(MalformedRow::TooFewFields {
            kind,
            expected,
            found: row.len(),
        });
    }
    Ok(())
}

fn timestamp_field<S: AsRef<str>>(row: &[S]) -> Result<NaiveDateTime, MalformedRow> {
    let value = row[0].as_ref();
    parse_timestamp(value).ok_or_else(|| MalformedRow::Timestamp {
        value: value.to_string(),
    })
}

fn name_field<S: AsRef<str>>(row: &[S], index: usize) -> Result<EventName, MalformedRow> {
    EventName::new(row[index].as_ref()).map_err(|e| MalformedRow::InvalidField {
        field: "name",
        message: e.to_string(),
    })
}

fn optional_field<S: AsRef<str>>(row: &[S], index: usize) -> String {
    row.get(index)
        .map(|value| value.as_ref().to_string())
        .unwrap_or_default()
}

/// A project marker: work on `name` starts at `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub timestamp: NaiveDateTime,
    pub name: EventName,
}

impl Project {
    pub const fn new(timestamp: NaiveDateTime, name: EventName) -> Self {
        Self { timestamp, name }
    }
}

impl Record for Project {
    const KIND: &'static str = "project";

    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    fn to_row(&self) -> Vec<String> {
        vec![format_timestamp(self.timestamp), self.name.to_string()]
    }

    fn from_row<S: AsRef<str>>(row: &[S]) -> Result<Self, MalformedRow> {
        require_fields(row, Self::KIND, 2)?;
        Ok(Self {
            timestamp: timestamp_field(row)?,
            name: name_field(row, 1)?,
        })
    }
}

impl Named for Project {
    fn name(&self) -> &str {
        self.name.as_str()
    }
}

/// A note-bearing marker attached by time to the preceding project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub timestamp: NaiveDateTime,
    pub name: EventName,
    #[serde(default)]
    pub note: String,
}

impl Subtask {
    pub fn new(timestamp: NaiveDateTime, name: EventName, note: impl Into<String>) -> Self {
        Self {
            timestamp,
            name,
            note: note.into(),
        }
    }
}

impl Record for Subtask {
    const KIND: &'static str = "subtask";

    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            format_timestamp(self.timestamp),
            self.name.to_string(),
            self.note.clone(),
        ]
    }

    fn from_row<S: AsRef<str>>(row: &[S]) -> Result<Self, MalformedRow> {
        require_fields(row, Self::KIND, 2)?;
        Ok(Self {
            timestamp: timestamp_field(row)?,
            name: name_field(row, 1)?,
            note: optional_field(row, 2),
        })
    }
}

impl Named for Subtask {
    fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Appends the later note unless it is empty or already present.
    fn absorb(&mut self, later: &Self) {
        if later.note.is_empty() || self.note.split("; ").any(|note| note == later.note) {
            return;
        }
        if !self.note.is_empty() {
            self.note.push_str("; ");
        }
        self.note.push_str(&later.note);
    }
}

/// A git commit imported as a project-like event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitCommit {
    pub timestamp: NaiveDateTime,
    pub hash: String,
    pub message: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub email: String,
}

impl Record for GitCommit {
    const KIND: &'static str = "git commit";

    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            format_timestamp(self.timestamp),
            self.hash.clone(),
            self.message.clone(),
            self.author.clone(),
            self.email.clone(),
        ]
    }

    fn from_row<S: AsRef<str>>(row: &[S]) -> Result<Self, MalformedRow> {
        require_fields(row, Self::KIND, 3)?;
        let hash = row[1].as_ref();
        if hash.is_empty() {
            return Err(MalformedRow::InvalidField {
                field: "hash",
                message: "hash cannot be empty".to_string(),
            });
        }
        Ok(Self {
            timestamp: timestamp_field(row)?,
            hash: hash.to_string(),
            message: row[2].as_ref().to_string(),
            author: optional_field(row, 3),
            email: optional_field(row, 4),
        })
    }
}

impl Named for GitCommit {
    fn name(&self) -> &str {
        &self.message
    }

    fn dedup_key(&self) -> &str {
        &self.hash
    }
}

/// An OS-level session or power event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemEvent {
    pub timestamp: NaiveDateTime,
    pub event_type: SystemEventType,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub user: String,
}

impl SystemEvent {
    /// Returns true if `other` is the same occurrence seen twice: same type and
    /// details, less than five seconds apart.
    pub fn is_near_duplicate(&self, other: &Self) -> bool {
        let gap = (self.timestamp - other.timestamp).num_seconds().abs();
        gap < SYSTEM_EVENT_DUPLICATE_WINDOW_SECS
            && self.event_type == other.event_type
            && self.details == other.details
    }
}

impl Record for SystemEvent {
    const KIND: &'static str = "system event";

    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            format_timestamp(self.timestamp),
            self.event_type.to_string(),
            self.details.clone(),
            self.user.clone(),
        ]
    }

    fn from_row<S: AsRef<str>>(row: &[S]) -> Result<Self, MalformedRow> {
        require_fields(row, Self::KIND, 2)?;
        let event_type = row[1]
            .as_ref()
            .parse::<SystemEventType>()
            .map_err(|e| MalformedRow::InvalidField {
                field: "event type",
                message: e.to_string(),
            })?;
        Ok(Self {
            timestamp: timestamp_field(row)?,
            event_type,
            details: optional_field(row, 2),
            user: optional_field(row, 3),
        })
    }
}

/// The closed set of events that can share one timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    Project(Project),
    Subtask(Subtask),
    GitCommit(GitCommit),
}

impl Event {
    pub const fn timestamp(&self) -> NaiveDateTime {
        match self {
            Self::Project(p) => p.timestamp,
            Self::Subtask(s) => s.timestamp,
            Self::GitCommit(c) => c.timestamp,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Project(p) => p.name(),
            Self::Subtask(s) => s.name(),
            Self::GitCommit(c) => c.name(),
        }
    }

    /// Tie-break rank for equal timestamps: project-like events sort before
    /// subtasks.
    pub const fn type_rank(&self) -> u8 {
        match self {
            Self::Project(_) | Self::GitCommit(_) => 0,
            Self::Subtask(_) => 1,
        }
    }
}

impl From<Project> for Event {
    fn from(project: Project) -> Self {
        Self::Project(project)
    }
}

impl From<Subtask> for Event {
    fn from(subtask: Subtask) -> Self {
        Self::Subtask(subtask)
    }
}

impl From<GitCommit> for Event {
    fn from(commit: GitCommit) -> Self {
        Self::GitCommit(commit)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn parse_timestamp_accepts_iso_and_legacy_forms() {
        assert_eq!(parse_timestamp("2024-03-04T09:15:00"), Some(at(9, 15, 0)));
        assert_eq!(parse_timestamp("2024-03-04 09:15:00"), Some(at(9, 15, 0)));
        assert_eq!(
            parse_timestamp("2024-03-04 09:15:00.734512"),
            Some(at(9, 15, 0))
        );
        assert_eq!(parse_timestamp("09:15"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn project_row_roundtrip() {
        let project = Project::new(at(9, 0, 0), EventName::new("Coding").unwrap());
        let row = project.to_row();
        assert_eq!(row, vec!["2024-03-04T09:00:00", "Coding"]);
        assert_eq!(Project::from_row(&row).unwrap(), project);
    }

    #[test]
    fn project_row_requires_two_fields() {
        let err = Project::from_row(&["2024-03-04T09:00:00"]).unwrap_err();
        assert_eq!(
            err,
            MalformedRow::TooFewFields {
                kind: "project",
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn project_row_rejects_bad_timestamp_and_empty_name() {
        assert!(matches!(
            Project::from_row(&["yesterday", "Coding"]),
            Err(MalformedRow::Timestamp { .. })
        ));
        assert!(matches!(
            Project::from_row(&["2024-03-04T09:00:00", ""]),
            Err(MalformedRow::InvalidField { field: "name", .. })
        ));
    }

    #[test]
    fn subtask_note_is_optional_on_read() {
        let without = Subtask::from_row(&["2024-03-04T09:10:00", "Email"]).unwrap();
        assert_eq!(without.note, "");

        let with = Subtask::from_row(&["2024-03-04T09:10:00", "Email", "inbox zero"]).unwrap();
        assert_eq!(with.note, "inbox zero");
        assert_eq!(
            with.to_row(),
            vec!["2024-03-04T09:10:00", "Email", "inbox zero"]
        );
    }

    #[test]
    fn subtask_always_writes_note_column() {
        let subtask = Subtask::new(at(9, 10, 0), EventName::new("Email").unwrap(), "");
        assert_eq!(subtask.to_row().len(), 3);
    }

    #[test]
    fn git_commit_named_by_message_deduped_by_hash() {
        let commit = GitCommit::from_row(&[
            "2024-03-04T11:00:00",
            "abc1234",
            "Fix parser",
            "Ada",
            "ada@example.com",
        ])
        .unwrap();
        assert_eq!(commit.name(), "Fix parser");
        assert_eq!(commit.dedup_key(), "abc1234");

        let short = GitCommit::from_row(&["2024-03-04T11:00:00", "abc1234", "Fix"]).unwrap();
        assert_eq!(short.email, "");
        assert_eq!(short.to_row().len(), 5);
    }

    #[test]
    fn system_event_optional_fields() {
        let event = SystemEvent::from_row(&["2024-03-04T08:00:00", "wake"]).unwrap();
        assert_eq!(event.event_type, SystemEventType::Wake);
        assert_eq!(event.details, "");
        assert_eq!(event.user, "");

        let err = SystemEvent::from_row(&["2024-03-04T08:00:00", "nap"]).unwrap_err();
        assert!(matches!(
            err,
            MalformedRow::InvalidField {
                field: "event type",
                ..
            }
        ));
    }

    #[test]
    fn system_event_near_duplicate_window() {
        let base = SystemEvent {
            timestamp: at(8, 0, 0),
            event_type: SystemEventType::Wake,
            details: "from logs".to_string(),
            user: String::new(),
        };
        let close = SystemEvent {
            timestamp: at(8, 0, 4),
            ..base.clone()
        };
        let far = SystemEvent {
            timestamp: at(8, 0, 5),
            ..base.clone()
        };
        let other_type = SystemEvent {
            event_type: SystemEventType::Sleep,
            ..close.clone()
        };
        assert!(base.is_near_duplicate(&close));
        assert!(close.is_near_duplicate(&base));
        assert!(!base.is_near_duplicate(&far));
        assert!(!base.is_near_duplicate(&other_type));
    }

    #[test]
    fn event_type_rank_orders_projects_first() {
        let project = Event::from(Project::new(at(9, 0, 0), EventName::new("A").unwrap()));
        let subtask = Event::from(Subtask::new(at(9, 0, 0), EventName::new("B").unwrap(), ""));
        assert!(project.type_rank() < subtask.type_rank());
        assert_eq!(project.name(), "A");
        assert_eq!(subtask.timestamp(), at(9, 0, 0));
    }
}
