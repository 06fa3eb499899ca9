//! Core domain logic for the zit time tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Events: projects, subtasks, git commits and system events, with their row format
//! - Event logs: one sorted, deduplicated list of events per day
//! - Intervals: deriving, grouping and summing the time between events
//! - Merging: interleaving projects and subtasks into one timeline
//! - Scraping: turning `git log` and journal output into events

pub mod aggregate;
pub mod awake;
pub mod event;
pub mod event_log;
pub mod event_type;
pub mod input;
pub mod interval;
pub mod merge;
pub mod ongoing;
pub mod scrape;
pub mod types;
pub mod verify;

pub use aggregate::{DaySummary, ExcludeSet, ProjectTimes, Totals, summarize_day};
pub use awake::{AwakeInterval, awake_intervals, total_awake};
pub use event::{
    Event, GitCommit, MalformedRow, Named, Project, Record, Subtask, SystemEvent,
    format_timestamp, parse_timestamp,
};
pub use event_log::{AppendOutcome, EventLog, LogError, SkippedRow};
pub use event_type::{SystemEventType, UnknownEventType};
pub use input::{InputError, format_date, parse_date, parse_hhmm};
pub use interval::{Interval, IntervalsByName, derive_intervals, group_by_name};
pub use merge::{MergeError, ProjectGroup, group_subtasks, merge_chronological};
pub use ongoing::{OngoingInterval, end_of_day, ongoing_interval, ongoing_seconds};
pub use scrape::{
    GIT_LOG_FORMAT, parse_git_log, parse_git_log_line, parse_journal, parse_journal_line,
};
pub use types::{DEFAULT, EventName, LUNCH, STOP, Seconds, ValidationError};
pub use verify::{Verification, verify_lunch, verify_no_default, verify_stop};
