//! Parsers for scraped git log and journal output.
//!
//! These only turn text into events; running `git` or `journalctl` is the
//! caller's business.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, TimeZone};
use regex::Regex;

use crate::event::{GitCommit, SystemEvent, parse_timestamp};
use crate::event_type::SystemEventType;

/// `git log` pretty format understood by [`parse_git_log`].
pub const GIT_LOG_FORMAT: &str = "%H|%an|%at|%s|%ae";

/// Length of the abbreviated hash stored for each commit.
const SHORT_HASH_LEN: usize = 7;

static BOOT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}).*kernel.*Startup finished").unwrap()
});
static SUSPEND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}).*Suspending").unwrap());
static WAKE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}).*Woke up").unwrap());
static LOGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}).*New session.*for user (\w+)").unwrap()
});

/// Parses one `git log --pretty=format:%H|%an|%at|%s|%ae` line.
///
/// The Unix timestamp is converted to wall-clock time in `tz`. A missing
/// email is tolerated; a subject may itself contain `|`.
pub fn parse_git_log_line<Tz: TimeZone>(line: &str, tz: &Tz) -> Option<GitCommit> {
    let mut parts = line.splitn(4, '|');
    let hash = parts.next()?.trim();
    let author = parts.next()?;
    let unix: i64 = parts.next()?.trim().parse().ok()?;
    let rest = parts.next()?;
    let (message, email) = rest.rsplit_once('|').unwrap_or((rest, ""));

    if hash.is_empty() {
        return None;
    }
    let timestamp = DateTime::from_timestamp(unix, 0)?
        .with_timezone(tz)
        .naive_local();

    Some(GitCommit {
        timestamp,
        hash: hash.get(..SHORT_HASH_LEN).unwrap_or(hash).to_string(),
        message: message.to_string(),
        author: author.to_string(),
        email: email.to_string(),
    })
}

/// Parses every recognizable line of `git log` output, skipping the rest.
pub fn parse_git_log<Tz: TimeZone>(output: &str, tz: &Tz) -> Vec<GitCommit> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let commit = parse_git_log_line(line, tz);
            if commit.is_none() {
                tracing::debug!(line, "skipping unparseable git log line");
            }
            commit
        })
        .collect()
}

fn captured_timestamp(captures: &regex::Captures<'_>) -> Option<NaiveDateTime> {
    parse_timestamp(captures.get(1)?.as_str())
}

/// Parses one `journalctl -o short-iso` line into a system event.
///
/// Recognizes boot completion, suspend, resume and login lines. `user` is
/// recorded for events whose line does not name one.
pub fn parse_journal_line(line: &str, user: &str) -> Option<SystemEvent> {
    let event = |captures: regex::Captures<'_>, event_type, details: &str, user: &str| {
        Some(SystemEvent {
            timestamp: captured_timestamp(&captures)?,
            event_type,
            details: details.to_string(),
            user: user.to_string(),
        })
    };

    if let Some(captures) = LOGIN_RE.captures(line) {
        let login_user = captures.get(2).map_or(user, |m| m.as_str()).to_string();
        return event(captures, SystemEventType::Login, "User login", &login_user);
    }
    if let Some(captures) = BOOT_RE.captures(line) {
        return event(
            captures,
            SystemEventType::Startup,
            "System startup from logs",
            user,
        );
    }
    if let Some(captures) = SUSPEND_RE.captures(line) {
        return event(captures, SystemEventType::Sleep, "System sleep from logs", user);
    }
    if let Some(captures) = WAKE_RE.captures(line) {
        return event(captures, SystemEventType::Wake, "System wake from logs", user);
    }
    None
}

/// Parses journal output, keeping recognized lines in timestamp order.
pub fn parse_journal(output: &str, user: &str) -> Vec<SystemEvent> {
    let mut events: Vec<_> = output
        .lines()
        .filter_map(|line| parse_journal_line(line, user))
        .collect();
    events.sort_by_key(|e| e.timestamp);
    events
}
