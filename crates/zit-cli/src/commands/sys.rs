//! System journal import and awake-time reporting.

use std::collections::BTreeMap;
use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};
use chrono::{Days, NaiveDate, NaiveDateTime};
use zit_core::{EventLog, SystemEvent, awake_intervals, end_of_day, parse_journal, total_awake};
use zit_store::{Category, Store};

use super::App;
use super::util::DateScope;
use crate::render::clock;

/// Extra `journalctl` filters, one query each. The first reads everything.
const JOURNAL_FILTERS: [&[&str]; 3] = [&[], &["-u", "systemd-sleep"], &["_COMM=login"]];

const JOURNAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn journalctl(filter: &[&str], since: NaiveDateTime, until: NaiveDateTime) -> Result<String> {
    let output = Command::new("journalctl")
        .args(filter)
        .arg("--since")
        .arg(since.format(JOURNAL_TIME_FORMAT).to_string())
        .arg("--until")
        .arg(until.format(JOURNAL_TIME_FORMAT).to_string())
        .args(["-o", "short-iso", "--no-pager"])
        .stdin(Stdio::null())
        .output()
        .context("failed to run journalctl")?;
    if !output.status.success() {
        bail!(
            "journalctl exited with status {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Stores events in the per-day system logs, dropping occurrences that are
/// already logged. Returns how many were added.
pub fn save_events(store: &Store, events: Vec<SystemEvent>) -> Result<usize> {
    let mut by_date: BTreeMap<NaiveDate, Vec<SystemEvent>> = BTreeMap::new();
    for event in events {
        by_date.entry(event.timestamp.date()).or_default().push(event);
    }

    let mut saved = 0;
    for (date, events) in by_date {
        saved += store.update_log(&Category::System, date, |log: &mut EventLog<SystemEvent>| {
            events
                .into_iter()
                .map(|event| log.append_distinct(event))
                .filter(|outcome| outcome.is_inserted())
                .count()
        })?;
    }
    Ok(saved)
}

/// `zit sys import [-n DAYS]`
pub fn import<W: Write>(w: &mut W, app: &App, days: u32) -> Result<()> {
    let until = app.now;
    let since = until
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(until);
    let user = std::env::var("USER").unwrap_or_default();

    let mut events = Vec::new();
    for filter in JOURNAL_FILTERS {
        match journalctl(filter, since, until) {
            Ok(output) => events.extend(parse_journal(&output, &user)),
            Err(error) => tracing::warn!(?filter, "journal query failed: {error:#}"),
        }
    }

    if events.is_empty() {
        writeln!(w, "No relevant system events found in logs.")?;
        return Ok(());
    }
    events.sort_by_key(|event| event.timestamp);
    let found = events.len();
    let saved = save_events(&app.store, events)?;
    tracing::debug!(found, saved, "imported journal events");
    writeln!(w, "Saved {saved} events.")?;
    Ok(())
}

fn write_events<W: Write>(w: &mut W, log: &EventLog<SystemEvent>) -> Result<()> {
    for event in log {
        write!(w, "{} {}", clock(event.timestamp), event.event_type)?;
        if !event.details.is_empty() {
            write!(w, " {}", event.details)?;
        }
        if !event.user.is_empty() {
            write!(w, " ({})", event.user)?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// `zit sys list [-d DATE | --all]`
pub fn list<W: Write>(w: &mut W, app: &App, scope: DateScope) -> Result<()> {
    let date = match scope {
        DateScope::Day(date) => date,
        DateScope::All => {
            let dates = app.store.list_dates(&Category::System)?;
            if dates.is_empty() {
                writeln!(w, "No system events found.")?;
            }
            for date in dates {
                let log: EventLog<SystemEvent> = app.store.load_log(&Category::System, date)?;
                writeln!(w, "--- {date} ---")?;
                write_events(w, &log)?;
            }
            return Ok(());
        }
    };

    let log: EventLog<SystemEvent> = app.store.load_log(&Category::System, date)?;
    if log.is_empty() {
        writeln!(w, "No system events found for {date}.")?;
        return Ok(());
    }
    write_events(w, &log)
}

fn awake_day<W: Write>(w: &mut W, app: &App, date: NaiveDate) -> Result<()> {
    let log: EventLog<SystemEvent> = app.store.load_log(&Category::System, date)?;
    let now = if date == app.today() {
        app.now
    } else {
        end_of_day(date)
    };

    let intervals = awake_intervals(log.events(), now);
    if intervals.is_empty() {
        writeln!(w, "No awake time found for {date}.")?;
        return Ok(());
    }
    for interval in &intervals {
        let end = if interval.open {
            "now".to_string()
        } else {
            clock(interval.end)
        };
        writeln!(
            w,
            "{} -> {end}  {}",
            clock(interval.start),
            interval.duration().hms()
        )?;
    }
    writeln!(w, "Total awake: {}", total_awake(&intervals).hms())?;
    Ok(())
}

/// `zit sys awake [-d DATE | --all]`
pub fn awake<W: Write>(w: &mut W, app: &App, scope: DateScope) -> Result<()> {
    match scope {
        DateScope::Day(date) => awake_day(w, app, date),
        DateScope::All => {
            let dates = app.store.list_dates(&Category::System)?;
            if dates.is_empty() {
                writeln!(w, "No system events found.")?;
            }
            for date in dates {
                writeln!(w, "Awake intervals for {date}:")?;
                awake_day(w, app, date)?;
            }
            Ok(())
        }
    }
}

/// `zit sys remove [-d DATE | --all]`
pub fn remove<W: Write>(w: &mut W, app: &App, scope: DateScope) -> Result<()> {
    let dates = scope.days(|| app.store.list_dates(&Category::System))?;
    let mut removed = 0;
    for &date in &dates {
        if app
            .store
            .delete_log_at(&Category::System, date, app.now)?
            .is_some()
        {
            removed += 1;
        }
    }

    match scope {
        DateScope::Day(date) if removed > 0 => {
            writeln!(w, "System event data for {date} has been moved to the trash.")?;
        }
        DateScope::Day(date) => writeln!(w, "No system event data found for {date}.")?,
        DateScope::All if removed > 0 => {
            writeln!(w, "All system event data has been moved to the trash.")?;
        }
        DateScope::All => writeln!(w, "No system event data found.")?,
    }
    Ok(())
}
