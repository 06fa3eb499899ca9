//! Plain-text layout shared by the commands.

use std::io::{self, Write};

use chrono::NaiveDateTime;
use zit_core::{
    Interval, Named, OngoingInterval, ProjectGroup, ProjectTimes, Record, STOP, Seconds, Totals,
    ongoing_seconds,
};

use crate::cli::NotesMode;

/// Minimum width of boxed titles and tables.
pub const WIDTH: usize = 70;

/// Column at which durations start in project tables.
const VALUE_COLUMN: usize = WIDTH - 8;

/// Column at which times start in the timeline.
const TIMELINE_COLUMN: usize = WIDTH - 20;

/// `HH:MM:SS` wall-clock time.
pub fn clock(timestamp: NaiveDateTime) -> String {
    timestamp.format("%H:%M:%S").to_string()
}

/// `HH:MM` wall-clock time.
pub fn short_clock(timestamp: NaiveDateTime) -> String {
    timestamp.format("%H:%M").to_string()
}

/// Prints `title` in a box.
pub fn title<W: Write>(w: &mut W, title: &str) -> io::Result<()> {
    let width = (title.chars().count() + 10).max(WIDTH);
    let rule = "─".repeat(width - 2);
    let label = format!("│ {title}");
    writeln!(w, "┌{rule}┐")?;
    writeln!(w, "{label:<inner$}│", inner = width - 1)?;
    writeln!(w, "└{rule}┘")
}

fn row<W: Write>(w: &mut W, label: &str, value: Seconds) -> io::Result<()> {
    writeln!(w, "{label:<VALUE_COLUMN$}{}", value.hms())
}

/// One closed interval.
pub fn interval<W: Write>(w: &mut W, interval: &Interval) -> io::Result<()> {
    writeln!(
        w,
        "{} - {} ({} -> {})",
        interval.name,
        interval.duration().hms(),
        clock(interval.start),
        clock(interval.end)
    )
}

pub fn ongoing<W: Write>(w: &mut W, ongoing: &OngoingInterval) -> io::Result<()> {
    writeln!(w, "Ongoing project:")?;
    writeln!(w, "{} - {}", ongoing.name, ongoing.duration.hms())
}

/// Time per project, longest first.
pub fn project_times<W: Write>(w: &mut W, times: &ProjectTimes) -> io::Result<()> {
    title(w, "Time per project:")?;
    for (name, seconds) in times.sorted_by_time() {
        row(w, name, seconds)?;
    }
    Ok(())
}

pub fn totals<W: Write>(w: &mut W, totals: Totals) -> io::Result<()> {
    title(w, "Total time:")?;
    row(w, "Total:", totals.included)?;
    row(w, "Excluded:", totals.excluded)
}

/// Events numbered the way `remove` and `change` address them.
pub fn indexed<W: Write, E: Named + Record>(w: &mut W, events: &[E]) -> io::Result<()> {
    for (index, event) in events.iter().enumerate() {
        writeln!(w, "{index}: {} - {}", event.name(), clock(event.timestamp()))?;
    }
    Ok(())
}

/// Splits `text` into lines of at most `max` characters, breaking at spaces
/// where possible.
pub fn split_line(text: &str, max: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        if rest.chars().count() <= max {
            lines.push(rest.trim_end().to_string());
            break;
        }
        let head_end = rest.char_indices().nth(max).map_or(rest.len(), |(i, _)| i);
        let split = rest[..head_end]
            .rfind(' ')
            .filter(|&i| i > 0)
            .unwrap_or(head_end);
        lines.push(rest[..split].trim_end().to_string());
        rest = rest[split..].trim_start();
    }
    lines
}

/// Projects and their subtasks as a tree, in time order.
///
/// Projects show their total for the day; subtasks show the time until the
/// next event, or the ongoing time for the last one.
pub fn timeline<W: Write>(
    w: &mut W,
    groups: &[ProjectGroup],
    times: &ProjectTimes,
    notes: NotesMode,
    now: NaiveDateTime,
) -> io::Result<()> {
    title(w, "Events and Subtasks:")?;

    for (i, group) in groups.iter().enumerate() {
        let project = &group.project;
        let next_project = groups.get(i + 1).map(|next| &next.project);

        let mut line = if project.name.as_str() == STOP {
            format!("{:─<TIMELINE_COLUMN$}", "  └─")
        } else {
            format!("{:─<TIMELINE_COLUMN$}", format!("{} ", project.name))
        };
        line.push(' ');
        line.push_str(&clock(project.timestamp));
        match times.get(project.name.as_str()) {
            Some(seconds) if project.name.as_str() != STOP => {
                line.push_str(&format!(" | {}", seconds.hms()));
            }
            _ => line.push_str(" ──────────"),
        }
        writeln!(w, "{line}")?;

        for (j, subtask) in group.subtasks.iter().enumerate() {
            let next = group
                .subtasks
                .get(j + 1)
                .map(|next| next.timestamp)
                .or_else(|| next_project.map(|next| next.timestamp));
            let continues = j + 1 < group.subtasks.len()
                || next_project.is_some_and(|next| next.name.as_str() == STOP);
            let (branch, prefix) = if continues {
                ("  ├─ ", "  │  ")
            } else {
                ("  └─ ", "     ")
            };
            let seconds = next.map_or_else(
                || ongoing_seconds(subtask.timestamp, now),
                |end| Seconds::between(subtask.timestamp, end),
            );
            writeln!(
                w,
                "{:<TIMELINE_COLUMN$} {} | {}",
                format!("{branch}{}", subtask.name),
                clock(subtask.timestamp),
                seconds.hms()
            )?;
            note(w, &subtask.note, prefix, notes)?;
        }
    }
    Ok(())
}

fn note<W: Write>(w: &mut W, note: &str, prefix: &str, mode: NotesMode) -> io::Result<()> {
    if note.is_empty() {
        return Ok(());
    }
    match mode {
        NotesMode::None => Ok(()),
        NotesMode::Single => {
            let lines = split_line(note, TIMELINE_COLUMN + 11);
            let more = if lines.len() > 1 { "..." } else { "" };
            let first = lines.first().map_or("", String::as_str);
            writeln!(w, "{prefix} └─ {first}{more}")
        }
        NotesMode::Full => {
            for (i, line) in split_line(note, TIMELINE_COLUMN + 14).iter().enumerate() {
                let branch = if i == 0 { " └─ " } else { "    " };
                writeln!(w, "{prefix}{branch}{line}")?;
            }
            Ok(())
        }
    }
}
