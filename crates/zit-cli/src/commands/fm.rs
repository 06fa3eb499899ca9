//! Commands over every recorded day.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use zit_core::{EventLog, Project, ProjectTimes, Seconds, Verification, summarize_day};
use zit_store::Category;

use super::App;
use crate::render;

/// Recorded days with their index in the full list, keeping only the last `n`.
fn recorded_days(app: &App, n: Option<usize>) -> Result<Vec<(usize, NaiveDate)>> {
    let dates = app.store.list_dates(&Category::Projects)?;
    let skip = n.map_or(0, |n| dates.len().saturating_sub(n));
    Ok(dates.into_iter().enumerate().skip(skip).collect())
}

/// Closed-interval times for a day. Past days have no ongoing project.
fn day_times(app: &App, date: NaiveDate) -> Result<Option<(ProjectTimes, Verification)>> {
    let log: EventLog<Project> = app.store.load_log(&Category::Projects, date)?;
    if log.is_empty() {
        return Ok(None);
    }
    let summary = summarize_day(log.events(), &app.exclude, None);
    Ok(Some((summary.project_times, Verification::check(log.events()))))
}

/// `zit fm list [-n N] [--projects]`
pub fn list<W: Write>(w: &mut W, app: &App, n: Option<usize>, projects: bool) -> Result<()> {
    let days = recorded_days(app, n)?;
    if days.is_empty() {
        writeln!(w, "No data files found.")?;
        return Ok(());
    }

    writeln!(w, "Available data files:")?;
    let mut total = Seconds::ZERO;
    for (index, date) in days {
        let Some((times, verification)) = day_times(app, date)? else {
            continue;
        };
        let day_total = times.total_time(&app.exclude).included;
        total += day_total;
        let mark = if verification.all() { '✔' } else { '✗' };
        writeln!(
            w,
            "[{index}] {date}            Total: {} | {mark}",
            day_total.hms()
        )?;

        if projects {
            let shown = times.without(&app.exclude);
            let last = shown.len().saturating_sub(1);
            for (i, (name, seconds)) in shown.iter().enumerate() {
                let branch = if i == last { "└──" } else { "├──" };
                writeln!(w, "    {branch} {name}: {}", seconds.hms())?;
            }
        }
    }
    writeln!(w, "------")?;
    writeln!(w, "Total: {}", total.hms())?;
    Ok(())
}

/// `zit fm status [-n N]`
pub fn status<W: Write>(w: &mut W, app: &App, n: Option<usize>) -> Result<()> {
    let mut combined = ProjectTimes::new();
    for (_, date) in recorded_days(app, n)? {
        if let Some((times, _)) = day_times(app, date)? {
            combined = combined.combine(&times);
        }
    }
    tracing::debug!(projects = combined.len(), "combined project times");
    render::project_times(w, &combined.without(&app.exclude))?;
    Ok(())
}

/// `zit fm remove INDEX`
pub fn remove<W: Write>(w: &mut W, app: &App, index: usize) -> Result<()> {
    let dates = app.store.list_dates(&Category::Projects)?;
    let Some(&date) = dates.get(index) else {
        writeln!(w, "Invalid index. Operation aborted.")?;
        return Ok(());
    };
    app.store.delete_log(&Category::Projects, date)?;
    app.store.delete_log(&Category::Subtasks, date)?;
    writeln!(w, "Removed {date}.")?;
    Ok(())
}
