//! Status command for showing one day's intervals and totals.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use zit_core::{DaySummary, EventLog, Project, format_date, summarize_day};
use zit_store::Category;

use super::App;
use crate::render;

/// JSON shape of `zit status --json`.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub date: String,
    #[serde(flatten)]
    pub summary: DaySummary,
}

/// Computes the summary for `date`, counting a still-open project up to now.
pub fn summarize(app: &App, date: NaiveDate) -> Result<(EventLog<Project>, DaySummary)> {
    let log: EventLog<Project> = app
        .store
        .load_log(&Category::Projects, date)
        .with_context(|| format!("failed to load projects for {date}"))?;
    let summary = summarize_day(log.events(), &app.exclude, Some(app.now));
    Ok((log, summary))
}

pub fn run<W: Write>(w: &mut W, app: &App, date: NaiveDate, label: &str, json: bool) -> Result<()> {
    let (log, summary) = summarize(app, date)?;

    if json {
        let report = StatusReport {
            date: format_date(date),
            summary,
        };
        serde_json::to_writer_pretty(&mut *w, &report)?;
        writeln!(w)?;
        return Ok(());
    }

    if log.is_empty() {
        writeln!(w, "No events found for {label}.")?;
        return Ok(());
    }

    render::title(w, &format!("Status for {}", format_date(date)))?;
    for interval in &summary.intervals {
        render::interval(w, interval)?;
    }
    if let Some(ongoing) = &summary.ongoing {
        render::ongoing(w, ongoing)?;
    }
    render::project_times(w, &summary.project_times)?;
    render::totals(w, summary.totals)?;
    Ok(())
}
