//! Commands that record new project and subtask events.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDateTime;
use zit_core::{AppendOutcome, EventLog, EventName, LUNCH, Named, Project, STOP, Subtask};
use zit_store::Category;

use super::App;
use super::util::event_time;
use crate::render::{clock, short_clock};

const NO_CURRENT_TASK: &str = "No current task. No subtask added.";

/// Reports a rejected append. Returns true if the event was stored.
fn report<W: Write>(w: &mut W, outcome: AppendOutcome, timestamp: NaiveDateTime) -> Result<bool> {
    if outcome.is_inserted() {
        return Ok(true);
    }
    writeln!(
        w,
        "An event already exists at {}. Nothing added.",
        clock(timestamp)
    )?;
    Ok(false)
}

fn append_project<W: Write>(w: &mut W, app: &App, project: Project) -> Result<bool> {
    let timestamp = project.timestamp;
    let outcome = app.store.append_event(&Category::Projects, project)?;
    report(w, outcome, timestamp)
}

fn append_subtask<W: Write>(w: &mut W, app: &App, subtask: Subtask) -> Result<bool> {
    let timestamp = subtask.timestamp;
    let outcome = app.store.append_event(&Category::Subtasks, subtask)?;
    report(w, outcome, timestamp)
}

/// `zit start [PROJECT]`
pub fn start<W: Write>(w: &mut W, app: &App, project: &str) -> Result<()> {
    let name = EventName::new(project)?;
    if append_project(w, app, Project::new(app.now, name))? {
        writeln!(w, "Started tracking time for project: {project}")?;
    }
    Ok(())
}

/// `zit stop [HHMM]`
pub fn stop<W: Write>(w: &mut W, app: &App, time: Option<&str>) -> Result<()> {
    let timestamp = event_time(time, app.now)?;
    if append_project(w, app, Project::new(timestamp, EventName::new(STOP)?))? {
        writeln!(w, "Stopped tracking time at {}", short_clock(timestamp))?;
    }
    Ok(())
}

/// `zit lunch [HHMM]`
pub fn lunch<W: Write>(w: &mut W, app: &App, time: Option<&str>) -> Result<()> {
    let timestamp = event_time(time, app.now)?;
    if append_project(w, app, Project::new(timestamp, EventName::new(LUNCH)?))? {
        writeln!(w, "Started lunch at {}", short_clock(timestamp))?;
    }
    Ok(())
}

/// `zit add NAME HHMM [--subtask] [--note NOTE]`
pub fn add<W: Write>(
    w: &mut W,
    app: &App,
    name: &str,
    time: &str,
    subtask: bool,
    note: &str,
) -> Result<()> {
    let timestamp = event_time(Some(time), app.now)?;
    let event_name = EventName::new(name)?;

    if !subtask {
        if !note.is_empty() {
            tracing::warn!("notes are only stored on subtasks; ignoring note");
        }
        if append_project(w, app, Project::new(timestamp, event_name))? {
            writeln!(w, "Added project: {name} at {}", short_clock(timestamp))?;
        }
        return Ok(());
    }

    let projects: EventLog<Project> = app.store.load_log(&Category::Projects, timestamp.date())?;
    let Some(owner) = projects
        .active_at(timestamp)
        .map(Named::name)
        .filter(|owner| !app.exclude.contains(owner))
    else {
        writeln!(w, "{NO_CURRENT_TASK}")?;
        return Ok(());
    };

    if append_subtask(w, app, Subtask::new(timestamp, event_name, note))? {
        writeln!(
            w,
            "Added subtask: {name} to {owner} at {}",
            short_clock(timestamp)
        )?;
    }
    Ok(())
}

/// `zit sub NAME [--note NOTE]`
pub fn sub<W: Write>(w: &mut W, app: &App, name: &str, note: &str) -> Result<()> {
    let event_name = EventName::new(name)?;
    let projects: EventLog<Project> = app.store.load_log(&Category::Projects, app.today())?;
    let Some(owner) = projects.current_name(&app.exclude) else {
        writeln!(w, "{NO_CURRENT_TASK}")?;
        return Ok(());
    };

    if append_subtask(w, app, Subtask::new(app.now, event_name, note))? {
        writeln!(w, "Added subtask: {name} to {owner}")?;
    }
    Ok(())
}

/// `zit current`
pub fn current<W: Write>(w: &mut W, app: &App) -> Result<()> {
    let projects: EventLog<Project> = app.store.load_log(&Category::Projects, app.today())?;
    match projects.current_name(&app.exclude) {
        Some(name) => writeln!(w, "{name}")?,
        None => writeln!(w, "No current task.")?,
    }
    Ok(())
}
