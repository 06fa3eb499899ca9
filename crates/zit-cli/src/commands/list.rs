//! List command for the merged project and subtask timeline.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use zit_core::{EventLog, Project, Subtask, group_subtasks, merge_chronological, summarize_day};
use zit_store::Category;

use super::App;
use crate::cli::NotesMode;
use crate::render;

pub fn run<W: Write>(w: &mut W, app: &App, date: NaiveDate, notes: NotesMode) -> Result<()> {
    let projects: EventLog<Project> = app.store.load_log(&Category::Projects, date)?;
    let subtasks: EventLog<Subtask> = app.store.load_log(&Category::Subtasks, date)?;

    if projects.is_empty() && subtasks.is_empty() {
        writeln!(w, "No events found for {date}.")?;
        return Ok(());
    }

    let merged = merge_chronological(projects.events(), subtasks.events());
    let groups = group_subtasks(&merged)
        .with_context(|| format!("subtask log for {date} does not match its projects"))?;

    let times = summarize_day(projects.events(), &app.exclude, Some(app.now)).project_times;
    render::timeline(w, &groups, &times, notes, app.now)?;
    Ok(())
}
