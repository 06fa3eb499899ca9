//! Git commit import and listing.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use zit_core::{EventLog, GIT_LOG_FORMAT, GitCommit, parse_git_log};
use zit_store::{Category, Store};

use super::App;
use super::util::DateScope;
use crate::render::clock;

/// Options forwarded to `git log`.
#[derive(Debug, Default)]
pub struct LogQuery<'a> {
    pub since: Option<&'a str>,
    pub author: Option<&'a str>,
    pub limit: Option<usize>,
}

/// Runs `git log` in `directory` and returns its stdout.
fn git_log(directory: &Path, query: &LogQuery<'_>) -> Result<String> {
    let mut command = Command::new("git");
    command
        .arg("-C")
        .arg(directory)
        .arg("log")
        .arg(format!("--pretty=format:{GIT_LOG_FORMAT}"));
    if let Some(since) = query.since {
        command.arg("--since").arg(since);
    }
    if let Some(author) = query.author {
        command.arg("--author").arg(author);
    }
    if let Some(limit) = query.limit {
        command.arg("-n").arg(limit.to_string());
    }

    let output = command
        .stdin(Stdio::null())
        .output()
        .context("failed to run git")?;
    if !output.status.success() {
        bail!(
            "git log in {} exited with status {}: {}",
            directory.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Name commits are stored under when none is given: the directory's name.
fn project_name(directory: &Path) -> Result<String> {
    let absolute = std::path::absolute(directory)
        .with_context(|| format!("failed to resolve {}", directory.display()))?;
    absolute
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .with_context(|| format!("cannot name a project after {}", absolute.display()))
}

/// Outcome of storing a batch of commits.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub days: usize,
}

/// Stores commits in the per-day logs of `category`. Commits already logged
/// at the same second are skipped.
pub fn import_commits(
    store: &Store,
    category: &Category,
    commits: Vec<GitCommit>,
) -> Result<ImportReport> {
    let mut by_date: BTreeMap<NaiveDate, Vec<GitCommit>> = BTreeMap::new();
    for commit in commits {
        by_date.entry(commit.timestamp.date()).or_default().push(commit);
    }

    let mut report = ImportReport {
        days: by_date.len(),
        ..ImportReport::default()
    };
    for (date, commits) in by_date {
        let count = commits.len();
        let inserted = store.update_log(category, date, |log: &mut EventLog<GitCommit>| {
            commits
                .into_iter()
                .map(|commit| log.append(commit))
                .filter(|outcome| outcome.is_inserted())
                .count()
        })?;
        tracing::debug!(%date, count, inserted, "imported commits");
        report.imported += inserted;
    }
    Ok(report)
}

/// `zit git import`
pub fn import<W: Write>(
    w: &mut W,
    app: &App,
    directory: Option<PathBuf>,
    project: Option<&str>,
    query: &LogQuery<'_>,
) -> Result<()> {
    let directory = directory.unwrap_or_else(|| PathBuf::from("."));
    let project = match project {
        Some(project) => project.to_string(),
        None => project_name(&directory)?,
    };
    let category = Category::git(project.as_str())?;

    writeln!(
        w,
        "Importing git commits from {} into project '{project}'...",
        directory.display()
    )?;
    let commits = parse_git_log(&git_log(&directory, query)?, &Local);
    if commits.is_empty() {
        writeln!(w, "No commits found.")?;
        return Ok(());
    }

    let report = import_commits(&app.store, &category, commits)?;
    writeln!(
        w,
        "Imported {} commits across {} different dates.",
        report.imported, report.days
    )?;
    Ok(())
}

/// Projects `git list` shows: `project` if given, else the one named after
/// `here` if it has commits, else every project.
fn listed_projects(app: &App, project: Option<&str>, here: &Path) -> Result<Vec<String>> {
    if let Some(project) = project {
        return Ok(vec![project.to_string()]);
    }
    let known = app.store.list_git_projects()?;
    match project_name(here) {
        Ok(name) if known.contains(&name) => Ok(vec![name]),
        _ => Ok(known),
    }
}

/// `zit git list [-p PROJECT] [-d DATE | --all]`
pub fn list<W: Write>(
    w: &mut W,
    app: &App,
    project: Option<&str>,
    here: &Path,
    scope: DateScope,
) -> Result<()> {
    let mut found = false;
    for project in listed_projects(app, project, here)? {
        let category = Category::git(project.as_str())?;
        for date in scope.days(|| app.store.list_dates(&category))? {
            let log: EventLog<GitCommit> = app.store.load_log(&category, date)?;
            if log.is_empty() {
                continue;
            }
            found = true;
            match scope {
                DateScope::Day(_) => writeln!(w, "--- {project} ---")?,
                DateScope::All => writeln!(w, "--- {project} {date} ---")?,
            }
            for commit in &log {
                writeln!(
                    w,
                    "{} {} {} ({})",
                    clock(commit.timestamp),
                    commit.hash,
                    commit.message,
                    commit.author
                )?;
            }
        }
    }
    if !found {
        match scope {
            DateScope::Day(date) => writeln!(w, "No commits found for {date}.")?,
            DateScope::All => writeln!(w, "No commits found.")?,
        }
    }
    Ok(())
}

/// `zit git projects`
pub fn projects<W: Write>(w: &mut W, app: &App) -> Result<()> {
    let projects = app.store.list_git_projects()?;
    if projects.is_empty() {
        writeln!(w, "No git projects found.")?;
    }
    for project in projects {
        writeln!(w, "{project}")?;
    }
    Ok(())
}

/// Moves every commit log of `project` to the trash. Returns how many days
/// were trashed.
fn trash_project(app: &App, project: &str) -> Result<usize> {
    let category = Category::git(project)?;
    let mut trashed = 0;
    for date in app.store.list_dates(&category)? {
        if app.store.delete_log_at(&category, date, app.now)?.is_some() {
            trashed += 1;
        }
    }
    tracing::debug!(project, trashed, "trashed git project");
    Ok(trashed)
}

/// `zit git remove PROJECT` or `zit git remove --all` when `project` is `None`.
pub fn remove<W: Write>(w: &mut W, app: &App, project: Option<&str>) -> Result<()> {
    if let Some(project) = project {
        if trash_project(app, project)? == 0 {
            writeln!(w, "Project '{project}' not found.")?;
        } else {
            writeln!(w, "Project '{project}' has been moved to the trash.")?;
        }
        return Ok(());
    }

    let projects = app.store.list_git_projects()?;
    if projects.is_empty() {
        writeln!(w, "No git projects found.")?;
        return Ok(());
    }
    for project in &projects {
        trash_project(app, project)?;
    }
    writeln!(w, "All git projects have been moved to the trash.")?;
    Ok(())
}
