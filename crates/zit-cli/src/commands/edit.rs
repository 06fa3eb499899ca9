//! Commands that rewrite or discard a day's logs.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use zit_core::{EventLog, EventName, LogError, Named, Project, Record, Subtask};
use zit_store::{Category, StoreError};

use super::App;
use crate::render::{self, clock};

const INVALID_INDEX: &str = "Invalid index. Operation aborted.";

const fn category(subtask: bool) -> Category {
    if subtask {
        Category::Subtasks
    } else {
        Category::Projects
    }
}

/// `zit clean`: sort both logs and merge consecutive events with the same name.
pub fn clean<W: Write>(w: &mut W, app: &App, date: NaiveDate) -> Result<()> {
    let mut removed = 0;
    if app.store.has_log(&Category::Projects, date) {
        removed += app.store.clean_log::<Project>(&Category::Projects, date)?;
    }
    if app.store.has_log(&Category::Subtasks, date) {
        removed += app.store.clean_log::<Subtask>(&Category::Subtasks, date)?;
    }
    tracing::debug!(%date, removed, "cleaned logs");
    writeln!(w, "Data has been cleaned ({removed} duplicate events merged).")?;
    Ok(())
}

/// `zit clear`: move the day's project and subtask logs to the trash.
pub fn clear<W: Write>(w: &mut W, app: &App, date: NaiveDate) -> Result<()> {
    let projects = app.store.delete_log(&Category::Projects, date)?;
    let subtasks = app.store.delete_log(&Category::Subtasks, date)?;
    if projects.is_none() && subtasks.is_none() {
        writeln!(w, "No data found for {date}.")?;
    } else {
        writeln!(w, "Data for {date} has been moved to the trash.")?;
    }
    Ok(())
}

/// Runs an index-based edit, turning a bad index into the user-facing abort.
///
/// Returns `Ok(None)` when the edit was aborted.
fn edit_at<W, E, T, F>(
    w: &mut W,
    app: &App,
    category: &Category,
    date: NaiveDate,
    f: F,
) -> Result<Option<T>>
where
    W: Write,
    E: Record + Named,
    F: FnOnce(&mut EventLog<E>) -> Result<T, LogError>,
{
    let log: EventLog<E> = app.store.load_log(category, date)?;
    if log.is_empty() {
        writeln!(w, "No events found. Operation aborted.")?;
        return Ok(None);
    }

    match app.store.try_update_log(category, date, f) {
        Ok(value) => Ok(Some(value)),
        Err(StoreError::Log(LogError::IndexOutOfRange { index, len })) => {
            tracing::debug!(index, len, "index out of range");
            writeln!(w, "{INVALID_INDEX}")?;
            render::indexed(w, log.events())?;
            Ok(None)
        }
        Err(error) => Err(error.into()),
    }
}

/// `zit remove INDEX`
pub fn remove<W: Write>(
    w: &mut W,
    app: &App,
    date: NaiveDate,
    index: usize,
    subtask: bool,
) -> Result<()> {
    let category = category(subtask);
    let removed = if subtask {
        edit_at(w, app, &category, date, |log: &mut EventLog<Subtask>| {
            log.remove_at(index).map(|e| (e.name().to_string(), e.timestamp()))
        })?
    } else {
        edit_at(w, app, &category, date, |log: &mut EventLog<Project>| {
            log.remove_at(index).map(|e| (e.name().to_string(), e.timestamp()))
        })?
    };

    if let Some((name, timestamp)) = removed {
        writeln!(w, "Removed {name} at {}.", clock(timestamp))?;
    }
    Ok(())
}

/// `zit change INDEX NAME`
pub fn change<W: Write>(
    w: &mut W,
    app: &App,
    date: NaiveDate,
    index: usize,
    name: &str,
    subtask: bool,
) -> Result<()> {
    let new_name = EventName::new(name)?;
    let category = category(subtask);
    let old = if subtask {
        edit_at(w, app, &category, date, |log: &mut EventLog<Subtask>| {
            log.modify_at(index, |e| std::mem::replace(&mut e.name, new_name))
        })?
    } else {
        edit_at(w, app, &category, date, |log: &mut EventLog<Project>| {
            log.modify_at(index, |e| std::mem::replace(&mut e.name, new_name))
        })?
    };

    if let Some(old) = old {
        writeln!(w, "Changed {old} to {name}.")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use insta::assert_snapshot;
    use tempfile::TempDir;
    use zit_core::ExcludeSet;
    use zit_store::Store;

    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        date().and_hms_opt(h, m, 0).unwrap()
    }

    fn setup(dir: &TempDir, names: &[(u32, u32, &str)]) -> App {
        let store = Store::new(dir.path());
        let log = EventLog::from_events(
            names
                .iter()
                .map(|&(h, m, n)| Project::new(at(h, m), EventName::new(n).unwrap()))
                .collect(),
        );
        store.save_log(&Category::Projects, date(), &log).unwrap();
        App {
            store,
            exclude: ExcludeSet::reserved(),
            now: at(18, 0),
        }
    }

    fn names(app: &App) -> Vec<String> {
        let log: EventLog<Project> = app.store.load_log(&Category::Projects, date()).unwrap();
        log.iter().map(|p| p.name().to_string()).collect()
    }

    fn run(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn remove_by_index() {
        let dir = TempDir::new().unwrap();
        let app = setup(&dir, &[(9, 0, "Coding"), (10, 0, "Review"), (11, 0, "STOP")]);
        let out = run(|w| remove(w, &app, date(), 1, false));
        assert_snapshot!(out, @"Removed Review at 10:00:00.");
        assert_eq!(names(&app), vec!["Coding", "STOP"]);
    }

    #[test]
    fn remove_out_of_range_aborts_and_lists() {
        let dir = TempDir::new().unwrap();
        let app = setup(&dir, &[(9, 0, "Coding"), (10, 0, "STOP")]);
        let out = run(|w| remove(w, &app, date(), 5, false));
        assert_snapshot!(out, @r"
        Invalid index. Operation aborted.
        0: Coding - 09:00:00
        1: STOP - 10:00:00
        ");
        assert_eq!(names(&app), vec!["Coding", "STOP"]);
    }

    #[test]
    fn remove_from_empty_day() {
        let dir = TempDir::new().unwrap();
        let app = setup(&dir, &[]);
        let out = run(|w| remove(w, &app, date(), 0, true));
        assert_snapshot!(out, @"No events found. Operation aborted.");
    }

    #[test]
    fn change_renames_event() {
        let dir = TempDir::new().unwrap();
        let app = setup(&dir, &[(9, 0, "DEFAULT"), (10, 0, "STOP")]);
        let out = run(|w| change(w, &app, date(), 0, "Coding", false));
        assert_snapshot!(out, @"Changed DEFAULT to Coding.");
        assert_eq!(names(&app), vec!["Coding", "STOP"]);

        let out = run(|w| change(w, &app, date(), 2, "Coding", false));
        assert!(out.starts_with(INVALID_INDEX));
    }

    #[test]
    fn clean_merges_consecutive_duplicates() {
        let dir = TempDir::new().unwrap();
        let app = setup(
            &dir,
            &[(9, 0, "Coding"), (9, 30, "Coding"), (10, 0, "LUNCH"), (11, 0, "Coding")],
        );
        let out = run(|w| clean(w, &app, date()));
        assert_snapshot!(out, @"Data has been cleaned (1 duplicate events merged).");
        assert_eq!(names(&app), vec!["Coding", "LUNCH", "Coding"]);
        assert!(!app.store.has_log(&Category::Subtasks, date()));
    }

    #[test]
    fn clear_moves_logs_to_trash() {
        let dir = TempDir::new().unwrap();
        let app = setup(&dir, &[(9, 0, "Coding")]);
        let out = run(|w| clear(w, &app, date()));
        assert_snapshot!(out, @"Data for 2024-03-04 has been moved to the trash.");
        assert!(!app.store.has_log(&Category::Projects, date()));
        assert!(names(&app).is_empty());

        let out = run(|w| clear(w, &app, date()));
        assert_snapshot!(out, @"No data found for 2024-03-04.");
    }
}
