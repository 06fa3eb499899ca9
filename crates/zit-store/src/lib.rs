//! Storage layer for the zit time tracker.
//!
//! Every (category, date) pair owns one headerless CSV file under the data
//! directory:
//!
//! | category | path |
//! |----------|------|
//! | projects | `{date}.csv` |
//! | subtasks | `{date}_subtasks.csv` |
//! | git      | `git/{project}/{date}.csv` |
//! | system   | `system/{date}.csv` |
//!
//! Logs are read whole and written whole. Deleting a log moves it into the
//! category's `trash/` directory instead of removing it.
//!
//! # Concurrency
//!
//! Read-modify-write sequences go through [`Store::update_log`] or
//! [`Store::try_update_log`], which hold an exclusive advisory lock on
//! `{data_dir}/.lock` for their whole duration. Plain [`Store::load_log`] and
//! [`Store::save_log`] do not lock.

use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, NaiveDateTime};
use fs2::FileExt;
use thiserror::Error;
use zit_core::{AppendOutcome, EventLog, LogError, Named, Record, format_date, parse_date};

const LOCK_FILE: &str = ".lock";
const TRASH_DIR: &str = "trash";
const GIT_DIR: &str = "git";
const SYSTEM_DIR: &str = "system";
const SUBTASK_SUFFIX: &str = "_subtasks";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A filesystem operation failed.
    #[error("failed to {action} {path}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Writing CSV rows failed.
    #[error("failed to write {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// The data directory lock could not be taken.
    #[error("failed to lock {path}")]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A git project name that cannot be used as a directory name.
    #[error("invalid git project name: {name:?}")]
    InvalidProject { name: String },
    /// An index-based mutation was rejected.
    #[error(transparent)]
    Log(#[from] LogError),
}

fn io_error<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> StoreError + 'a {
    move |source| StoreError::Io {
        action,
        path: path.to_path_buf(),
        source,
    }
}

/// The kind of log a file holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Projects,
    Subtasks,
    /// Commits imported from one repository.
    Git(String),
    System,
}

impl Category {
    /// Creates a git category, rejecting names that would escape `git/`.
    pub fn git(project: impl Into<String>) -> Result<Self, StoreError> {
        let name = project.into();
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && name != TRASH_DIR
            && !name.contains(['/', '\\']);
        if !valid {
            return Err(StoreError::InvalidProject { name });
        }
        Ok(Self::Git(name))
    }

    const fn suffix(&self) -> &'static str {
        match self {
            Self::Subtasks => SUBTASK_SUFFIX,
            Self::Projects | Self::Git(_) | Self::System => "",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Projects => f.write_str("projects"),
            Self::Subtasks => f.write_str("subtasks"),
            Self::Git(project) => write!(f, "git/{project}"),
            Self::System => f.write_str("system"),
        }
    }
}

/// An exclusive lock on the data directory, released on drop.
#[derive(Debug)]
pub struct DataLock {
    file: File,
}

impl Drop for DataLock {
    fn drop(&mut self) {
        if let Err(error) = FileExt::unlock(&self.file) {
            tracing::debug!(%error, "failed to release data directory lock");
        }
    }
}

/// File-backed event logs rooted at a data directory.
#[derive(Debug, Clone)]
pub struct Store {
    data_dir: PathBuf,
}

impl Store {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory holding the category's logs.
    pub fn category_dir(&self, category: &Category) -> PathBuf {
        match category {
            Category::Projects | Category::Subtasks => self.data_dir.clone(),
            Category::Git(project) => self.data_dir.join(GIT_DIR).join(project),
            Category::System => self.data_dir.join(SYSTEM_DIR),
        }
    }

    /// Path of the log for `date`.
    pub fn log_path(&self, category: &Category, date: NaiveDate) -> PathBuf {
        self.category_dir(category)
            .join(format!("{}{}.csv", format_date(date), category.suffix()))
    }

    /// Directory deleted logs are moved to.
    pub fn trash_dir(&self, category: &Category) -> PathBuf {
        self.category_dir(category).join(TRASH_DIR)
    }

    /// Returns true if a log file exists for `date`.
    pub fn has_log(&self, category: &Category, date: NaiveDate) -> bool {
        self.log_path(category, date).is_file()
    }

    /// Takes the data directory lock, blocking until it is available.
    pub fn lock(&self) -> Result<DataLock, StoreError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(io_error("create directory", &self.data_dir))?;
        let path = self.data_dir.join(LOCK_FILE);
        let file = File::create(&path).map_err(io_error("create", &path))?;
        file.lock_exclusive()
            .map_err(|source| StoreError::Lock { path, source })?;
        Ok(DataLock { file })
    }

    /// Reads the log for `date`. A missing file is an empty log.
    ///
    /// Rows that cannot be parsed are skipped with a warning.
    pub fn load_log<E: Record>(
        &self,
        category: &Category,
        date: NaiveDate,
    ) -> Result<EventLog<E>, StoreError> {
        let path = self.log_path(category, date);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(EventLog::new());
            }
            Err(error) => return Err(io_error("open", &path)(error)),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);
        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            match record {
                Ok(record) => rows.push(record.iter().map(str::to_string).collect::<Vec<_>>()),
                Err(error) => {
                    tracing::warn!(path = %path.display(), line, %error, "skipping unreadable row");
                }
            }
        }

        let (log, skipped) = EventLog::<E>::load_reporting(rows);
        for row in skipped {
            tracing::warn!(
                path = %path.display(),
                line = row.line,
                error = %row.error,
                "skipping malformed row"
            );
        }
        tracing::debug!(%category, %date, events = log.len(), "loaded log");
        Ok(log)
    }

    /// Writes the whole log for `date`, replacing the file atomically.
    pub fn save_log<E: Record>(
        &self,
        category: &Category,
        date: NaiveDate,
        log: &EventLog<E>,
    ) -> Result<(), StoreError> {
        let path = self.log_path(category, date);
        let dir = self.category_dir(category);
        fs::create_dir_all(&dir).map_err(io_error("create directory", &dir))?;

        let tmp = path.with_extension("csv.tmp");
        let csv_error = |source| StoreError::Csv {
            path: path.clone(),
            source,
        };
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&tmp)
            .map_err(csv_error)?;
        for row in log.to_rows() {
            writer.write_record(&row).map_err(csv_error)?;
        }
        writer.flush().map_err(io_error("write", &tmp))?;
        drop(writer);

        fs::rename(&tmp, &path).map_err(io_error("replace", &path))?;
        tracing::debug!(%category, %date, events = log.len(), "saved log");
        Ok(())
    }

    /// Loads, mutates and saves a log while holding the data directory lock.
    pub fn update_log<E, T, F>(
        &self,
        category: &Category,
        date: NaiveDate,
        f: F,
    ) -> Result<T, StoreError>
    where
        E: Record,
        F: FnOnce(&mut EventLog<E>) -> T,
    {
        let _lock = self.lock()?;
        let mut log = self.load_log(category, date)?;
        let value = f(&mut log);
        self.save_log(category, date, &log)?;
        Ok(value)
    }

    /// Like [`update_log`](Self::update_log), but saves only if `f` succeeds.
    pub fn try_update_log<E, T, F>(
        &self,
        category: &Category,
        date: NaiveDate,
        f: F,
    ) -> Result<T, StoreError>
    where
        E: Record,
        F: FnOnce(&mut EventLog<E>) -> Result<T, LogError>,
    {
        let _lock = self.lock()?;
        let mut log = self.load_log(category, date)?;
        let value = f(&mut log)?;
        self.save_log(category, date, &log)?;
        Ok(value)
    }

    /// Appends one event to the log of the event's own date.
    ///
    /// A rejected duplicate leaves the file untouched and is reported through
    /// the returned outcome.
    pub fn append_event<E: Record>(
        &self,
        category: &Category,
        event: E,
    ) -> Result<AppendOutcome, StoreError> {
        let date = event.timestamp().date();
        let _lock = self.lock()?;
        let mut log = self.load_log(category, date)?;
        let outcome = log.append(event);
        if outcome.is_inserted() {
            self.save_log(category, date, &log)?;
        } else {
            tracing::warn!(%category, %date, ?outcome, "event not appended");
        }
        Ok(outcome)
    }

    /// Sorts the log and collapses consecutive duplicates. Returns the number
    /// of events removed.
    pub fn clean_log<E>(&self, category: &Category, date: NaiveDate) -> Result<usize, StoreError>
    where
        E: Record + Named,
    {
        self.update_log(category, date, |log: &mut EventLog<E>| log.clean())
    }

    /// Moves the log for `date` into the trash. Returns the trash path, or
    /// `None` if there was no log.
    pub fn delete_log(
        &self,
        category: &Category,
        date: NaiveDate,
    ) -> Result<Option<PathBuf>, StoreError> {
        self.delete_log_at(category, date, Local::now().naive_local())
    }

    /// [`delete_log`](Self::delete_log) with an explicit deletion time, which
    /// names the trashed file.
    pub fn delete_log_at(
        &self,
        category: &Category,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<Option<PathBuf>, StoreError> {
        let path = self.log_path(category, date);
        if !path.exists() {
            return Ok(None);
        }
        let trash = self.trash_dir(category);
        fs::create_dir_all(&trash).map_err(io_error("create directory", &trash))?;

        let stem = format!("{}{}", format_date(date), category.suffix());
        let base = format!("{stem}_trash_{}", now.format("%H_%M_%S"));
        let mut target = trash.join(format!("{base}.csv"));
        let mut attempt = 1;
        while target.exists() {
            target = trash.join(format!("{base}_{attempt}.csv"));
            attempt += 1;
        }

        fs::rename(&path, &target).map_err(io_error("move to trash", &path))?;
        tracing::debug!(from = %path.display(), to = %target.display(), "trashed log");
        Ok(Some(target))
    }

    /// Dates that have a log in `category`, ascending.
    pub fn list_dates(&self, category: &Category) -> Result<Vec<NaiveDate>, StoreError> {
        let dir = self.category_dir(category);
        let suffix = category.suffix();
        let mut dates: Vec<NaiveDate> = read_dir_entries(&dir)?
            .into_iter()
            .filter(|path| path.is_file())
            .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
            .filter_map(|path| {
                let stem = path.file_stem()?.to_str()?.to_string();
                let date = stem.strip_suffix(suffix).unwrap_or(&stem);
                if !suffix.is_empty() && date.len() == stem.len() {
                    return None;
                }
                parse_date(date).ok()
            })
            .collect();
        dates.sort_unstable();
        dates.dedup();
        Ok(dates)
    }

    /// Names of repositories with at least one live commit log, sorted.
    ///
    /// A project whose logs have all been trashed is not listed.
    pub fn list_git_projects(&self) -> Result<Vec<String>, StoreError> {
        let dir = self.data_dir.join(GIT_DIR);
        let mut projects = Vec::new();
        for path in read_dir_entries(&dir)? {
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let Ok(category) = Category::git(name) else {
                continue;
            };
            if !self.list_dates(&category)?.is_empty() {
                projects.push(name.to_string());
            }
        }
        projects.sort();
        Ok(projects)
    }
}

/// Entries of `dir`; a missing directory has none.
fn read_dir_entries(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(error) => return Err(io_error("read directory", dir)(error)),
    };
    entries
        .map(|entry| {
            entry
                .map(|entry| entry.path())
                .map_err(io_error("read directory", dir))
        })
        .collect()
}
