//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Zimple interval tracker.
///
/// Records when work on a project starts; the time until the next event is
/// attributed to it.
#[derive(Debug, Parser)]
#[command(name = "zit", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start tracking time for a project.
    Start {
        /// Project name.
        #[arg(default_value = zit_core::DEFAULT)]
        project: String,
    },

    /// Stop tracking time.
    Stop {
        /// Stop at this time today instead of now (HHMM).
        time: Option<String>,
    },

    /// Start a lunch break.
    Lunch {
        /// Start the break at this time today instead of now (HHMM).
        time: Option<String>,
    },

    /// Add a project or subtask at a specific time today.
    Add {
        /// Project or subtask name.
        name: String,

        /// Time of the event (HHMM, e.g. 1200 for noon).
        time: String,

        /// Add a subtask of the project active at that time.
        #[arg(long)]
        subtask: bool,

        /// Note attached to the subtask.
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// Add a subtask to the current project.
    Sub {
        /// Subtask name.
        name: String,

        /// Note attached to the subtask.
        #[arg(short, long, default_value = "")]
        note: String,
    },

    /// Show intervals and time per project for a day.
    Status {
        /// Show yesterday instead of today.
        #[arg(long, conflicts_with = "date")]
        yesterday: bool,

        /// Day to show (YYYY-MM-DD).
        #[arg(short, long)]
        date: Option<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List projects and subtasks in chronological order.
    List {
        /// Day to list (YYYY-MM-DD).
        #[arg(short, long)]
        date: Option<String>,

        /// How much of each subtask note to show.
        #[arg(long, value_enum, default_value_t = NotesMode::Full)]
        notes: NotesMode,
    },

    /// Print the current project.
    Current,

    /// Check that a day has a lunch break, a final stop and no default project.
    Verify {
        /// Day to check (YYYY-MM-DD).
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Sort a day's events and merge consecutive events with the same name.
    ///
    /// Merged subtasks keep the notes of every event they replace.
    Clean {
        /// Day to clean (YYYY-MM-DD).
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Move a day's project and subtask logs to the trash.
    Clear {
        /// Day to clear (YYYY-MM-DD).
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Remove one event by its index.
    Remove {
        /// Index as shown by `list` or on a failed removal.
        index: usize,

        /// Day to edit (YYYY-MM-DD).
        #[arg(short, long)]
        date: Option<String>,

        /// Edit the subtask log instead of the project log.
        #[arg(long)]
        subtask: bool,
    },

    /// Rename one event by its index.
    Change {
        /// Index of the event.
        index: usize,

        /// New name.
        name: String,

        /// Day to edit (YYYY-MM-DD).
        #[arg(short, long)]
        date: Option<String>,

        /// Edit the subtask log instead of the project log.
        #[arg(long)]
        subtask: bool,
    },

    /// Manage historical data.
    #[command(subcommand)]
    Fm(FmAction),

    /// Import and list git commits.
    #[command(subcommand)]
    Git(GitAction),

    /// Import and list system events.
    #[command(subcommand)]
    Sys(SysAction),
}

/// How subtask notes are rendered by `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NotesMode {
    /// Hide notes.
    None,
    /// First wrapped line of each note.
    Single,
    /// Whole notes.
    Full,
}

/// Historical data actions.
#[derive(Debug, Subcommand)]
pub enum FmAction {
    /// List recorded days with their totals.
    List {
        /// Only the last N days.
        #[arg(short)]
        n: Option<usize>,

        /// Show time per project under each day.
        #[arg(short, long)]
        projects: bool,
    },

    /// Time per project summed over recorded days.
    Status {
        /// Only the last N days.
        #[arg(short)]
        n: Option<usize>,
    },

    /// Move a recorded day to the trash by its index in `fm list`.
    Remove {
        /// Index of the day.
        index: usize,
    },
}

/// Git actions.
#[derive(Debug, Subcommand)]
pub enum GitAction {
    /// Import commits from a repository.
    Import {
        /// Repository directory (defaults to the current directory).
        #[arg(short = 'd', long)]
        directory: Option<PathBuf>,

        /// Only commits more recent than this (passed to `git log --since`).
        #[arg(short, long)]
        since: Option<String>,

        /// Only commits by this author.
        #[arg(short, long)]
        author: Option<String>,

        /// Import at most this many commits.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Name to store the commits under (defaults to the directory name).
        #[arg(short, long)]
        project: Option<String>,
    },

    /// List imported commits for a day.
    ///
    /// Without `--project`, lists the project named after the current
    /// directory if it has commits, otherwise every project.
    List {
        /// Only this project.
        #[arg(short, long)]
        project: Option<String>,

        /// Day to list (YYYY-MM-DD).
        #[arg(short, long)]
        date: Option<String>,

        /// List every imported day.
        #[arg(short, long, conflicts_with = "date")]
        all: bool,
    },

    /// List projects with imported commits.
    Projects,

    /// Move a project's imported commits to the trash.
    Remove {
        /// Project to remove.
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        project: Option<String>,

        /// Remove every project.
        #[arg(short, long)]
        all: bool,
    },
}

/// System event actions.
#[derive(Debug, Subcommand)]
pub enum SysAction {
    /// Import events from the system journal.
    Import {
        /// Look back this many days.
        #[arg(short, default_value_t = 1)]
        n: u32,
    },

    /// List system events for a day.
    List {
        /// Day to list (YYYY-MM-DD).
        #[arg(short, long)]
        date: Option<String>,

        /// List every imported day.
        #[arg(short, long, conflicts_with = "date")]
        all: bool,
    },

    /// Show when the machine was awake.
    Awake {
        /// Day to show (YYYY-MM-DD).
        #[arg(short, long)]
        date: Option<String>,

        /// Show every imported day.
        #[arg(short, long, conflicts_with = "date")]
        all: bool,
    },

    /// Move imported system events to the trash.
    Remove {
        /// Day to remove (YYYY-MM-DD).
        #[arg(short, long)]
        date: Option<String>,

        /// Remove every imported day.
        #[arg(short, long, conflicts_with = "date")]
        all: bool,
    },
}
