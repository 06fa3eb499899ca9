use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, SubsecRound};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use zit_cli::commands::util::{DateScope, resolve_date, status_day};
use zit_cli::commands::{App, edit, fm, git, list, status, sys, track, verify};
use zit_cli::{Cli, Commands, Config, FmAction, GitAction, SysAction};

fn run_fm<W: Write>(w: &mut W, app: &App, action: &FmAction) -> Result<()> {
    match action {
        FmAction::List { n, projects } => fm::list(w, app, *n, *projects),
        FmAction::Status { n } => fm::status(w, app, *n),
        FmAction::Remove { index } => fm::remove(w, app, *index),
    }
}

fn run_git<W: Write>(w: &mut W, app: &App, action: &GitAction) -> Result<()> {
    match action {
        GitAction::Import {
            directory,
            since,
            author,
            limit,
            project,
        } => {
            let query = git::LogQuery {
                since: since.as_deref(),
                author: author.as_deref(),
                limit: *limit,
            };
            git::import(w, app, directory.clone(), project.as_deref(), &query)
        }
        GitAction::List { project, date, all } => {
            let scope = DateScope::resolve(*all, date.as_deref(), app.today())?;
            git::list(w, app, project.as_deref(), Path::new("."), scope)
        }
        GitAction::Projects => git::projects(w, app),
        GitAction::Remove { project, .. } => git::remove(w, app, project.as_deref()),
    }
}

fn run_sys<W: Write>(w: &mut W, app: &App, action: &SysAction) -> Result<()> {
    let scope = |all: bool, date: Option<&str>| DateScope::resolve(all, date, app.today());
    match action {
        SysAction::Import { n } => sys::import(w, app, *n),
        SysAction::List { date, all } => sys::list(w, app, scope(*all, date.as_deref())?),
        SysAction::Awake { date, all } => sys::awake(w, app, scope(*all, date.as_deref())?),
        SysAction::Remove { date, all } => sys::remove(w, app, scope(*all, date.as_deref())?),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    let app = App::new(&config, Local::now().naive_local().trunc_subsecs(0));
    let today = app.today();

    let stdout = io::stdout();
    let mut w = stdout.lock();
    let w = &mut w;

    match command {
        Commands::Start { project } => track::start(w, &app, project)?,
        Commands::Stop { time } => track::stop(w, &app, time.as_deref())?,
        Commands::Lunch { time } => track::lunch(w, &app, time.as_deref())?,
        Commands::Add {
            name,
            time,
            subtask,
            note,
        } => track::add(w, &app, name, time, *subtask, note)?,
        Commands::Sub { name, note } => track::sub(w, &app, name, note)?,
        Commands::Status {
            yesterday,
            date,
            json,
        } => {
            let (date, label) = status_day(*yesterday, date.as_deref(), today)?;
            status::run(w, &app, date, &label, *json)?;
        }
        Commands::List { date, notes } => {
            list::run(w, &app, resolve_date(date.as_deref(), today)?, *notes)?;
        }
        Commands::Current => track::current(w, &app)?,
        Commands::Verify { date } => {
            verify::run(w, &app, resolve_date(date.as_deref(), today)?)?;
        }
        Commands::Clean { date } => edit::clean(w, &app, resolve_date(date.as_deref(), today)?)?,
        Commands::Clear { date } => edit::clear(w, &app, resolve_date(date.as_deref(), today)?)?,
        Commands::Remove {
            index,
            date,
            subtask,
        } => {
            let date = resolve_date(date.as_deref(), today)?;
            edit::remove(w, &app, date, *index, *subtask)?;
        }
        Commands::Change {
            index,
            name,
            date,
            subtask,
        } => {
            let date = resolve_date(date.as_deref(), today)?;
            edit::change(w, &app, date, *index, name, *subtask)?;
        }
        Commands::Fm(action) => run_fm(w, &app, action)?,
        Commands::Git(action) => run_git(w, &app, action)?,
        Commands::Sys(action) => run_sys(w, &app, action)?,
    }

    w.flush()?;
    Ok(())
}
