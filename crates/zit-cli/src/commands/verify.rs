//! Verify command for checking that a day is complete.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use zit_core::{EventLog, Project, Verification};
use zit_store::Category;

use super::App;

fn mark(ok: bool) -> char {
    if ok { '✓' } else { '✗' }
}

pub fn run<W: Write>(w: &mut W, app: &App, date: NaiveDate) -> Result<Verification> {
    let log: EventLog<Project> = app.store.load_log(&Category::Projects, date)?;
    let verification = Verification::check(log.events());

    let not = |ok: bool| if ok { "" } else { " not" };
    writeln!(
        w,
        "{} LUNCH event{} found",
        mark(verification.lunch),
        not(verification.lunch)
    )?;
    writeln!(
        w,
        "{} final STOP event{} found",
        mark(verification.stop),
        not(verification.stop)
    )?;
    writeln!(
        w,
        "{} DEFAULT project{} used",
        mark(verification.no_default),
        if verification.no_default { " not" } else { "" }
    )?;
    Ok(verification)
}
