//! CLI subcommand implementations.
//!
//! Every command writes its user-facing output to the writer it is given and
//! reads the clock only through [`App::now`].

pub mod edit;
pub mod fm;
pub mod git;
pub mod list;
pub mod status;
pub mod sys;
pub mod track;
pub mod util;
pub mod verify;

use chrono::{NaiveDate, NaiveDateTime};
use zit_core::ExcludeSet;
use zit_store::Store;

use crate::Config;

/// What every command needs: where the logs live, which projects are
/// excluded, and the current time.
#[derive(Debug, Clone)]
pub struct App {
    pub store: Store,
    pub exclude: ExcludeSet,
    pub now: NaiveDateTime,
}

impl App {
    pub fn new(config: &Config, now: NaiveDateTime) -> Self {
        Self {
            store: config.store(),
            exclude: config.exclude_set(),
            now,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }
}
