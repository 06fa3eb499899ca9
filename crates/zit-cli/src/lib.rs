//! Interval time tracker CLI library.
//!
//! This crate provides the `zit` command line: argument parsing,
//! configuration, and the commands that read and write the day logs.

mod cli;
pub mod commands;
mod config;
pub mod render;

pub use cli::{Cli, Commands, FmAction, GitAction, NotesMode, SysAction};
pub use config::Config;
