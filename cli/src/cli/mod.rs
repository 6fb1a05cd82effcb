//! CLI module for liftlog.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, DraftCommands};
