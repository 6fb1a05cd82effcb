//! Liftlog - Workout Logging Companion
//!
//! Liftlog keeps the in-progress workout you are logging as a single
//! resumable draft per user, repairing and de-duplicating stored copies so
//! an interrupted session can always be picked up again.

mod cli;
mod config;
mod draft;
mod error;
mod storage;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::commands::SaveRequest;
use crate::cli::{Cli, Commands, DraftCommands};
use crate::config::settings::env;
use crate::error::Result;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(env::LOG_LEVEL).unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    // Run the command
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(if e.is_user_error() { 2 } else { 1 });
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Draft { user, command } => {
            let user = user.user;
            match command {
                DraftCommands::Show => cli::commands::handle_show(user),
                DraftCommands::Save {
                    workout,
                    program_name,
                    day_name,
                    data,
                    force,
                } => cli::commands::handle_save(
                    user,
                    SaveRequest {
                        program_id: workout.program,
                        day_index: workout.day,
                        program_name,
                        day_name,
                        data,
                        force,
                    },
                ),
                DraftCommands::Check { workout } => {
                    cli::commands::handle_check(user, &workout.program, workout.day)
                }
                DraftCommands::Clear => cli::commands::handle_clear(user),
            }
        }
        Commands::Completions { shell } => cli::commands::handle_completions(shell),
        Commands::Doctor => cli::commands::handle_doctor(),
    }
}
