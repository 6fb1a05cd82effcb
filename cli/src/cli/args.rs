//! Command-line argument parsing.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::settings::env;

/// Workout logging companion.
///
/// Keeps one resumable in-progress workout per user, so an interrupted
/// session can be picked up where it was left.
#[derive(Parser, Debug)]
#[command(name = "liftlog")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the in-progress workout draft.
    Draft {
        #[command(flatten)]
        user: UserArg,

        #[command(subcommand)]
        command: DraftCommands,
    },

    /// Generate shell completion scripts.
    ///
    /// Outputs completion script for the specified shell.
    /// Follow shell-specific instructions to install.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: ShellType,
    },

    /// Check liftlog installation and diagnose issues.
    ///
    /// Verifies configuration and the draft storage file.
    Doctor,
}

/// User identity shared by every draft subcommand.
#[derive(Args, Debug)]
pub struct UserArg {
    /// User the draft belongs to.
    #[arg(short, long, global = true, env = env::USER)]
    pub user: Option<String>,
}

/// Identity of a workout: program and day.
#[derive(Args, Debug)]
pub struct WorkoutArgs {
    /// Program identifier.
    #[arg(short, long)]
    pub program: String,

    /// Day within the program (0-based).
    #[arg(short, long, allow_negative_numbers = true)]
    pub day: i64,
}

/// Draft subcommands.
#[derive(Subcommand, Debug)]
pub enum DraftCommands {
    /// Show the active draft.
    Show,

    /// Save the active draft.
    ///
    /// Refuses to replace a draft for a different workout unless --force is given.
    Save {
        #[command(flatten)]
        workout: WorkoutArgs,

        /// Display name of the program.
        #[arg(long)]
        program_name: Option<String>,

        /// Display name of the day.
        #[arg(long)]
        day_name: Option<String>,

        /// Extra draft fields as a JSON object (sets, timer state, ...).
        #[arg(long)]
        data: Option<String>,

        /// Replace a draft for a different workout.
        #[arg(short, long)]
        force: bool,
    },

    /// Check whether starting a workout would replace another draft.
    Check {
        #[command(flatten)]
        workout: WorkoutArgs,
    },

    /// Discard the active draft.
    Clear,
}

/// Supported shell types for completions.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
}
