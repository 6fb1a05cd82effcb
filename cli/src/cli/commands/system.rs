//! Installation and shell integration commands.

use crate::cli::args::ShellType;
use crate::config::paths::{config_file, data_dir};
use crate::error::Result;
use crate::storage::KeyValueStore;

use super::draft::open_store;

/// Handles the `liftlog completions <shell>` command.
///
/// Generates shell completion scripts.
pub fn handle_completions(shell: ShellType) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell};

    let mut cmd = crate::cli::Cli::command();
    let shell = match shell {
        ShellType::Bash => Shell::Bash,
        ShellType::Zsh => Shell::Zsh,
        ShellType::Fish => Shell::Fish,
    };

    generate(shell, &mut cmd, "liftlog", &mut std::io::stdout());

    Ok(())
}

/// Handles the `liftlog doctor` command.
///
/// Checks liftlog installation and diagnoses issues.
pub fn handle_doctor() -> Result<()> {
    println!("Liftlog Doctor\n");
    println!("Checking installation...\n");

    let mut issues = 0;

    // Check 1: Config file
    print!("  Configuration: ");
    let config = match crate::config::load_config() {
        Ok(config) => {
            match config_file() {
                Ok(path) if path.exists() => println!("OK ({})", path.display()),
                Ok(_) => println!("OK (defaults)"),
                Err(e) => println!("WARNING - {e}"),
            }
            Some(config)
        }
        Err(e) => {
            println!("ERROR - {e}");
            issues += 1;
            None
        }
    };

    // Check 2: Data directory
    print!("  Data directory: ");
    match data_dir() {
        Ok(path) => {
            if path.exists() {
                println!("OK ({})", path.display());
            } else {
                println!("OK (will be created: {})", path.display());
            }
        }
        Err(e) => {
            println!("ERROR - {e}");
            issues += 1;
        }
    }

    // Check 3: Storage region
    print!("  Draft storage: ");
    match config.as_ref().map(open_store) {
        Some(Ok(store)) => match store.storage().keys() {
            Ok(keys) => println!(
                "OK ({} key(s) in {})",
                keys.len(),
                store.storage().path().display()
            ),
            Err(e) => {
                println!("ERROR - {e}");
                issues += 1;
            }
        },
        Some(Err(e)) => {
            println!("ERROR - {e}");
            issues += 1;
        }
        None => println!("SKIPPED (no configuration)"),
    }

    // Summary
    println!();
    if issues == 0 {
        println!("All checks passed!");
    } else {
        println!("{issues} issue(s) found.");
    }

    Ok(())
}
