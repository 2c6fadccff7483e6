//! Recipe resolver CLI
//!
//! The command-line interface for resolving build recipes into build plans.

mod cli;
mod commands;
mod error;
mod logging;

use std::io;

use clap::{CommandFactory, Parser};
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{} failed to set up logging: {}", "warning:".yellow().bold(), e);
    }

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            // No command provided - show help hint
            println!("{} Recipe resolver", "recipe".green().bold());
            println!();
            println!("Run {} for available commands.", "recipe --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Resolve(args) => commands::run_resolve(&args),
        Commands::Options { manifest, json } => commands::run_options(&manifest, json),
        Commands::Check { manifest } => commands::run_check(&manifest),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "recipe", &mut io::stdout());
            Ok(())
        }
    }
}
