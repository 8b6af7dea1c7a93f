//! SmartCompare CLI
//!
//! Command-line interface for comparing JSON documents structurally

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use smartcompare_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "smartcompare")]
#[command(about = "SmartCompare - Structural diff of object graphs", long_about = None)]
struct Cli {
    /// Log profile written to stderr (dev, prod); silent when omitted
    #[arg(long, global = true, value_name = "PROFILE")]
    log: Option<Profile>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare two JSON documents
    Diff(commands::diff::DiffArgs),
    /// Validate a comparison profile
    Profile(commands::profile::ProfileArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init(cli.log.unwrap_or(Profile::Test));

    let result = match cli.command {
        Commands::Diff(args) => commands::diff::execute(args),
        Commands::Profile(args) => commands::profile::execute(args),
    };

    match result {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}
