//! Profile command
//!
//! Usage: smartcompare profile <FILE>

use std::path::PathBuf;

use clap::Args;
use smartcompare_core::CompareProfile;

use super::Outcome;

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Profile file to validate
    pub file: PathBuf,
}

/// Parse the profile and compile its patterns, then echo it normalised
pub fn execute(args: ProfileArgs) -> Result<Outcome, Box<dyn std::error::Error>> {
    let profile = CompareProfile::from_path(&args.file)?;
    profile.build()?;
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(Outcome::Clean)
}
