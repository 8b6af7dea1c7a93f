pub mod diff;
pub mod profile;

use std::process::ExitCode;

/// Result of a command that completed without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Documents are equal, or the command had nothing to report
    Clean,
    /// At least one difference was printed
    Differences,
}

impl Outcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Clean => ExitCode::SUCCESS,
            Outcome::Differences => ExitCode::from(1),
        }
    }
}
