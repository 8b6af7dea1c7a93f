//! Diff command
//!
//! Usage: smartcompare diff <LEFT> <RIGHT> [--profile <FILE>] [--ignore <PATTERN>]...
//!
//! Exits 0 when the documents are equal, 1 when differences were printed and
//! 2 on error.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use smartcompare_core::{log_op_end, log_op_start};
use smartcompare_core::{CompareProfile, ExError, Graph, Value};

use super::Outcome;

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// JSON document compared as side 1
    pub left: PathBuf,

    /// JSON document compared as side 2
    pub right: PathBuf,

    /// Comparison profile (JSON); flags below add to it
    #[arg(short, long)]
    pub profile: Option<PathBuf>,

    /// Path pattern to skip (repeatable)
    #[arg(long, value_name = "PATTERN")]
    pub ignore: Vec<String>,

    /// Path pattern to recurse into (repeatable)
    #[arg(long, value_name = "PATTERN")]
    pub introspect: Vec<String>,

    /// Path pattern whose sequences are compared index by index (repeatable)
    #[arg(long, value_name = "PATTERN")]
    pub positional: Vec<String>,

    /// Label for the left document in descriptions
    #[arg(long)]
    pub label1: Option<String>,

    /// Label for the right document in descriptions
    #[arg(long)]
    pub label2: Option<String>,

    /// Print differences as a JSON array
    #[arg(long)]
    pub json: bool,
}

impl DiffArgs {
    /// Profile file (if any) with command-line options layered on top
    fn resolve_profile(&self) -> Result<CompareProfile, ExError> {
        let mut profile = match &self.profile {
            Some(path) => CompareProfile::from_path(path)?,
            None => CompareProfile::default(),
        };
        profile.ignore.extend(self.ignore.iter().cloned());
        profile.introspect.extend(self.introspect.iter().cloned());
        profile.positional.extend(self.positional.iter().cloned());
        if self.label1.is_some() {
            profile.label1 = self.label1.clone();
        }
        if self.label2.is_some() {
            profile.label2 = self.label2.clone();
        }
        Ok(profile)
    }
}

fn load_document(graph: &mut Graph, path: &Path) -> Result<Value, ExError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ExError::from(e)
            .with_op("load_document")
            .with_path(path.display().to_string())
    })?;
    graph.import_json_str(&text).map_err(|e| {
        e.with_op("load_document")
            .with_path(path.display().to_string())
    })
}

/// Execute diff command
pub fn execute(args: DiffArgs) -> Result<Outcome, Box<dyn std::error::Error>> {
    let start = Instant::now();
    log_op_start!("cli_diff");

    let mut sc = args.resolve_profile()?.build()?;

    let mut graph = Graph::new();
    let left = load_document(&mut graph, &args.left)?;
    let right = load_document(&mut graph, &args.right)?;

    let diffs = sc.compare(&graph, &left, &right)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&diffs)?);
    } else {
        for diff in &diffs {
            println!("{}", diff);
        }
    }

    log_op_end!(
        "cli_diff",
        duration_ms = start.elapsed().as_millis() as u64,
        diff_count = diffs.len()
    );

    if diffs.is_empty() {
        Ok(Outcome::Clean)
    } else {
        Ok(Outcome::Differences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> DiffArgs {
        DiffArgs {
            left: PathBuf::from("a.json"),
            right: PathBuf::from("b.json"),
            profile: None,
            ignore: vec![".*id".to_string()],
            introspect: Vec::new(),
            positional: vec!["history".to_string()],
            label1: Some("before".to_string()),
            label2: None,
            json: false,
        }
    }

    #[test]
    fn test_flags_layer_over_empty_profile() {
        let profile = args().resolve_profile().unwrap();
        assert_eq!(profile.ignore, vec![".*id".to_string()]);
        assert_eq!(profile.positional, vec!["history".to_string()]);
        assert_eq!(profile.label1.as_deref(), Some("before"));
        assert_eq!(profile.label2, None);
    }
}
