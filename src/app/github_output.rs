//! CI step outputs.
//!
//! When `GITHUB_OUTPUT` names a file, the run appends `key=value` lines that
//! later workflow steps read (for example to decide whether to commit data).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::run::RunOutcome;

/// Environment variable naming the step-output file.
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// Appends the outputs of `outcome` to the file named by `GITHUB_OUTPUT`.
///
/// Does nothing when the variable is unset or empty.
pub fn write_github_output(outcome: &RunOutcome) -> Result<()> {
    match std::env::var_os(GITHUB_OUTPUT_ENV) {
        Some(path) if !path.is_empty() => append_outputs(Path::new(&path), outcome),
        _ => Ok(()),
    }
}

fn append_outputs(path: &Path, outcome: &RunOutcome) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    write!(
        file,
        "shops_count={}\npdfs_processed={}\ndata_updated={}\n",
        outcome.shops_count(),
        outcome.pdfs_processed(),
        outcome.data_updated()
    )
    .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::SkipReason;
    use tempfile::TempDir;

    #[test]
    fn test_append_outputs() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("output");
        std::fs::write(&path, "previous=1\n").expect("seed file");

        append_outputs(&path, &RunOutcome::Skipped(SkipReason::Unchanged)).expect("append");

        let text = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(
            text,
            "previous=1\nshops_count=0\npdfs_processed=0\ndata_updated=false\n"
        );
    }
}
