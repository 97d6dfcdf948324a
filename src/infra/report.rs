// ============================================================
// Layer 6 — Test Results File
// ============================================================
// Appends one block per "new best" epoch to a plain text file.
// The file is opened in append mode for every write and is
// never truncated, so repeated runs accumulate blocks.
//
// Block layout:
//
//   twitter
//   Epoch 3..................................................
//   0.8123456789
//   #####
//
//   <classification report>
//   ...............................................................
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use crate::infra::metrics::ClassificationReport;

/// Decimal places in the appended classification report.
pub const REPORT_DIGITS: usize = 3;

const EPOCH_RULE: &str = "..................................................";
const BLOCK_RULE: &str = "...............................................................";

/// One test-set evaluation worth recording.
#[derive(Debug, Clone)]
pub struct TestOutcome<'a> {
    pub dataset: &'a str,
    pub epoch: usize,
    pub weighted_f1: f64,
    pub report: &'a ClassificationReport,
}

/// Format a block exactly as it is written to disk.
pub fn render_block(outcome: &TestOutcome<'_>) -> String {
    // {:?} keeps a decimal point on whole numbers ("1.0", not "1")
    format!(
        "{}\nEpoch {}{EPOCH_RULE}\n{:?}\n#####\n\n{}{BLOCK_RULE}\n\n",
        outcome.dataset,
        outcome.epoch,
        outcome.weighted_f1,
        outcome.report.render(REPORT_DIGITS),
    )
}

/// Append-only writer for the results file.
pub struct ResultsWriter {
    path: PathBuf,
}

impl ResultsWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one block and flush it to disk.
    pub fn append(&self, outcome: &TestOutcome<'_>) -> Result<()> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Cannot open results file '{}'", self.path.display()))?;

        f.write_all(render_block(outcome).as_bytes())
            .and_then(|_| f.flush())
            .with_context(|| format!("Cannot write results to '{}'", self.path.display()))?;

        tracing::debug!(
            "Appended {} epoch {} to '{}'",
            outcome.dataset,
            outcome.epoch,
            self.path.display()
        );
        Ok(())
    }
}
