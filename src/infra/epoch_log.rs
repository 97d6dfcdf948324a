// ============================================================
// Layer 6 — Per-Epoch Metrics Log
// ============================================================
// Optional CSV record of every epoch, across every dataset,
// for plotting learning curves after a run.
//
// Example:
//   dataset,epoch,train_loss,train_acc,valid_f1,best_valid_f1,tested
//   twitter,0,0.912345,0.601234,0.655000,0.655000,true
//   twitter,1,0.701234,0.688000,0.641000,0.655000,false
//
// The header is written only when the file is first created,
// so appending across runs keeps a single header.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

const HEADER: &str = "dataset,epoch,train_loss,train_acc,valid_f1,best_valid_f1,tested";

/// One row of the epoch log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub dataset: String,
    pub epoch: usize,
    /// Mean loss over trained (non-skipped) batches; NaN if none
    pub train_loss: f64,
    pub train_acc: f64,
    pub valid_f1: f64,
    pub best_valid_f1: f64,
    /// Whether this epoch triggered a test-set evaluation
    pub tested: bool,
}

pub struct EpochLogger {
    csv_path: PathBuf,
}

impl EpochLogger {
    /// Create the logger, writing the header if the file is new.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let csv_path = path.into();

        if let Some(parent) = csv_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created epoch log: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{},{:.6},{:.6},{:.6},{:.6},{}",
            m.dataset, m.epoch, m.train_loss, m.train_acc, m.valid_f1, m.best_valid_f1, m.tested,
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn row(epoch: usize, tested: bool) -> EpochMetrics {
        EpochMetrics {
            dataset: "twitter".into(),
            epoch,
            train_loss: 0.5,
            train_acc: 0.75,
            valid_f1: 0.6,
            best_valid_f1: 0.6,
            tested,
        }
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/epochs.csv");

        EpochLogger::new(&path).unwrap().log(&row(0, true)).unwrap();
        EpochLogger::new(&path).unwrap().log(&row(1, false)).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "twitter,0,0.500000,0.750000,0.600000,0.600000,true");
        assert!(lines[2].ends_with(",false"));
    }
}
