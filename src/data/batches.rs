// ============================================================
// Layer 4 — Batch Iterator
// ============================================================
// Turns a split file into a finite stream of fixed-size
// batches, in order.
//
//   N examples, batch size B  →  ceil(N / B) batches
//   every batch has B rows except possibly the last
//
// The stream is consumed once. To go over a split again
// (next epoch), call `load_batches` again: the file is re-read
// and, in training mode, re-balanced with the same seed, so
// every epoch sees the same examples in the same order.
//
// Reference: Rust Book §13 (Iterators)

use anyhow::{ensure, Result};
use std::path::Path;

use crate::data::balancer::{balance, BalanceConfig};
use crate::data::loader::read_labeled_docs;
use crate::domain::document::{is_single_class, LabeledDoc};

pub const DEFAULT_BATCH_SIZE: usize = 128;

/// How a split is prepared before batching
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadMode {
    /// Under-sample and cap (training split)
    Train(BalanceConfig),
    /// Every record, verbatim (dev/test splits)
    Eval,
}

/// One slice of a split.
#[derive(Debug, Clone, PartialEq)]
pub struct DocBatch {
    pub docs: Vec<LabeledDoc>,
}

impl DocBatch {
    // Never empty: the iterator stops instead of yielding one.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn labels(&self) -> Vec<u8> {
        self.docs.iter().map(|d| d.label).collect()
    }

    /// A batch with only one class gives the minority class no
    /// gradient signal; training skips these.
    pub fn is_single_class(&self) -> bool {
        is_single_class(&self.labels())
    }
}

/// Finite, single-pass stream of batches.
pub struct DocBatches {
    remaining: std::vec::IntoIter<LabeledDoc>,
    batch_size: usize,
}

impl DocBatches {
    pub fn new(docs: Vec<LabeledDoc>, batch_size: usize) -> Result<Self> {
        ensure!(batch_size > 0, "batch size must be at least 1");
        Ok(Self {
            remaining: docs.into_iter(),
            batch_size,
        })
    }
}

impl Iterator for DocBatches {
    type Item = DocBatch;

    fn next(&mut self) -> Option<DocBatch> {
        let docs: Vec<LabeledDoc> = self.remaining.by_ref().take(self.batch_size).collect();
        if docs.is_empty() {
            None
        } else {
            Some(DocBatch { docs })
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.len().div_ceil(self.batch_size);
        (n, Some(n))
    }
}

impl ExactSizeIterator for DocBatches {}

/// Read `path`, prepare it according to `mode`, and batch it.
pub fn load_batches(path: &Path, batch_size: usize, mode: LoadMode) -> Result<DocBatches> {
    let docs = read_labeled_docs(path)?;
    let docs = match mode {
        LoadMode::Train(cfg) => balance(docs, &cfg),
        LoadMode::Eval => docs,
    };
    tracing::debug!(
        "Prepared {} examples from '{}' ({:?})",
        docs.len(),
        path.display(),
        mode
    );
    DocBatches::new(docs, batch_size)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docs(n: usize) -> Vec<LabeledDoc> {
        (0..n).map(|i| LabeledDoc::new(vec![i as u32], (i % 2) as u8)).collect()
    }

    #[test]
    fn test_batch_count_and_sizes() {
        let batches: Vec<DocBatch> = DocBatches::new(docs(300), 128).unwrap().collect();
        // ceil(300 / 128) = 3
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 128);
        assert_eq!(batches[1].len(), 128);
        assert_eq!(batches[2].len(), 44);
    }

    #[test]
    fn test_exact_multiple_has_no_short_batch() {
        let batches: Vec<DocBatch> = DocBatches::new(docs(256), 128).unwrap().collect();
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 128));
    }

    #[test]
    fn test_len_matches_yielded_batches() {
        let mut it = DocBatches::new(docs(10), 3).unwrap();
        assert_eq!(it.len(), 4);
        it.next();
        assert_eq!(it.len(), 3);
        assert_eq!(it.count(), 3);
    }

    #[test]
    fn test_order_is_preserved() {
        let flat: Vec<u32> = DocBatches::new(docs(7), 2)
            .unwrap()
            .flat_map(|b| b.docs.into_iter().map(|d| d.tokens[0]))
            .collect();
        assert_eq!(flat, (0..7).collect::<Vec<u32>>());
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert_eq!(DocBatches::new(Vec::new(), 8).unwrap().count(), 0);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(DocBatches::new(docs(3), 0).is_err());
    }

    #[test]
    fn test_single_class_batch_detection() {
        let batch = DocBatch { docs: vec![LabeledDoc::new(vec![1], 1), LabeledDoc::new(vec![2], 1)] };
        assert!(batch.is_single_class());
    }

    #[test]
    fn test_train_mode_balances_and_reload_is_identical() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "id\tdoc\tlabel").unwrap();
        for i in 0..100 {
            writeln!(f, "{i}\t{i} {i}\t1").unwrap();
        }
        for i in 0..30 {
            writeln!(f, "{i}\t{i}\t0").unwrap();
        }

        let mode = LoadMode::Train(BalanceConfig::default());
        let first: Vec<DocBatch> = load_batches(f.path(), 16, mode).unwrap().collect();
        let second: Vec<DocBatch> = load_batches(f.path(), 16, mode).unwrap().collect();

        let total: usize = first.iter().map(DocBatch::len).sum();
        assert_eq!(total, 60);
        assert_eq!(first, second);
    }

    #[test]
    fn test_eval_mode_keeps_everything() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "id\tdoc\tlabel").unwrap();
        for i in 0..10 {
            writeln!(f, "{i}\t{i}\t1").unwrap();
        }
        writeln!(f, "10\t10\t0").unwrap();

        let total: usize = load_batches(f.path(), 4, LoadMode::Eval)
            .unwrap()
            .map(|b| b.len())
            .sum();
        assert_eq!(total, 11);
    }
}
