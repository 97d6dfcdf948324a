// ============================================================
// Layer 3 — Labeled Document Domain Type
// ============================================================
// One record from a split file: a pre-indexed token sequence
// and its binary sentiment label.
//
// The tokens are already vocabulary indices; the text was
// tokenised and indexed by an earlier preprocessing step, so
// nothing in this crate ever sees words.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// A single labelled example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledDoc {
    /// Vocabulary indices, in document order.
    /// Padding/truncation to the model input length happens
    /// later, in the batcher.
    pub tokens: Vec<u32>,

    /// 0 = negative, 1 = positive
    pub label: u8,
}

impl LabeledDoc {
    pub fn new(tokens: Vec<u32>, label: u8) -> Self {
        Self { tokens, label }
    }
}

/// Returns true if every label in the slice is the same class.
/// An empty slice counts as single-class.
pub fn is_single_class(labels: &[u8]) -> bool {
    match labels.first() {
        Some(first) => labels.iter().all(|l| l == first),
        None => true,
    }
}
