// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The training loop never touches tensors. It talks to the
// model through `BinaryClassifier`, which has exactly the three
// capabilities the experiment needs:
//
//   - describe itself   (summary)
//   - train one batch   (train_batch)
//   - predict one batch (predict)
//
// Implementations:
//   - CnnClassifier → the burn Kim-CNN (ml::classifier)
//   - test doubles  → scripted predictions for loop tests
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::document::LabeledDoc;

/// Loss and accuracy reported by a single optimisation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchStats {
    pub loss: f64,
    pub accuracy: f64,
}

// ─── BinaryClassifier ─────────────────────────────────────────────────────────
/// A trainable binary classifier over token-index documents.
pub trait BinaryClassifier {
    /// Human-readable description of the model structure.
    fn summary(&self) -> String;

    /// Run one optimisation step on `batch` and return its loss/accuracy.
    /// The caller guarantees the batch contains both classes.
    fn train_batch(&mut self, batch: &[LabeledDoc]) -> Result<BatchStats>;

    /// Positive-class probabilities, one per document, in input order.
    fn predict(&self, batch: &[LabeledDoc]) -> Result<Vec<f32>>;
}
