// ============================================================
// Layer 4 — Class Balancer
// ============================================================
// Prepares the training split:
//
//   1. Random under-sampling
//        The majority class is cut down to the size of the
//        minority class. Output is grouped by class (label 0
//        first, then label 1):
//          - minority class: every example, in file order
//          - majority class: a seeded random subset, in the
//            order it was drawn
//
//   2. Size cap
//        If the balanced set is still larger than
//        `max_examples`, an index permutation is shuffled with
//        a fresh RNG (same seed) and the first `max_examples`
//        positions are kept.
//
// Both steps take the seed explicitly so the same file always
// produces the same training set, no matter what else in the
// process has consumed randomness.
//
// Reference: rand crate documentation (SeedableRng, SliceRandom)

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::document::LabeledDoc;

/// Resampling settings for the training split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceConfig {
    pub seed: u64,
    pub max_examples: usize,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            seed: 33,
            max_examples: 200_000,
        }
    }
}

/// Under-sample, then cap. This is the full training-mode pipeline.
pub fn balance(docs: Vec<LabeledDoc>, cfg: &BalanceConfig) -> Vec<LabeledDoc> {
    let balanced = undersample(docs, cfg.seed);
    cap(balanced, cfg.max_examples, cfg.seed)
}

/// Equalise class counts by randomly dropping majority-class examples.
///
/// With fewer than two classes present there is nothing to
/// balance against and the input is returned unchanged.
pub fn undersample(docs: Vec<LabeledDoc>, seed: u64) -> Vec<LabeledDoc> {
    let (neg, pos): (Vec<LabeledDoc>, Vec<LabeledDoc>) =
        docs.into_iter().partition(|d| d.label == 0);

    if neg.is_empty() || pos.is_empty() {
        tracing::warn!(
            "Only one class present ({} negative, {} positive); skipping under-sampling",
            neg.len(),
            pos.len()
        );
        let mut all = neg;
        all.extend(pos);
        return all;
    }

    let target = neg.len().min(pos.len());
    let mut rng = StdRng::seed_from_u64(seed);

    tracing::debug!(
        "Under-sampling: {} negative, {} positive → {} each",
        neg.len(),
        pos.len(),
        target
    );

    let mut out = Vec::with_capacity(target * 2);
    for class in [neg, pos] {
        if class.len() == target {
            out.extend(class);
        } else {
            out.extend(draw(class, target, &mut rng));
        }
    }
    out
}

/// Take `amount` elements of `items` without replacement, in draw order.
fn draw(items: Vec<LabeledDoc>, amount: usize, rng: &mut StdRng) -> Vec<LabeledDoc> {
    let mut indices: Vec<usize> = (0..items.len()).collect();
    let (chosen, _) = indices.partial_shuffle(rng, amount);
    let chosen = chosen.to_vec();

    let mut slots: Vec<Option<LabeledDoc>> = items.into_iter().map(Some).collect();
    chosen
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
}

/// Keep at most `max_examples` documents, chosen by a seeded shuffle.
/// Inputs already within the limit are returned untouched, order included.
pub fn cap(docs: Vec<LabeledDoc>, max_examples: usize, seed: u64) -> Vec<LabeledDoc> {
    if docs.len() <= max_examples {
        return docs;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..docs.len()).collect();
    indices.shuffle(&mut rng);
    indices.truncate(max_examples);

    tracing::info!(
        "Training set has {} examples; capping to {}",
        docs.len(),
        max_examples
    );

    let mut slots: Vec<Option<LabeledDoc>> = docs.into_iter().map(Some).collect();
    indices
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
}
