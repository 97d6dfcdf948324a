// ============================================================
// Layer 4 — Document Batcher
// ============================================================
// Implements burn's Batcher trait to turn a Vec<LabeledDoc>
// into device tensors.
//
// The model's input length is fixed (50 positions), but the
// documents in the split files are not guaranteed to be. Every
// row is therefore fitted to `seq_len` here:
//   - longer documents are truncated (keep the first seq_len)
//   - shorter documents are right-padded with index 0
//
// Output shapes:
//   tokens: [batch, seq_len]  Int
//   labels: [batch, 1]        Float (0.0 / 1.0)
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::domain::document::LabeledDoc;

/// Padding index used to fill short documents.
pub const PAD_INDEX: u32 = 0;

/// A batch of documents ready for the forward pass.
#[derive(Debug, Clone)]
pub struct DocTensorBatch<B: Backend> {
    pub tokens: Tensor<B, 2, Int>,
    pub labels: Tensor<B, 2>,
}

#[derive(Clone, Debug)]
pub struct DocBatcher<B: Backend> {
    pub device: B::Device,
    pub seq_len: usize,
}

impl<B: Backend> DocBatcher<B> {
    pub fn new(device: B::Device, seq_len: usize) -> Self {
        Self { device, seq_len }
    }
}

/// Pad or truncate one document to exactly `seq_len` indices.
pub fn fit_to_length(tokens: &[u32], seq_len: usize) -> impl Iterator<Item = i64> + '_ {
    tokens
        .iter()
        .copied()
        .chain(std::iter::repeat(PAD_INDEX))
        .take(seq_len)
        .map(i64::from)
}

impl<B: Backend> Batcher<LabeledDoc, DocTensorBatch<B>> for DocBatcher<B> {
    fn batch(&self, items: Vec<LabeledDoc>) -> DocTensorBatch<B> {
        let batch_size = items.len();

        let flat: Vec<i64> = items
            .iter()
            .flat_map(|d| fit_to_length(&d.tokens, self.seq_len))
            .collect();

        let labels: Vec<f32> = items.iter().map(|d| f32::from(d.label)).collect();

        let tokens = Tensor::<B, 2, Int>::from_data(
            TensorData::new(flat, [batch_size, self.seq_len]),
            &self.device,
        );
        let labels = Tensor::<B, 2>::from_data(
            TensorData::new(labels, [batch_size, 1]),
            &self.device,
        );

        DocTensorBatch { tokens, labels }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_fit_pads_and_truncates() {
        let padded: Vec<i64> = fit_to_length(&[5, 6], 4).collect();
        assert_eq!(padded, vec![5, 6, 0, 0]);

        let cut: Vec<i64> = fit_to_length(&[1, 2, 3, 4, 5], 3).collect();
        assert_eq!(cut, vec![1, 2, 3]);
    }

    #[test]
    fn test_batch_shapes() {
        let batcher = DocBatcher::<TestBackend>::new(Default::default(), 6);
        let batch = batcher.batch(vec![
            LabeledDoc::new(vec![1, 2, 3], 1),
            LabeledDoc::new(vec![4; 10], 0),
        ]);

        assert_eq!(batch.tokens.dims(), [2, 6]);
        assert_eq!(batch.labels.dims(), [2, 1]);

        let labels: Vec<f32> = batch.labels.into_data().to_vec().unwrap();
        assert_eq!(labels, vec![1.0, 0.0]);
    }
}
