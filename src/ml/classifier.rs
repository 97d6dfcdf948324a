// ============================================================
// Layer 5 — Burn-backed Classifier
// ============================================================
// Adapts the Kim-CNN module to the BinaryClassifier trait so the
// training loop can drive it without knowing about tensors.
//
//   train_batch → batcher → forward_loss → backward → AdaGrad step
//   predict     → model.valid() (dropout off) → sigmoid outputs
//
// Key burn detail:
//   - Training runs on the autodiff backend B
//   - model.valid() returns the model on B::InnerBackend, so the
//     prediction batcher is built for the inner backend too
//
// Reference: Burn Book §5 (Custom Training Loop)

use anyhow::{anyhow, bail, ensure, Result};
use burn::{
    data::dataloader::batcher::Batcher,
    module::AutodiffModule,
    optim::{AdaGradConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::batcher::DocBatcher;
use crate::domain::{
    document::LabeledDoc,
    embedding::EmbeddingMatrix,
    traits::{BatchStats, BinaryClassifier},
};
use crate::ml::model::{ClassWeights, KimCnn, KimCnnConfig};

pub struct CnnClassifier<B: AutodiffBackend, O> {
    model: KimCnn<B>,
    optim: O,
    lr: f64,
    class_weights: ClassWeights,
    batcher: DocBatcher<B>,
    vocab_size: usize,
}

/// Build a fresh Kim-CNN with AdaGrad, ready to train.
pub fn build_classifier<B: AutodiffBackend>(
    cfg: &KimCnnConfig,
    weights: &EmbeddingMatrix,
    lr: f64,
    class_weights: ClassWeights,
    device: &B::Device,
) -> CnnClassifier<B, impl Optimizer<KimCnn<B>, B>> {
    let model: KimCnn<B> = cfg.init(weights, device);
    let optim = AdaGradConfig::new().init::<B, KimCnn<B>>();
    CnnClassifier {
        model,
        optim,
        lr,
        class_weights,
        batcher: DocBatcher::new(device.clone(), cfg.seq_len),
        vocab_size: weights.vocab_size(),
    }
}

impl<B, O> CnnClassifier<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<KimCnn<B>, B>,
{
    pub fn model(&self) -> &KimCnn<B> {
        &self.model
    }
}

/// Fraction of rounded predictions that match the labels.
pub fn rounded_accuracy(probs: &[f32], labels: &[u8]) -> f64 {
    if probs.is_empty() {
        return 0.0;
    }
    let correct = probs
        .iter()
        .zip(labels)
        .filter(|(p, y)| round_prediction(**p) == **y)
        .count();
    correct as f64 / probs.len() as f64
}

/// Every token must index a row of the embedding table. Out-of-range
/// lookups panic on some backends and read garbage on others.
pub fn check_vocab(batch: &[LabeledDoc], vocab_size: usize) -> Result<()> {
    for (i, doc) in batch.iter().enumerate() {
        if let Some(&token) = doc.tokens.iter().find(|&&t| t as usize >= vocab_size) {
            bail!(
                "document {i} of the batch has token index {token}, \
                 but the embedding table has only {vocab_size} rows"
            );
        }
    }
    Ok(())
}

/// Nearest class for a sigmoid output. Exactly 0.5 rounds to 0
/// (round-half-to-even).
pub fn round_prediction(p: f32) -> u8 {
    if p > 0.5 {
        1
    } else {
        0
    }
}

fn tensor_to_vec<B: Backend>(t: Tensor<B, 2>) -> Result<Vec<f32>> {
    t.into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("Cannot read model output: {e:?}"))
}

impl<B, O> BinaryClassifier for CnnClassifier<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<KimCnn<B>, B>,
{
    fn summary(&self) -> String {
        format!("{}\n{}", self.model, model_summary(&self.model))
    }

    fn train_batch(&mut self, batch: &[LabeledDoc]) -> Result<BatchStats> {
        ensure!(!batch.is_empty(), "cannot train on an empty batch");
        check_vocab(batch, self.vocab_size)?;

        let labels: Vec<u8> = batch.iter().map(|d| d.label).collect();
        let tensors = self.batcher.batch(batch.to_vec());

        let (loss, probs) = self
            .model
            .forward_loss(tensors.tokens, tensors.labels, self.class_weights);

        let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
        ensure!(loss_val.is_finite(), "training loss is not finite ({loss_val})");

        let accuracy = rounded_accuracy(&tensor_to_vec(probs)?, &labels);

        // Backward pass + AdaGrad update
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.model);
        self.model = self.optim.step(self.lr, self.model.clone(), grads);

        Ok(BatchStats {
            loss: loss_val,
            accuracy,
        })
    }

    fn predict(&self, batch: &[LabeledDoc]) -> Result<Vec<f32>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        check_vocab(batch, self.vocab_size)?;

        // Dropout disabled, no autodiff graph
        let model = self.model.valid();
        let device = model.embedding.weight.val().device();
        let batcher = DocBatcher::<B::InnerBackend>::new(device, model.seq_len);

        let tensors = batcher.batch(batch.to_vec());
        tensor_to_vec(model.forward(tensors.tokens))
    }
}

/// Layer-by-layer shape and parameter table.
pub fn model_summary<B: Backend>(model: &KimCnn<B>) -> String {
    let [vocab, dim] = model.embedding.weight.val().dims();
    let seq = model.seq_len;
    let pooled = seq / 2;
    let filters: usize = model
        .branches
        .first()
        .map(|b| b.conv.weight.val().dims()[0])
        .unwrap_or(0);
    let flat = pooled * filters * model.branches.len();
    let hidden = model.hidden.weight.val().dims()[1];

    let mut rows: Vec<(String, String, usize)> = vec![(
        "embedding".into(),
        format!("[batch, {seq}, {dim}]"),
        vocab * dim,
    )];
    for branch in &model.branches {
        let k = branch.conv.weight.val().dims()[2];
        rows.push((
            format!("conv1d k={k} + maxpool"),
            format!("[batch, {filters}, {pooled}]"),
            branch.num_params(),
        ));
    }
    rows.push(("concat + flatten".into(), format!("[batch, {flat}]"), 0));
    rows.push(("dense (relu)".into(), format!("[batch, {hidden}]"), model.hidden.num_params()));
    rows.push(("dropout".into(), format!("[batch, {hidden}]"), 0));
    rows.push(("output (sigmoid)".into(), "[batch, 1]".into(), model.output.num_params()));

    let mut out = String::new();
    out.push_str(&format!("{:<26}{:<22}{:>12}\n", "Layer", "Output shape", "Params"));
    out.push_str(&format!("{}\n", "=".repeat(60)));
    for (name, shape, params) in rows {
        out.push_str(&format!("{name:<26}{shape:<22}{params:>12}\n"));
    }
    out.push_str(&format!("{}\n", "=".repeat(60)));
    out.push_str(&format!("Total params: {}\n", model.num_params()));
    out
}
