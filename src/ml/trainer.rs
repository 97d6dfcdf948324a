// ============================================================
// Layer 5 — Training / Evaluation Loop
// ============================================================
// For one dataset, repeated for a fixed number of epochs:
//
//   TRAIN     re-load the balanced training split, skip batches
//             with a single class, one optimiser step per batch,
//             running mean loss/accuracy logged every N steps
//
//   VALIDATE  predict the dev split, round to 0/1, weighted F1
//             called as weighted_f1(y_true = predictions,
//               y_pred = labels), the reverse of the test call
//
//   TEST      only when the validation F1 strictly beats the
//             best so far: predict the test split, score it,
//             append a block to the results file
//
// The loop only sees the BinaryClassifier trait, so it runs the
// same against the burn model and against test doubles.
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::balancer::BalanceConfig;
use crate::data::batches::{load_batches, LoadMode, DEFAULT_BATCH_SIZE};
use crate::domain::{
    split::{DatasetPaths, Split},
    tracker::BestF1Tracker,
    traits::BinaryClassifier,
};
use crate::infra::{
    epoch_log::{EpochLogger, EpochMetrics},
    metrics::{classification_report, weighted_f1},
    report::{ResultsWriter, TestOutcome},
};
use crate::ml::classifier::round_prediction;

/// Loop parameters shared by every dataset in a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopSettings {
    pub epochs: usize,
    pub batch_size: usize,
    pub balance: BalanceConfig,
    /// Log running loss/accuracy every this many trained steps
    pub log_every: usize,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            epochs: 20,
            batch_size: DEFAULT_BATCH_SIZE,
            balance: BalanceConfig::default(),
            log_every: 40,
        }
    }
}

/// Running mean of per-step loss and accuracy.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrainProgress {
    pub steps: usize,
    pub skipped: usize,
    loss_sum: f64,
    acc_sum: f64,
}

impl TrainProgress {
    pub fn record(&mut self, loss: f64, accuracy: f64) {
        self.steps += 1;
        self.loss_sum += loss;
        self.acc_sum += accuracy;
    }

    pub fn mean_loss(&self) -> f64 {
        if self.steps == 0 { f64::NAN } else { self.loss_sum / self.steps as f64 }
    }

    pub fn mean_accuracy(&self) -> f64 {
        if self.steps == 0 { f64::NAN } else { self.acc_sum / self.steps as f64 }
    }
}

/// What happened in one epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochSummary {
    pub epoch: usize,
    pub train: TrainProgress,
    pub valid_f1: f64,
    /// Test weighted F1, present only when the epoch set a new best
    pub test_f1: Option<f64>,
}

/// Result of a dataset's full run.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetOutcome {
    pub dataset: String,
    pub best_valid_f1: f64,
    pub epochs: Vec<EpochSummary>,
}

impl DatasetOutcome {
    pub fn tested_epochs(&self) -> Vec<usize> {
        self.epochs
            .iter()
            .filter(|e| e.test_f1.is_some())
            .map(|e| e.epoch)
            .collect()
    }
}

/// Train one pass over the balanced training split.
pub fn train_epoch<C: BinaryClassifier>(
    classifier: &mut C,
    train_path: &Path,
    settings: &LoopSettings,
) -> Result<TrainProgress> {
    let mut progress = TrainProgress::default();

    for batch in load_batches(train_path, settings.batch_size, LoadMode::Train(settings.balance))? {
        if batch.is_single_class() {
            progress.skipped += 1;
            tracing::debug!("Skipping single-class batch of {}", batch.len());
            continue;
        }

        let stats = classifier.train_batch(&batch.docs)?;
        progress.record(stats.loss, stats.accuracy);

        if settings.log_every > 0 && progress.steps % settings.log_every == 0 {
            tracing::info!(
                "Step: {} | loss={:.6} | accuracy={:.6}",
                progress.steps,
                progress.mean_loss(),
                progress.mean_accuracy()
            );
        }
    }

    Ok(progress)
}

/// Predict a split in order. Returns (labels, rounded predictions).
pub fn predict_split<C: BinaryClassifier>(
    classifier: &C,
    path: &Path,
    batch_size: usize,
) -> Result<(Vec<u8>, Vec<u8>)> {
    let mut labels = Vec::new();
    let mut preds = Vec::new();

    for batch in load_batches(path, batch_size, LoadMode::Eval)? {
        let probs = classifier.predict(&batch.docs)?;
        anyhow::ensure!(
            probs.len() == batch.len(),
            "classifier returned {} predictions for {} documents",
            probs.len(),
            batch.len()
        );
        preds.extend(probs.into_iter().map(round_prediction));
        labels.extend(batch.labels());
    }

    Ok((labels, preds))
}

/// Validation weighted F1, with predictions in the y_true slot.
pub fn validation_f1<C: BinaryClassifier>(
    classifier: &C,
    dev_path: &Path,
    batch_size: usize,
) -> Result<f64> {
    let (labels, preds) = predict_split(classifier, dev_path, batch_size)?;
    weighted_f1(&preds, &labels)
}

/// Score the test split and append the block. Returns the test weighted F1.
pub fn test_and_report<C: BinaryClassifier>(
    classifier: &C,
    paths: &DatasetPaths,
    epoch: usize,
    batch_size: usize,
    results: &ResultsWriter,
) -> Result<f64> {
    let (labels, preds) = predict_split(classifier, paths.split(Split::Test), batch_size)?;
    let f1 = weighted_f1(&labels, &preds)?;
    let report = classification_report(&labels, &preds)?;

    results.append(&TestOutcome {
        dataset: &paths.name,
        epoch,
        weighted_f1: f1,
        report: &report,
    })?;
    Ok(f1)
}

/// Run every epoch for one dataset.
pub fn run_epochs<C: BinaryClassifier>(
    classifier: &mut C,
    paths: &DatasetPaths,
    settings: &LoopSettings,
    results: &ResultsWriter,
    epoch_log: Option<&EpochLogger>,
) -> Result<DatasetOutcome> {
    let mut tracker = BestF1Tracker::new();
    let mut epochs = Vec::with_capacity(settings.epochs);

    for epoch in 0..settings.epochs {
        tracing::info!("--------------Epoch: {epoch}--------------");

        let train = train_epoch(classifier, &paths.train, settings)?;
        if train.steps == 0 {
            tracing::warn!(
                "Epoch {epoch}: every training batch was single-class ({} skipped)",
                train.skipped
            );
        }

        let valid_f1 = validation_f1(classifier, &paths.dev, settings.batch_size)?;
        tracing::info!("Validating f1-weighted score: {valid_f1}");

        let test_f1 = if tracker.observe(valid_f1) {
            let f1 = test_and_report(classifier, paths, epoch, settings.batch_size, results)?;
            tracing::info!("New best validation F1; test f1-weighted score: {f1}");
            Some(f1)
        } else {
            None
        };

        println!(
            "{} | epoch {:>3}/{} | train_loss={:.4} | train_acc={:.1}% | valid_f1={:.4} | best={:.4}{}",
            paths.name,
            epoch,
            settings.epochs,
            train.mean_loss(),
            train.mean_accuracy() * 100.0,
            valid_f1,
            tracker.best(),
            if test_f1.is_some() { " | tested" } else { "" },
        );

        if let Some(log) = epoch_log {
            log.log(&EpochMetrics {
                dataset: paths.name.clone(),
                epoch,
                train_loss: train.mean_loss(),
                train_acc: train.mean_accuracy(),
                valid_f1,
                best_valid_f1: tracker.best(),
                tested: test_f1.is_some(),
            })?;
        }

        epochs.push(EpochSummary {
            epoch,
            train,
            valid_f1,
            test_f1,
        });
    }

    Ok(DatasetOutcome {
        dataset: paths.name.clone(),
        best_valid_f1: tracker.best(),
        epochs,
    })
}
