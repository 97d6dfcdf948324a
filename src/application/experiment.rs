// ============================================================
// Layer 2 — ExperimentUseCase
// ============================================================
// Runs the full experiment, one dataset after another:
//
//   Step 1: Resolve split + embedding paths    (Layer 3 - domain)
//   Step 2: Load the embedding matrix          (Layer 6 - infra)
//   Step 3: Build a fresh Kim-CNN + AdaGrad    (Layer 5 - ml)
//   Step 4: Print the model summary            (Layer 5 - ml)
//   Step 5: Run the epoch loop                 (Layer 5 - ml)
//
// Every dataset gets a new model. Results from all datasets go
// to the same append-only results file.
//
// A failure aborts the run, unless keep_going is set: then the
// failure is logged, the remaining datasets still run, and the
// run as a whole reports an error at the end.
//
// Reference: Rust Book §9 (Error Handling)
//            Burn Book §5 (Training)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::balancer::BalanceConfig;
use crate::domain::{split::DatasetPaths, traits::BinaryClassifier};
use crate::infra::{embeddings::load_embeddings, epoch_log::EpochLogger, report::ResultsWriter};
use crate::ml::{
    classifier::build_classifier,
    model::{ClassWeights, KimCnnConfig},
    trainer::{run_epochs, DatasetOutcome, LoopSettings},
};

type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

pub const DEFAULT_DATASETS: [&str; 4] = ["twitter", "amazon", "yelp_hotel", "yelp_rest"];

// ─── Experiment Configuration ────────────────────────────────────────────────
// Every tunable of a run. Missing JSON fields take their default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub datasets:      Vec<String>,
    pub indices_root:  PathBuf,
    pub weights_root:  PathBuf,
    pub results:       PathBuf,
    pub epoch_log:     Option<PathBuf>,
    pub epochs:        usize,
    pub batch_size:    usize,
    pub lr:            f64,
    pub balance:       BalanceConfig,
    pub class_weights: ClassWeights,
    pub log_every:     usize,
    pub keep_going:    bool,
    pub model:         KimCnnConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        let loop_defaults = LoopSettings::default();
        Self {
            datasets:      DEFAULT_DATASETS.iter().map(|s| s.to_string()).collect(),
            indices_root:  PathBuf::from("../../data_indices"),
            weights_root:  PathBuf::from("../../data/weight"),
            results:       PathBuf::from("results.txt"),
            epoch_log:     None,
            epochs:        loop_defaults.epochs,
            batch_size:    loop_defaults.batch_size,
            lr:            0.01,
            balance:       loop_defaults.balance,
            class_weights: ClassWeights::default(),
            log_every:     loop_defaults.log_every,
            keep_going:    false,
            model:         KimCnnConfig::new(),
        }
    }
}

impl ExperimentConfig {
    /// Read a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config in '{}'", path.display()))?;
        cfg.model
            .validate()
            .with_context(|| format!("Invalid model config in '{}'", path.display()))?;
        Ok(cfg)
    }

    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            epochs:     self.epochs,
            batch_size: self.batch_size,
            balance:    self.balance,
            log_every:  self.log_every,
        }
    }

    pub fn dataset_paths(&self, name: &str) -> DatasetPaths {
        DatasetPaths::resolve(name, &self.indices_root, &self.weights_root)
    }
}

// ─── ExperimentUseCase ───────────────────────────────────────────────────────
pub struct ExperimentUseCase {
    config: ExperimentConfig,
}

impl ExperimentUseCase {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    /// Run every dataset with the burn Kim-CNN on the WGPU device.
    pub fn execute(&self) -> Result<Vec<DatasetOutcome>> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);

        let cfg = &self.config;
        self.execute_with(|paths| {
            let weights = load_embeddings(&paths.embeddings)?;
            let classifier = build_classifier::<TrainBackend>(
                &cfg.model,
                &weights,
                cfg.lr,
                cfg.class_weights,
                &device,
            );
            Ok(classifier)
        })
    }

    /// Run every dataset with classifiers from `make_classifier`.
    pub fn execute_with<C, F>(&self, mut make_classifier: F) -> Result<Vec<DatasetOutcome>>
    where
        C: BinaryClassifier,
        F: FnMut(&DatasetPaths) -> Result<C>,
    {
        let cfg = &self.config;
        let settings = cfg.loop_settings();
        let results = ResultsWriter::new(&cfg.results);
        let epoch_log = cfg
            .epoch_log
            .as_ref()
            .map(EpochLogger::new)
            .transpose()?;

        let mut outcomes = Vec::with_capacity(cfg.datasets.len());
        let mut failed = Vec::new();

        for name in &cfg.datasets {
            tracing::info!("==================== {name} ====================");
            let paths = cfg.dataset_paths(name);

            let run = make_classifier(&paths).and_then(|mut classifier| {
                let summary = classifier.summary();
                tracing::info!("Model for {name}:\n{summary}");
                println!("{summary}");
                run_epochs(&mut classifier, &paths, &settings, &results, epoch_log.as_ref())
            });

            match run.with_context(|| format!("Dataset '{name}' failed")) {
                Ok(outcome) => {
                    tracing::info!(
                        "{name}: best validation F1 {:.4}, tested at epochs {:?}",
                        outcome.best_valid_f1,
                        outcome.tested_epochs()
                    );
                    outcomes.push(outcome);
                }
                Err(e) if cfg.keep_going => {
                    tracing::error!("{e:#}");
                    failed.push(name.clone());
                }
                Err(e) => return Err(e),
            }
        }

        if !failed.is_empty() {
            bail!("{} dataset(s) failed: {}", failed.len(), failed.join(", "));
        }
        Ok(outcomes)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::trainer::tests::{toy_dataset, ScriptedClassifier};

    fn toy_config(root: &Path, datasets: &[&str]) -> ExperimentConfig {
        ExperimentConfig {
            datasets: datasets.iter().map(|s| s.to_string()).collect(),
            indices_root: root.join("indices"),
            weights_root: root.join("weights"),
            results: root.join("results.txt"),
            epochs: 2,
            batch_size: 5,
            ..ExperimentConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let cfg = ExperimentConfig::default();
        assert_eq!(cfg.datasets, vec!["twitter", "amazon", "yelp_hotel", "yelp_rest"]);
        assert_eq!(cfg.epochs, 20);
        assert_eq!(cfg.batch_size, 128);
        assert_eq!(cfg.lr, 0.01);
        assert_eq!(cfg.balance.seed, 33);
        assert_eq!(cfg.balance.max_examples, 200_000);
        assert_eq!(cfg.results, PathBuf::from("results.txt"));
        assert!(!cfg.keep_going);
    }

    #[test]
    fn test_dataset_paths_layout() {
        let paths = ExperimentConfig::default().dataset_paths("amazon");
        assert_eq!(paths.dev, PathBuf::from("../../data_indices/amazon/amazon.dev"));
        assert_eq!(paths.embeddings, PathBuf::from("../../data/weight/amazon.npy"));
    }

    #[test]
    fn test_partial_json_config_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("experiment.json");
        std::fs::write(&path, r#"{ "datasets": ["twitter"], "epochs": 3 }"#).unwrap();

        let cfg = ExperimentConfig::load(&path).unwrap();
        assert_eq!(cfg.datasets, vec!["twitter"]);
        assert_eq!(cfg.epochs, 3);
        assert_eq!(cfg.batch_size, 128);
        assert_eq!(cfg.model.seq_len, 50);
    }

    #[test]
    fn test_invalid_json_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ epochs: ").unwrap();
        assert!(ExperimentConfig::load(&path).is_err());
    }

    #[test]
    fn test_unbuildable_model_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let write_model = |model: KimCnnConfig| {
            std::fs::write(&path, serde_json::json!({ "model": model }).to_string()).unwrap();
        };

        write_model(KimCnnConfig::new().with_kernel_sizes(vec![0]));
        let err = ExperimentConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("kernel size 0"), "{err:#}");

        write_model(KimCnnConfig::new().with_seq_len(1));
        assert!(ExperimentConfig::load(&path).is_err());

        write_model(KimCnnConfig::new().with_seq_len(20));
        assert_eq!(ExperimentConfig::load(&path).unwrap().model.seq_len, 20);
    }

    #[test]
    fn test_runs_every_dataset_into_one_results_file() {
        let dir = tempfile::tempdir().unwrap();
        toy_dataset(dir.path());
        let cfg = toy_config(dir.path(), &["toy", "toy"]);

        let outcomes = ExperimentUseCase::new(cfg.clone())
            .execute_with(|_| Ok(ScriptedClassifier::new(vec![2, 0])))
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        let text = std::fs::read_to_string(&cfg.results).unwrap();
        assert_eq!(text.matches("#####").count(), 4);
    }

    #[test]
    fn test_first_failure_aborts() {
        let dir = tempfile::tempdir().unwrap();
        toy_dataset(dir.path());
        let cfg = toy_config(dir.path(), &["missing", "toy"]);

        let mut built = 0;
        let err = ExperimentUseCase::new(cfg)
            .execute_with(|_| {
                built += 1;
                Ok(ScriptedClassifier::new(vec![]))
            })
            .unwrap_err();

        assert!(format!("{err:#}").contains("Dataset 'missing' failed"));
        assert_eq!(built, 1);
    }

    #[test]
    fn test_keep_going_runs_remaining_datasets() {
        let dir = tempfile::tempdir().unwrap();
        toy_dataset(dir.path());
        let cfg = ExperimentConfig {
            keep_going: true,
            ..toy_config(dir.path(), &["missing", "toy"])
        };

        let err = ExperimentUseCase::new(cfg.clone())
            .execute_with(|_| Ok(ScriptedClassifier::new(vec![2, 0])))
            .unwrap_err();

        assert!(err.to_string().contains("missing"));
        // "toy" still ran and reported
        let text = std::fs::read_to_string(&cfg.results).unwrap();
        assert!(text.starts_with("toy\n"));
    }

    #[test]
    fn test_epoch_log_is_shared_across_datasets() {
        let dir = tempfile::tempdir().unwrap();
        toy_dataset(dir.path());
        let cfg = ExperimentConfig {
            epoch_log: Some(dir.path().join("logs/epochs.csv")),
            ..toy_config(dir.path(), &["toy", "toy"])
        };

        ExperimentUseCase::new(cfg.clone())
            .execute_with(|_| Ok(ScriptedClassifier::new(vec![])))
            .unwrap();

        let text = std::fs::read_to_string(dir.path().join("logs/epochs.csv")).unwrap();
        // header + 2 datasets * 2 epochs
        assert_eq!(text.lines().count(), 5);
    }
}
