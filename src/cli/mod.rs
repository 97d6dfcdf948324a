// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands an ExperimentConfig to
// Layer 2. With --config, the JSON file is the whole
// configuration and the other flags are ignored.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::application::experiment::{ExperimentConfig, ExperimentUseCase};
use commands::RunArgs;

#[derive(Parser, Debug)]
#[command(
    name = "kim-cnn",
    version = "0.1.0",
    about = "Train and evaluate a Kim-CNN binary classifier on each dataset, appending test reports."
)]
pub struct Cli {
    /// JSON ExperimentConfig; replaces every other flag
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunArgs,
}

impl Cli {
    pub fn experiment_config(&self) -> Result<ExperimentConfig> {
        match &self.config {
            Some(path) => ExperimentConfig::load(path),
            None => Ok(self.run.clone().into()),
        }
    }

    pub fn run(self) -> Result<()> {
        let config = self.experiment_config()?;
        tracing::info!(
            "Running {} dataset(s) for {} epochs; results → '{}'",
            config.datasets.len(),
            config.epochs,
            config.results.display()
        );

        let outcomes = ExperimentUseCase::new(config).execute()?;

        for o in &outcomes {
            println!("{}: best validation F1 {:.4}", o.dataset, o.best_valid_f1);
        }
        Ok(())
    }
}
