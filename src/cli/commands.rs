// ============================================================
// Layer 1 — CLI Arguments
// ============================================================
// Every flag has a default, so running the binary with no
// arguments runs the full experiment over all four datasets.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::Args;
use std::path::PathBuf;

use crate::application::experiment::ExperimentConfig;
use crate::data::balancer::BalanceConfig;

/// Arguments for an experiment run.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Datasets to run, in order (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "twitter,amazon,yelp_hotel,yelp_rest")]
    pub datasets: Vec<String>,

    /// Directory holding <name>/<name>.{train,dev,test}
    #[arg(long, default_value = "../../data_indices")]
    pub indices_root: PathBuf,

    /// Directory holding <name>.npy embedding matrices
    #[arg(long, default_value = "../../data/weight")]
    pub weights_root: PathBuf,

    /// Append-only results file
    #[arg(long, default_value = "results.txt")]
    pub results: PathBuf,

    /// Optional per-epoch CSV log
    #[arg(long)]
    pub epoch_log: Option<PathBuf>,

    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// AdaGrad learning rate
    #[arg(long, default_value_t = 0.01)]
    pub lr: f64,

    /// Seed for under-sampling and the training-size cap
    #[arg(long, default_value_t = 33)]
    pub seed: u64,

    /// Largest balanced training set kept per epoch
    #[arg(long, default_value_t = 200_000)]
    pub max_train: usize,

    /// Log running loss/accuracy every N trained steps
    #[arg(long, default_value_t = 40)]
    pub log_every: usize,

    /// Continue with the next dataset when one fails
    #[arg(long)]
    pub keep_going: bool,
}

/// Boundary between Layer 1 and Layer 2: the application
/// layer never sees clap types.
impl From<RunArgs> for ExperimentConfig {
    fn from(a: RunArgs) -> Self {
        ExperimentConfig {
            datasets:     a.datasets,
            indices_root: a.indices_root,
            weights_root: a.weights_root,
            results:      a.results,
            epoch_log:    a.epoch_log,
            epochs:       a.epochs,
            batch_size:   a.batch_size,
            lr:           a.lr,
            balance: BalanceConfig {
                seed:         a.seed,
                max_examples: a.max_train,
            },
            log_every:    a.log_every,
            keep_going:   a.keep_going,
            ..ExperimentConfig::default()
        }
    }
}
