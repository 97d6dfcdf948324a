// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File formats and scoring shared by the training loop:
//
//   embeddings.rs  reads the pretrained .npy matrix per dataset
//   metrics.rs     weighted F1 and the classification report
//   report.rs      append-only test results file
//   epoch_log.rs   optional per-epoch CSV
//
// Reference: Rust Book §9 (Error Handling with anyhow)

/// Pretrained embedding matrix loading (.npy)
pub mod embeddings;

/// Precision / recall / F1 and the text report
pub mod metrics;

/// Append-only results file
pub mod report;

/// Per-epoch CSV metrics log
pub mod epoch_log;
