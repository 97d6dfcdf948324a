// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// From split files on disk to tensor batches:
//
//   <name>.train / .dev / .test
//       │
//       ▼
//   loader        → parse header + tab-separated records
//       │
//       ▼
//   balancer      → (train only) under-sample, cap at 200k
//       │
//       ▼
//   batches       → fixed-size batches, in order
//       │
//       ▼
//   batcher       → burn tensors [batch, 50]
//
// Everything above `batcher` is plain Rust and testable
// without a tensor backend.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads tab-separated split files into LabeledDocs
pub mod loader;

/// Random under-sampling and size cap for the training split
pub mod balancer;

/// Single-pass batch iterator over a prepared split
pub mod batches;

/// Implements burn's Batcher trait to create tensor batches
pub mod batcher;
