// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing the experiment:
// what a labelled document is, where a dataset's files live,
// how the best validation score is tracked, and what a
// classifier must be able to do.
//
// Rules for this layer:
//   - NO burn types
//   - NO file I/O
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A token-index document and its label
pub mod document;

// Pretrained word vectors used to initialise the model
pub mod embedding;

// Train/dev/test/embedding file locations per dataset
pub mod split;

// Strict-improvement best-F1 tracker
pub mod tracker;

// The classifier abstraction the training loop runs against
pub mod traits;
