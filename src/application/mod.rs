// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to run an experiment.
//
// Rules for this layer:
//   - No ML math or tensor code here
//   - No argument parsing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Train, validate and test over every configured dataset
pub mod experiment;
