// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All burn-specific code lives in model.rs and classifier.rs.
// The epoch loop in trainer.rs only talks to the
// BinaryClassifier trait, so it never touches a tensor.
//
//   model.rs       Kim-CNN with a pretrained embedding, three
//                  same-padded Conv1d + max-pool branches,
//                  dense + dropout, sigmoid output; weighted
//                  BCE with an L2 penalty on the kernels
//
//   classifier.rs  Kim-CNN + AdaGrad behind BinaryClassifier
//
//   trainer.rs     Epoch loop: train, validate, test on a
//                  new best validation F1
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Kim (2014) Convolutional Neural Networks for
//            Sentence Classification

/// Kim-CNN architecture and loss
pub mod model;

/// Burn-backed BinaryClassifier
pub mod classifier;

/// Train / validate / test loop
pub mod trainer;
