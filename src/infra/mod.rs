// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem on behalf of the
// other layers:
//
//   checkpoint.rs    — model config JSON + Burn CompactRecorder
//                      weights, enough to rebuild the model for
//                      inference
//
//   corpus_store.rs  — the preprocessed corpus: vocabulary,
//                      manifest and train/valid example files

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Preprocessed corpus persistence
pub mod corpus_store;
