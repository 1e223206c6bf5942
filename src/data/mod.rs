// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a corpus file and a padded tensor batch:
//
//   corpus.jsonl
//       │
//       ▼
//   JsonLinesLoader   → RawPair (text + keyphrase strings)
//       │
//       ▼
//   PairFilter        → TokenizedPair (CopySeqTokenizer + filters)
//       │
//       ▼
//   Vocabulary        → global word ↔ id table
//       │
//       ▼
//   ExampleBuilder    → KeyphraseExample / One2ManyExample
//       │               (DynamicVocabulary per document)
//       ▼
//   KeyphraseDataset  → Burn Dataset
//       │
//       ▼
//   KeyphraseBatcher  → KeyphraseBatch tensors

/// JSON lines corpus reader
pub mod loader;

/// Word-level tokenizer
pub mod tokenizer;

/// Tokenisation + keyphrase filtering
pub mod filter;

/// Global vocabulary
pub mod vocab;

/// Per-example local vocabulary and copy pointers
pub mod dynamic_vocab;

/// Example building and the Burn Dataset
pub mod dataset;

/// Burn Batcher with padding and masks
pub mod batcher;

/// Seeded train/valid split
pub mod splitter;
