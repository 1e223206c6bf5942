// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer only talks to these traits, so a
// different corpus format or tokenisation scheme can be
// plugged in without touching the use cases.
//
//   PairSource  → JsonLinesLoader (data/loader.rs)
//   Tokenize    → CopySeqTokenizer (data/tokenizer.rs)

use anyhow::Result;
use crate::domain::example::RawPair;

// ─── PairSource ───────────────────────────────────────────────────────────────
/// Anything that can produce (source text, keyphrases) pairs.
pub trait PairSource {
    fn load_all(&self) -> Result<Vec<RawPair>>;
}

// ─── Tokenize ─────────────────────────────────────────────────────────────────
/// Text → token sequence. Treated as a black box by the
/// vocabulary and example builders.
pub trait Tokenize {
    fn tokenize(&self, text: &str) -> Vec<String>;
}
