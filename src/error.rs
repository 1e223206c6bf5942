// ============================================================
// Core Error Type
// ============================================================
// Errors raised by the vocabulary, tokenizer and model core.
// The outer layers (cli, application, infra) wrap these in
// anyhow::Error with extra context.
//
// Two things are deliberately NOT errors here:
//   - a token missing from the vocabulary  → <unk> id
//   - a target token missing from a source → copy pointer 0

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KeyphraseError>;

#[derive(Debug, Error)]
pub enum KeyphraseError {
    /// Teacher forcing was asked to roll out over a zero-length target.
    #[error("teacher-forced rollout needs a non-empty target sequence")]
    EmptyTarget,

    /// Self-fed generation was asked for zero steps.
    #[error("self-fed rollout horizon must be at least 1")]
    EmptyHorizon,

    #[error("top-k of {k} is outside 1..={vocab_size}")]
    InvalidTopK { k: usize, vocab_size: usize },

    /// Encoder / decoder / attention widths that cannot be wired together.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("invalid vocabulary: {0}")]
    InvalidVocabulary(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}
