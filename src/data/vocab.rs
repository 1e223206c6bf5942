// ============================================================
// Layer 4 — Global Vocabulary
// ============================================================
// Immutable word ↔ id mapping shared by every example.
//
// Id assignment:
//   0..=3   <s> <pad> </s> <unk>   (always, even if unseen)
//   4..     corpus words by descending count; equal counts keep
//           the order in which the scan first met them
//
// The vocabulary keeps EVERY word that survives the
// words_min_frequency cut. The model's vocab_size cap is applied
// later, at lookup time (`clamped_id`), so that unclamped ids are
// still available for copy-pointer bookkeeping.
//
// Persistence is owned by this type: save()/load() write a small
// JSON file listing words (and counts) in id order. Ids are never
// stored — they are the list positions, which keeps them
// contiguous by construction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::domain::example::TokenizedPair;
use crate::domain::specials::{is_reserved, RESERVED_WORDS, UNK_ID};
use crate::error::{KeyphraseError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    word_to_id: HashMap<String, usize>,
    id_to_word: Vec<String>,
    frequency:  HashMap<String, usize>,
}

/// On-disk layout: parallel lists in id order.
#[derive(Serialize, Deserialize)]
struct VocabularyFile {
    words:     Vec<String>,
    frequency: Vec<usize>,
}

impl Vocabulary {
    /// Count every source and keyphrase token and assign ids.
    /// Words seen fewer than `min_frequency` times are dropped.
    pub fn build(pairs: &[TokenizedPair], min_frequency: usize) -> Self {
        // Vec keeps first-seen order; the map only indexes into it
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut slot:   HashMap<String, usize> = HashMap::new();

        let tokens = pairs.iter().flat_map(|p| {
            p.source_tokens
                .iter()
                .chain(p.target_lists.iter().flatten())
        });

        for token in tokens {
            match slot.get(token) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    slot.insert(token.clone(), counts.len());
                    counts.push((token.clone(), 1));
                }
            }
        }

        counts.retain(|(w, c)| !is_reserved(w) && *c >= min_frequency);
        // sort_by is stable, so ties stay in first-seen order
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let vocab = Self::from_ranked(counts);
        tracing::info!(
            "Built vocabulary: {} words ({} corpus words, min_frequency={})",
            vocab.len(),
            vocab.len() - RESERVED_WORDS.len(),
            min_frequency,
        );
        vocab
    }

    /// Reserved words first, then `ranked` in the given order.
    fn from_ranked(ranked: Vec<(String, usize)>) -> Self {
        let mut id_to_word: Vec<String> = RESERVED_WORDS.iter().map(|w| w.to_string()).collect();
        let mut frequency = HashMap::new();

        for (word, count) in ranked {
            frequency.insert(word.clone(), count);
            id_to_word.push(word);
        }

        let word_to_id = id_to_word
            .iter()
            .enumerate()
            .map(|(id, w)| (w.clone(), id))
            .collect();

        Self { word_to_id, id_to_word, frequency }
    }

    pub fn len(&self) -> usize {
        self.id_to_word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_word.is_empty()
    }

    /// Exact lookup; None for unknown words.
    pub fn get(&self, word: &str) -> Option<usize> {
        self.word_to_id.get(word).copied()
    }

    /// Unclamped id; unknown words map to <unk>.
    pub fn id(&self, word: &str) -> usize {
        self.get(word).unwrap_or(UNK_ID)
    }

    /// Id as seen by a model whose output layer only has `cap`
    /// rows: anything at or beyond the cap becomes <unk>.
    pub fn clamped_id(&self, word: &str, cap: usize) -> usize {
        match self.get(word) {
            Some(id) if id < cap => id,
            _ => UNK_ID,
        }
    }

    pub fn word(&self, id: usize) -> Option<&str> {
        self.id_to_word.get(id).map(String::as_str)
    }

    /// Corpus count for a word (0 for reserved / unknown words).
    pub fn frequency(&self, word: &str) -> usize {
        self.frequency.get(word).copied().unwrap_or(0)
    }

    pub fn ids(&self, words: &[String]) -> Vec<usize> {
        words.iter().map(|w| self.id(w)).collect()
    }

    pub fn clamped_ids(&self, words: &[String], cap: usize) -> Vec<usize> {
        words.iter().map(|w| self.clamped_id(w, cap)).collect()
    }

    /// Map ids back to words; ids outside the table read as <unk>.
    pub fn words(&self, ids: &[usize]) -> Vec<String> {
        ids.iter()
            .map(|&id| self.word(id).unwrap_or(RESERVED_WORDS[UNK_ID]).to_string())
            .collect()
    }

    // ─── Persistence ──────────────────────────────────────────────────────────

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = VocabularyFile {
            words:     self.id_to_word.clone(),
            frequency: self.id_to_word.iter().map(|w| self.frequency(w)).collect(),
        };
        fs::write(path.as_ref(), serde_json::to_string(&file)?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        let file: VocabularyFile = serde_json::from_str(&json)?;

        if file.words.len() != file.frequency.len() {
            return Err(KeyphraseError::InvalidVocabulary(format!(
                "{} words but {} frequencies",
                file.words.len(),
                file.frequency.len()
            )));
        }
        if file.words.len() < RESERVED_WORDS.len()
            || file.words[..RESERVED_WORDS.len()] != RESERVED_WORDS
        {
            return Err(KeyphraseError::InvalidVocabulary(
                "reserved words missing from ids 0-3".to_string(),
            ));
        }

        let ranked: Vec<(String, usize)> = file
            .words
            .into_iter()
            .zip(file.frequency)
            .skip(RESERVED_WORDS.len())
            .collect();
        let expected = ranked.len() + RESERVED_WORDS.len();
        let vocab = Self::from_ranked(ranked);

        if vocab.word_to_id.len() != expected {
            return Err(KeyphraseError::InvalidVocabulary("duplicate words".to_string()));
        }
        Ok(vocab)
    }
}
