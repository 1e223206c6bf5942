// ============================================================
// Layer 4 — Example Builder & Dataset
// ============================================================
// Converts TokenizedPairs into id-level examples and exposes
// them through Burn's Dataset trait.
//
// For every document:
//   src_all  = vocab ids, unknown → <unk>
//   src      = same, but ids ≥ vocab_size → <unk>
//   src_map  = DynamicVocabulary over the source tokens
// and for every keyphrase:
//   trg_all / trg       as above
//   alignment/copy_mask from the same DynamicVocabulary
//
// The dynamic vocabulary is built once per document and shared
// by all of its keyphrases.

use burn::data::dataset::Dataset;

use crate::data::dynamic_vocab::DynamicVocabulary;
use crate::data::vocab::Vocabulary;
use crate::domain::example::{KeyphraseExample, One2ManyExample, TokenizedPair};

pub struct ExampleBuilder<'v> {
    vocab:      &'v Vocabulary,
    vocab_size: usize,
}

impl<'v> ExampleBuilder<'v> {
    /// `vocab_size` is the model's output size; ids at or above
    /// it are clamped to <unk> in `src` / `trg` and used as the
    /// offset of the copy pointers.
    pub fn new(vocab: &'v Vocabulary, vocab_size: usize) -> Self {
        Self { vocab, vocab_size }
    }

    /// All keyphrases of one document in one record.
    pub fn one2many(&self, pair: &TokenizedPair) -> One2ManyExample {
        let source = &pair.source_tokens;
        let dyn_vocab = DynamicVocabulary::build(source);

        let mut ex = One2ManyExample {
            src_str:   source.clone(),
            trg_str:   pair.target_lists.clone(),
            src_all:   self.vocab.ids(source),
            src:       self.vocab.clamped_ids(source, self.vocab_size),
            trg_all:   Vec::with_capacity(pair.target_lists.len()),
            trg:       Vec::with_capacity(pair.target_lists.len()),
            src_map:   dyn_vocab.src_map().to_vec(),
            alignment: Vec::with_capacity(pair.target_lists.len()),
            copy_mask: Vec::with_capacity(pair.target_lists.len()),
        };

        for target in &pair.target_lists {
            let aligned = dyn_vocab.align(target, self.vocab_size);
            ex.trg_all.push(self.vocab.ids(target));
            ex.trg.push(self.vocab.clamped_ids(target, self.vocab_size));
            ex.alignment.push(aligned.alignment);
            ex.copy_mask.push(aligned.copy_mask);
        }

        ex
    }

    /// One example per keyphrase, each repeating the source data.
    pub fn one2one(&self, pair: &TokenizedPair) -> Vec<KeyphraseExample> {
        self.one2many(pair).into_one2one()
    }

    pub fn build_one2many(&self, pairs: &[TokenizedPair]) -> Vec<One2ManyExample> {
        pairs
            .iter()
            .enumerate()
            .map(|(idx, pair)| {
                let ex = self.one2many(pair);
                if idx % 2000 == 0 {
                    tracing::debug!(
                        "one2many #{}: src_map={:?} copy_mask={:?}",
                        idx,
                        ex.src_map,
                        ex.copy_mask
                    );
                }
                ex
            })
            .collect()
    }

    pub fn build_one2one(&self, pairs: &[TokenizedPair]) -> Vec<KeyphraseExample> {
        pairs.iter().flat_map(|pair| self.one2one(pair)).collect()
    }
}

// ─── KeyphraseDataset ─────────────────────────────────────────────────────────
pub struct KeyphraseDataset {
    examples: Vec<KeyphraseExample>,
}

impl KeyphraseDataset {
    pub fn new(examples: Vec<KeyphraseExample>) -> Self {
        Self { examples }
    }
}

impl Dataset<KeyphraseExample> for KeyphraseDataset {
    fn get(&self, index: usize) -> Option<KeyphraseExample> {
        self.examples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.examples.len()
    }
}
