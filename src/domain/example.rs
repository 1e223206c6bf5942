// ============================================================
// Layer 3 — Keyphrase Example Types
// ============================================================
// One document with its gold keyphrases moves through three
// shapes on its way to the model:
//
//   RawPair        source text + keyphrase strings (from disk)
//   TokenizedPair  source tokens + one token list per keyphrase
//   *Example       id sequences + copy-pointer data
//
// Two example layouts exist:
//   - one2one:  each keyphrase is its own example, the source
//               ids are repeated for every keyphrase
//   - one2many: one example per document holding every
//               keyphrase of that document
//
// Field glossary for the id data:
//   src_all / trg_all  raw vocabulary ids (may be ≥ vocab_size)
//   src / trg          ids clamped to vocab_size (<unk> above)
//   src_map            per-source-position local (dynamic) id
//   alignment          per-target-position local id, 0 if absent
//   copy_mask          vocab_size + first source offset, 0 if absent

use serde::{Deserialize, Serialize};

/// A document as read from the corpus, before tokenisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPair {
    pub source:  String,
    pub targets: Vec<String>,
}

impl RawPair {
    pub fn new(source: impl Into<String>, targets: Vec<String>) -> Self {
        Self { source: source.into(), targets }
    }
}

/// A document after tokenisation and filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenizedPair {
    pub source_tokens: Vec<String>,
    pub target_lists:  Vec<Vec<String>>,
}

impl TokenizedPair {
    pub fn new(source_tokens: Vec<String>, target_lists: Vec<Vec<String>>) -> Self {
        Self { source_tokens, target_lists }
    }
}

/// One (source, keyphrase) training / inference item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyphraseExample {
    pub src_all:   Vec<usize>,
    pub src:       Vec<usize>,
    pub trg_all:   Vec<usize>,
    pub trg:       Vec<usize>,
    pub src_map:   Vec<usize>,
    pub alignment: Vec<usize>,
    pub copy_mask: Vec<usize>,
}

impl KeyphraseExample {
    pub fn src_len(&self) -> usize {
        self.src.len()
    }

    pub fn trg_len(&self) -> usize {
        self.trg.len()
    }
}

/// All keyphrases of one document in a single record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct One2ManyExample {
    pub src_str:   Vec<String>,
    pub trg_str:   Vec<Vec<String>>,
    pub src_all:   Vec<usize>,
    pub src:       Vec<usize>,
    pub trg_all:   Vec<Vec<usize>>,
    pub trg:       Vec<Vec<usize>>,
    pub src_map:   Vec<usize>,
    pub alignment: Vec<Vec<usize>>,
    pub copy_mask: Vec<Vec<usize>>,
}

impl One2ManyExample {
    /// Split into one2one examples, one per keyphrase.
    pub fn into_one2one(self) -> Vec<KeyphraseExample> {
        let Self { src_all, src, trg_all, trg, src_map, alignment, copy_mask, .. } = self;
        trg_all
            .into_iter()
            .zip(trg)
            .zip(alignment)
            .zip(copy_mask)
            .map(|(((trg_all, trg), alignment), copy_mask)| KeyphraseExample {
                src_all:   src_all.clone(),
                src:       src.clone(),
                trg_all,
                trg,
                src_map:   src_map.clone(),
                alignment,
                copy_mask,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_one2one_shares_source() {
        let many = One2ManyExample {
            src_str:   vec!["a".into(), "b".into()],
            trg_str:   vec![vec!["a".into()], vec!["c".into()]],
            src_all:   vec![4, 5],
            src:       vec![4, 5],
            trg_all:   vec![vec![4], vec![6]],
            trg:       vec![vec![4], vec![3]],
            src_map:   vec![0, 1],
            alignment: vec![vec![0], vec![0]],
            copy_mask: vec![vec![10], vec![0]],
        };

        let ones = many.into_one2one();
        assert_eq!(ones.len(), 2);
        assert_eq!(ones[0].src, ones[1].src);
        assert_eq!(ones[0].copy_mask, vec![10]);
        assert_eq!(ones[1].trg, vec![3]);
        assert_eq!(ones[1].trg_all, vec![6]);
    }
}
