// ============================================================
// Layer 4 — Tokenize & Filter
// ============================================================
// Turns RawPairs into TokenizedPairs and removes keyphrases
// (and optionally whole documents) that would only add noise.
//
// Per document:
//   - optional lowercasing
//   - tokenise, then truncate to src_seq_length_trunc tokens
//   - min/max source length → document flagged
//
// Per keyphrase:
//   FILTER 1  strip "(...)", "[...]", "{...}"  (acronyms etc.)
//   FILTER 2  drop phrases still holding odd punctuation
//             — always applied, the data is very dirty
//   FILTER 3  truncate / min / max target length; a phrase
//             with no tokens left is always dropped
//   FILTER 4  drop long phrases (>5 tokens) where fewer than
//             half the tokens are distinct
//
// Flags from FILTER 3/4 and the source bounds only discard
// anything when `valid_check` is on; otherwise the pair is
// kept as-is.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::example::{RawPair, TokenizedPair};
use crate::domain::traits::Tokenize;
use crate::error::Result;

/// Phrases longer than this are checked for token repetition.
const HEURISTIC_MIN_LEN: usize = 5;

/// Length limits and normalisation switches. A zero limit is
/// treated as "no limit".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    pub lower:                bool,
    pub src_seq_length_trunc: usize,
    pub trg_seq_length_trunc: usize,
    pub min_src_seq_length:   usize,
    pub max_src_seq_length:   usize,
    pub min_trg_seq_length:   usize,
    pub max_trg_seq_length:   usize,
}

pub struct PairFilter<'t, T: Tokenize> {
    tokenizer: &'t T,
    opts:      FilterOptions,
    brackets:  [Regex; 3],
    bad_punct: Regex,
}

impl<'t, T: Tokenize> PairFilter<'t, T> {
    pub fn new(tokenizer: &'t T, opts: FilterOptions) -> Result<Self> {
        Ok(Self {
            tokenizer,
            opts,
            brackets: [
                Regex::new(r"\(.*?\)")?,
                Regex::new(r"\[.*?\]")?,
                Regex::new(r"\{.*?\}")?,
            ],
            bad_punct: Regex::new(r#"[,_"<>\(\)\{\}\[\]\?~`!@\$%\^=]"#)?,
        })
    }

    /// Tokenise and filter every pair. With `valid_check` off,
    /// only FILTER 2 removes anything.
    pub fn apply(&self, pairs: &[RawPair], valid_check: bool) -> Vec<TokenizedPair> {
        let mut out = Vec::with_capacity(pairs.len());

        for (idx, pair) in pairs.iter().enumerate() {
            let source = self.normalise(&pair.source);
            let mut source_tokens = self.tokenizer.tokenize(&source);
            truncate(&mut source_tokens, self.opts.src_seq_length_trunc);

            let src_flagged = out_of_bounds(
                source_tokens.len(),
                self.opts.min_src_seq_length,
                self.opts.max_src_seq_length,
            );
            if valid_check && src_flagged {
                tracing::debug!("Dropping document {} (source length {})", idx, source_tokens.len());
                continue;
            }

            let target_lists: Vec<Vec<String>> = pair
                .targets
                .iter()
                .filter_map(|t| self.filter_target(t, valid_check))
                .collect();

            if idx % 2000 == 0 {
                tracing::debug!(
                    "tokenize_filter #{}: {} source tokens, {} of {} keyphrases kept",
                    idx,
                    source_tokens.len(),
                    target_lists.len(),
                    pair.targets.len(),
                );
            }

            out.push(TokenizedPair::new(source_tokens, target_lists));
        }

        out
    }

    fn filter_target(&self, target: &str, valid_check: bool) -> Option<Vec<String>> {
        let mut trg = self.normalise(target);

        // FILTER 1
        for re in &self.brackets {
            trg = re.replace_all(&trg, "").into_owned();
        }

        // FILTER 2
        if self.bad_punct.is_match(&trg) {
            tracing::debug!("Dropping keyphrase with punctuation: {:?}", trg);
            return None;
        }

        // FILTER 3
        let mut tokens = self.tokenizer.tokenize(&trg);
        if tokens.is_empty() {
            return None;
        }
        truncate(&mut tokens, self.opts.trg_seq_length_trunc);
        let len_flagged = out_of_bounds(
            tokens.len(),
            self.opts.min_trg_seq_length,
            self.opts.max_trg_seq_length,
        );

        // FILTER 4
        let repetitive = is_repetitive(&tokens);

        if valid_check && (len_flagged || repetitive) {
            tracing::debug!(
                "Dropping keyphrase {:?} (length {}, repetitive={})",
                trg,
                tokens.len(),
                repetitive
            );
            return None;
        }

        Some(tokens)
    }

    fn normalise(&self, text: &str) -> String {
        if self.opts.lower {
            text.to_lowercase()
        } else {
            text.to_string()
        }
    }
}

fn truncate(tokens: &mut Vec<String>, limit: usize) {
    if limit > 0 {
        tokens.truncate(limit);
    }
}

fn out_of_bounds(len: usize, min: usize, max: usize) -> bool {
    (max > 0 && len > max) || (min > 0 && len < min)
}

/// More than 5 tokens and fewer than half of them distinct.
fn is_repetitive(tokens: &[String]) -> bool {
    if tokens.len() <= HEURISTIC_MIN_LEN {
        return false;
    }
    let distinct: HashSet<&String> = tokens.iter().collect();
    distinct.len() * 2 < tokens.len()
}
