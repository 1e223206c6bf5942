// ============================================================
// Layer 4 — CopySeq Tokenizer
// ============================================================
// Word-level tokenizer used for both documents and keyphrases.
//
// Steps (applied in order):
//   1. Line breaks and tabs become spaces
//   2. The punctuation  _ < > , ( ) . ' %  is padded with
//      spaces so each mark becomes its own token
//   3. Split on every character that is NOT a letter, digit
//      or one of  _ < > , # & + * ( ) . ' %
//      (so "c++" and "r&d" stay whole words)
//   4. Drop empty pieces
//   5. Every all-digit token becomes <digit>
//
// Example:
//   "Deep nets (DNN) in 2017."
//   → ["Deep", "nets", "(", "DNN", ")", "in", "<digit>", "."]
//
// The regexes are compiled once in new() and reused.

use regex::Regex;

use crate::domain::specials::DIGIT_WORD;
use crate::domain::traits::Tokenize;
use crate::error::Result;

pub struct CopySeqTokenizer {
    line_breaks: Regex,
    padded_punct: Regex,
    separators: Regex,
    digits: Regex,
}

impl CopySeqTokenizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            line_breaks:  Regex::new(r"[\r\n\t]")?,
            padded_punct: Regex::new(r"[_<>,\(\)\.'%]")?,
            separators:   Regex::new(r"[^a-zA-Z0-9_<>,#&\+\*\(\)\.'%]")?,
            digits:       Regex::new(r"^\d+$")?,
        })
    }
}

impl Tokenize for CopySeqTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let text = self.line_breaks.replace_all(text, " ");
        let text = self.padded_punct.replace_all(&text, " $0 ");

        self.separators
            .split(&text)
            .filter(|w| !w.is_empty())
            .map(|w| {
                if self.digits.is_match(w) {
                    DIGIT_WORD.to_string()
                } else {
                    w.to_string()
                }
            })
            .collect()
    }
}
