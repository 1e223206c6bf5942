// ============================================================
// Layer 3 — Reserved Tokens
// ============================================================
// The first four vocabulary ids are fixed no matter what the
// corpus contains:
//
//   0  <s>     start of sequence (first decoder input)
//   1  <pad>   padding
//   2  </s>    end of sequence
//   3  <unk>   anything outside the (capped) vocabulary
//
// <digit> is not reserved — it is an ordinary word that the
// tokenizer substitutes for every all-digit token.

pub const BOS_WORD: &str = "<s>";
pub const PAD_WORD: &str = "<pad>";
pub const EOS_WORD: &str = "</s>";
pub const UNK_WORD: &str = "<unk>";
pub const DIGIT_WORD: &str = "<digit>";

pub const BOS_ID: usize = 0;
pub const PAD_ID: usize = 1;
pub const EOS_ID: usize = 2;
pub const UNK_ID: usize = 3;

/// Reserved words in id order.
pub const RESERVED_WORDS: [&str; 4] = [BOS_WORD, PAD_WORD, EOS_WORD, UNK_WORD];

/// True for the four words that always own ids 0–3.
pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(&word)
}
