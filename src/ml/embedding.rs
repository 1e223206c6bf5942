// ============================================================
// Layer 5 — Token Embedding
// ============================================================
// One embedding table shared by the encoder (source words) and
// the decoder (previous output word).
//
// Ids at or above the table size cannot be looked up; they are
// redirected to the <unk> row instead of failing. This lets the
// unclamped src_all / trg_all ids be fed in directly.
//
// Rows are initialised uniformly in [-0.1, 0.1].

use burn::{
    nn::{Embedding, EmbeddingConfig, Initializer},
    prelude::*,
};

use crate::domain::specials::UNK_ID;

#[derive(Config, Debug)]
pub struct TokenEmbeddingConfig {
    pub vocab_size: usize,
    pub emb_dim:    usize,
}

impl TokenEmbeddingConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TokenEmbedding<B> {
        let embedding = EmbeddingConfig::new(self.vocab_size, self.emb_dim)
            .with_initializer(Initializer::Uniform { min: -0.1, max: 0.1 })
            .init(device);
        TokenEmbedding { embedding, vocab_size: self.vocab_size }
    }
}

#[derive(Module, Debug)]
pub struct TokenEmbedding<B: Backend> {
    pub embedding:  Embedding<B>,
    pub vocab_size: usize,
}

impl<B: Backend> TokenEmbedding<B> {
    /// ids: [batch, seq_len] → [batch, seq_len, emb_dim]
    pub fn forward(&self, ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let oov = ids.clone().greater_equal_elem(self.vocab_size as i64);
        let ids = ids.mask_fill(oov, UNK_ID as i64);
        self.embedding.forward(ids)
    }

    /// ids: [batch] → [batch, emb_dim], one decoder input step.
    pub fn forward_step(&self, ids: Tensor<B, 1, Int>) -> Tensor<B, 2> {
        let [batch] = ids.dims();
        let emb = self.forward(ids.reshape([batch, 1]));
        let [_, _, emb_dim] = emb.dims();
        emb.reshape([batch, emb_dim])
    }

    pub fn emb_dim(&self) -> usize {
        self.embedding.weight.dims()[1]
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TB = NdArray;

    #[test]
    fn test_out_of_vocab_reads_unk_row() {
        let device = Default::default();
        let emb = TokenEmbeddingConfig::new(10, 4).init::<TB>(&device);

        let ids = Tensor::<TB, 1, Int>::from_ints([UNK_ID as i32, 10, 57], &device).reshape([1, 3]);
        let out = emb.forward(ids);
        assert_eq!(out.dims(), [1, 3, 4]);

        let unk = out.clone().slice([0..1, 0..1, 0..4]);
        let oov = out.clone().slice([0..1, 1..2, 0..4]);
        let far = out.slice([0..1, 2..3, 0..4]);
        unk.to_data().assert_eq(&oov.to_data(), true);
        unk.to_data().assert_eq(&far.to_data(), true);
    }

    #[test]
    fn test_step_shape() {
        let device = Default::default();
        let emb = TokenEmbeddingConfig::new(10, 6).init::<TB>(&device);
        let ids = Tensor::<TB, 1, Int>::from_ints([0, 1, 2], &device);
        assert_eq!(emb.forward_step(ids).dims(), [3, 6]);
        assert_eq!(emb.emb_dim(), 6);
    }
}
