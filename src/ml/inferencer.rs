// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Loads a checkpoint and turns raw text into keyphrase
// candidates:
//
//   text → CopySeqTokenizer → Vocabulary ids (capped at the
//   model's vocab_size) → generate(horizon, k) → words
//
// Output is one Vec<Candidate> per decoding step, best first.

use anyhow::{anyhow, Result};
use burn::prelude::*;

use crate::data::{tokenizer::CopySeqTokenizer, vocab::Vocabulary};
use crate::domain::specials::UNK_WORD;
use crate::domain::traits::Tokenize;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::Seq2SeqModel;

pub type InferBackend = burn::backend::Wgpu;

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id:   usize,
    pub word: String,
    pub prob: f32,
}

pub struct Inferencer<B: Backend = InferBackend> {
    model:      Seq2SeqModel<B>,
    vocab_size: usize,
    lower:      bool,
    tokenizer:  CopySeqTokenizer,
    device:     B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, lower: bool, device: B::Device) -> Result<Self> {
        let (cfg, model) = ckpt_manager.restore::<B>(&device)?;
        Self::new(model, cfg.vocab_size, lower, device)
    }

    pub fn new(model: Seq2SeqModel<B>, vocab_size: usize, lower: bool, device: B::Device) -> Result<Self> {
        let tokenizer = CopySeqTokenizer::new()?;
        Ok(Self { model, vocab_size, lower, tokenizer, device })
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        if self.lower {
            self.tokenizer.tokenize(&text.to_lowercase())
        } else {
            self.tokenizer.tokenize(text)
        }
    }

    pub fn predict(
        &self,
        text:    &str,
        vocab:   &Vocabulary,
        horizon: usize,
        k:       usize,
    ) -> Result<Vec<Vec<Candidate>>> {
        let tokens = self.tokenize(text);
        let ids: Vec<i32> = vocab
            .clamped_ids(&tokens, self.vocab_size)
            .into_iter()
            .map(|id| id as i32)
            .collect();
        tracing::debug!("Source: {} tokens, ids={:?}", tokens.len(), ids);

        let src = Tensor::<B, 1, Int>::from_ints(ids.as_slice(), &self.device).reshape([1, ids.len()]);
        let generation = self.model.generate(src, None, horizon, k)?;

        let top_ids: Vec<i64> = generation
            .top_ids
            .into_data()
            .convert::<i64>()
            .to_vec::<i64>()
            .map_err(|e| anyhow!("Cannot read predicted ids: {e:?}"))?;
        let top_probs: Vec<f32> = generation
            .top_probs
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("Cannot read predicted probabilities: {e:?}"))?;

        let steps = top_ids
            .chunks(k)
            .zip(top_probs.chunks(k))
            .map(|(ids, probs)| {
                ids.iter()
                    .zip(probs)
                    .map(|(&id, &prob)| {
                        let id = id as usize;
                        let word = vocab.word(id).unwrap_or(UNK_WORD).to_string();
                        Candidate { id, word, prob }
                    })
                    .collect()
            })
            .collect();

        Ok(steps)
    }
}
