// ============================================================
// Layer 5 — Rollout Driver
// ============================================================
// Drives the single-step decoder along the time axis.
//
// Step 0 always consumes <s>. What step t+1 consumes depends
// on the policy chosen by the caller:
//
//   TeacherForced { targets }   the true target token t
//                               runs exactly targets.len steps
//
//   SelfFed { horizon, k }      the model's own top-1 at step t,
//                               while all k candidates are kept
//                               runs exactly `horizon` steps
//
// There is no end-of-sequence check: a self-fed rollout that
// predicts </s> keeps going until the horizon.
//
// Steps are strictly sequential; only the batch and hidden
// dimensions are parallel.

use burn::prelude::*;

use crate::domain::specials::BOS_ID;
use crate::error::{KeyphraseError, Result};
use crate::ml::attention::SourceMemory;
use crate::ml::decoder::{Decoder, DecoderState};
use crate::ml::embedding::TokenEmbedding;

#[derive(Debug, Clone)]
pub enum DecodePolicy<B: Backend> {
    /// targets: [batch, trg_len]
    TeacherForced { targets: Tensor<B, 2, Int> },
    SelfFed { horizon: usize, k: usize },
}

/// Everything a rollout produced, batch-major, T = number of steps.
#[derive(Debug, Clone)]
pub struct Rollout<B: Backend> {
    /// [batch, T, vocab_size]
    pub probs:       Tensor<B, 3>,
    /// Decoder state after each step.
    pub states:      Vec<DecoderState<B>>,
    /// [batch, T, src_len]
    pub attention:   Tensor<B, 3>,
    /// Token id consumed at each step, [batch, T]
    pub inputs:      Tensor<B, 2, Int>,
    /// [batch, T, k], best first (k = 1 under teacher forcing)
    pub top_ids:     Tensor<B, 3, Int>,
    /// [batch, T, k]
    pub top_probs:   Tensor<B, 3>,
    pub final_state: DecoderState<B>,
}

impl<B: Backend> Rollout<B> {
    pub fn steps(&self) -> usize {
        self.states.len()
    }
}

pub struct RolloutDriver<'m, B: Backend> {
    embedding: &'m TokenEmbedding<B>,
    decoder:   &'m Decoder<B>,
}

impl<'m, B: Backend> RolloutDriver<'m, B> {
    pub fn new(embedding: &'m TokenEmbedding<B>, decoder: &'m Decoder<B>) -> Self {
        Self { embedding, decoder }
    }

    pub fn run(
        &self,
        policy: DecodePolicy<B>,
        init:   DecoderState<B>,
        memory: &SourceMemory<B>,
    ) -> Result<Rollout<B>> {
        let [batch, _] = init.hidden.dims();
        let device = init.hidden.device();

        let (steps, k, targets) = match policy {
            DecodePolicy::TeacherForced { targets } => {
                let [trg_batch, trg_len] = targets.dims();
                if trg_len == 0 {
                    return Err(KeyphraseError::EmptyTarget);
                }
                if trg_batch != batch {
                    return Err(KeyphraseError::DimensionMismatch(format!(
                        "target batch {trg_batch} does not match decoder state batch {batch}"
                    )));
                }
                (trg_len, 1, Some(targets))
            }
            DecodePolicy::SelfFed { horizon, k } => {
                if horizon == 0 {
                    return Err(KeyphraseError::EmptyHorizon);
                }
                let vocab_size = self.decoder.vocab_size();
                if k == 0 || k > vocab_size {
                    return Err(KeyphraseError::InvalidTopK { k, vocab_size });
                }
                (horizon, k, None)
            }
        };

        let mut input = Tensor::<B, 1, Int>::full([batch], BOS_ID as i64, &device);
        let mut state = init;

        let mut probs     = Vec::with_capacity(steps);
        let mut states    = Vec::with_capacity(steps);
        let mut attention = Vec::with_capacity(steps);
        let mut inputs    = Vec::with_capacity(steps);
        let mut top_ids   = Vec::with_capacity(steps);
        let mut top_probs = Vec::with_capacity(steps);

        for t in 0..steps {
            let embedded = self.embedding.forward_step(input.clone());
            let out = self.decoder.step(embedded, state, memory);
            let (best_probs, best_ids) = out.probs.clone().topk_with_indices(k, 1);

            let next = match &targets {
                Some(trg) => trg.clone().slice([0..batch, t..t + 1]).reshape([batch]),
                None      => best_ids.clone().slice([0..batch, 0..1]).reshape([batch]),
            };

            inputs.push(input);
            probs.push(out.probs);
            attention.push(out.attention);
            top_ids.push(best_ids);
            top_probs.push(best_probs);
            states.push(out.state.clone());

            state = out.state;
            input = next;
        }

        tracing::debug!("Rollout finished after {} steps (batch {})", steps, batch);

        // stacking zero-width weights is not supported by every backend
        let [_, src_len, _] = memory.outputs.dims();
        let attention = if src_len == 0 {
            Tensor::zeros([batch, steps, 0], &device)
        } else {
            Tensor::stack::<3>(attention, 1)
        };

        Ok(Rollout {
            probs:       Tensor::stack::<3>(probs, 1),
            states,
            attention,
            inputs:      Tensor::stack::<2>(inputs, 1),
            top_ids:     Tensor::stack::<3>(top_ids, 1),
            top_probs:   Tensor::stack::<3>(top_probs, 1),
            final_state: state,
        })
    }
}
