use burn::prelude::*;

use crate::domain::specials::RESERVED_WORDS;
use crate::error::{self, KeyphraseError};
use crate::ml::attention::{AttentionMethod, SourceMemory};
use crate::ml::decoder::{Decoder, DecoderConfig, DecoderState};
use crate::ml::embedding::{TokenEmbedding, TokenEmbeddingConfig};
use crate::ml::encoder::{Encoder, EncoderConfig};
use crate::ml::rollout::{DecodePolicy, Rollout, RolloutDriver};

// Persisted as model_config.json next to the weights; Config derives
// Clone and the serde impls itself.
#[derive(Config, Debug)]
pub struct Seq2SeqConfig {
    /// Size of the output vocabulary. Ids at or above it embed as <unk>.
    pub vocab_size:     usize,
    #[config(default = 150)]
    pub emb_dim:        usize,
    /// Per direction; encoder outputs are twice this wide.
    #[config(default = 300)]
    pub src_hidden_dim: usize,
    #[config(default = 300)]
    pub trg_hidden_dim: usize,
    #[config(default = 2)]
    pub src_layers:     usize,
    #[config(default = "AttentionMethod::Concat")]
    pub attention:      AttentionMethod,
    #[config(default = 0.0)]
    pub dropout:        f64,
}

impl Seq2SeqConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> error::Result<Seq2SeqModel<B>> {
        if self.vocab_size <= RESERVED_WORDS.len() {
            return Err(KeyphraseError::DimensionMismatch(format!(
                "vocab_size {} leaves no room beyond the {} reserved ids",
                self.vocab_size,
                RESERVED_WORDS.len()
            )));
        }

        let encoder_cfg = EncoderConfig::new(self.emb_dim, self.src_hidden_dim, self.trg_hidden_dim)
            .with_num_layers(self.src_layers)
            .with_dropout(self.dropout);
        let decoder_cfg = DecoderConfig::new(
            self.emb_dim,
            self.trg_hidden_dim,
            encoder_cfg.output_dim(),
            self.vocab_size,
        )
        .with_attention(self.attention);

        let embedding = TokenEmbeddingConfig::new(self.vocab_size, self.emb_dim).init(device);
        let encoder   = encoder_cfg.init(device)?;
        let decoder   = decoder_cfg.init(device)?;

        Ok(Seq2SeqModel { embedding, encoder, decoder })
    }
}

/// Attentional encoder–decoder sharing one embedding table
/// between source and target words.
#[derive(Module, Debug)]
pub struct Seq2SeqModel<B: Backend> {
    pub embedding: TokenEmbedding<B>,
    pub encoder:   Encoder<B>,
    pub decoder:   Decoder<B>,
}

pub struct Seq2SeqOutput<B: Backend> {
    /// [batch, trg_len, vocab_size]
    pub probs:     Tensor<B, 3>,
    pub states:    Vec<DecoderState<B>>,
    /// [batch, trg_len, src_len]
    pub attention: Tensor<B, 3>,
}

pub struct Generation<B: Backend> {
    /// [batch, horizon, k]
    pub top_ids:     Tensor<B, 3, Int>,
    /// [batch, horizon, k]
    pub top_probs:   Tensor<B, 3>,
    pub final_state: DecoderState<B>,
    /// [batch, horizon, src_len]
    pub attention:   Tensor<B, 3>,
}

impl<B: Backend> Seq2SeqModel<B> {
    /// Encode the source and build the decoder's starting state.
    /// src: [batch, src_len]; src_mask true for real tokens.
    pub fn encode(
        &self,
        src:      Tensor<B, 2, Int>,
        src_mask: Option<Tensor<B, 2, Bool>>,
    ) -> (SourceMemory<B>, DecoderState<B>) {
        let [batch, src_len] = src.dims();
        let encoded = if src_len == 0 {
            self.encoder.empty(batch, &src.device())
        } else {
            self.encoder.forward(self.embedding.forward(src))
        };

        let init = self.encoder.bridge(&encoded);
        (SourceMemory { outputs: encoded.outputs, mask: src_mask }, init)
    }

    /// Teacher-forced pass: one distribution per target position.
    pub fn forward(
        &self,
        src:      Tensor<B, 2, Int>,
        src_mask: Option<Tensor<B, 2, Bool>>,
        trg:      Tensor<B, 2, Int>,
    ) -> error::Result<Seq2SeqOutput<B>> {
        let rollout = self.rollout(src, src_mask, DecodePolicy::TeacherForced { targets: trg })?;
        Ok(Seq2SeqOutput { probs: rollout.probs, states: rollout.states, attention: rollout.attention })
    }

    /// Self-fed pass keeping the top `k` candidates of every step.
    pub fn generate(
        &self,
        src:      Tensor<B, 2, Int>,
        src_mask: Option<Tensor<B, 2, Bool>>,
        horizon:  usize,
        k:        usize,
    ) -> error::Result<Generation<B>> {
        let rollout = self.rollout(src, src_mask, DecodePolicy::SelfFed { horizon, k })?;
        Ok(Generation {
            top_ids:     rollout.top_ids,
            top_probs:   rollout.top_probs,
            final_state: rollout.final_state,
            attention:   rollout.attention,
        })
    }

    /// Argmax id per step, [batch, horizon].
    pub fn greedy_predict(
        &self,
        src:      Tensor<B, 2, Int>,
        src_mask: Option<Tensor<B, 2, Bool>>,
        horizon:  usize,
    ) -> error::Result<Tensor<B, 2, Int>> {
        let generation = self.generate(src, src_mask, horizon, 1)?;
        let [batch, steps, _] = generation.top_ids.dims();
        Ok(generation.top_ids.reshape([batch, steps]))
    }

    pub fn rollout(
        &self,
        src:      Tensor<B, 2, Int>,
        src_mask: Option<Tensor<B, 2, Bool>>,
        policy:   DecodePolicy<B>,
    ) -> error::Result<Rollout<B>> {
        let (memory, init) = self.encode(src, src_mask);
        RolloutDriver::new(&self.embedding, &self.decoder).run(policy, init, &memory)
    }

    pub fn vocab_size(&self) -> usize {
        self.decoder.vocab_size()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::batcher::{length_mask, KeyphraseBatcher};
    use crate::domain::example::KeyphraseExample;
    use burn::backend::NdArray;
    use burn::data::dataloader::batcher::Batcher;

    type TB = NdArray;

    fn small() -> Seq2SeqConfig {
        Seq2SeqConfig::new(12)
            .with_emb_dim(6)
            .with_src_hidden_dim(5)
            .with_trg_hidden_dim(7)
    }

    fn ids(values: &[i32], rows: usize) -> Tensor<TB, 2, Int> {
        let device = Default::default();
        Tensor::<TB, 1, Int>::from_ints(values, &device).reshape([rows, values.len() / rows])
    }

    #[test]
    fn test_forward_shapes() {
        let device = Default::default();
        let model = small().init::<TB>(&device).unwrap();

        // Second row padded after two tokens; id 40 is beyond the vocabulary.
        let src  = ids(&[4, 5, 40, 6, 7, 3, 1, 1], 2);
        let mask = length_mask::<TB>(&[4, 2], 4, &device);
        let trg  = ids(&[8, 9, 10, 11, 2, 1], 2);

        let out = model.forward(src, Some(mask), trg).unwrap();
        assert_eq!(out.probs.dims(), [2, 3, 12]);
        assert_eq!(out.states.len(), 3);
        assert_eq!(out.attention.dims(), [2, 3, 4]);

        let att: Vec<f32> = out.attention.into_data().to_vec::<f32>().unwrap();
        // row 1, every step: padded positions 2 and 3 get no weight
        for step in 0..3 {
            let base = 12 + step * 4;
            assert_eq!(att[base + 2], 0.0);
            assert_eq!(att[base + 3], 0.0);
        }
    }

    #[test]
    fn test_generate_and_greedy() {
        let device = Default::default();
        let model = small().init::<TB>(&device).unwrap();

        let generation = model.generate(ids(&[4, 5, 6], 1), None, 4, 3).unwrap();
        assert_eq!(generation.top_ids.dims(), [1, 4, 3]);
        assert_eq!(generation.top_probs.dims(), [1, 4, 3]);
        assert_eq!(generation.final_state.hidden.dims(), [1, 7]);

        let greedy = model.greedy_predict(ids(&[4, 5, 6], 1), None, 4).unwrap();
        assert_eq!(greedy.dims(), [1, 4]);

        let best: Vec<i64> = generation
            .top_ids
            .slice([0..1, 0..4, 0..1])
            .into_data()
            .convert::<i64>()
            .to_vec::<i64>()
            .unwrap();
        let argmax: Vec<i64> = greedy.into_data().convert::<i64>().to_vec::<i64>().unwrap();
        assert_eq!(best, argmax);
    }

    #[test]
    fn test_empty_source_still_generates() {
        let device = Default::default();
        let model = small().init::<TB>(&device).unwrap();
        let src = Tensor::<TB, 2, Int>::zeros([1, 0], &device);

        let generation = model.generate(src, None, 2, 1).unwrap();
        assert_eq!(generation.top_ids.dims(), [1, 2, 1]);
    }

    fn example(src: Vec<usize>, trg: Vec<usize>) -> KeyphraseExample {
        KeyphraseExample {
            src_all:   src.clone(),
            src_map:   (0..src.len()).collect(),
            src,
            trg_all:   trg.clone(),
            alignment: vec![0; trg.len()],
            copy_mask: vec![0; trg.len()],
            trg,
        }
    }

    #[test]
    fn test_batch_with_an_empty_source_row() {
        let device = Default::default();
        let model = small().init::<TB>(&device).unwrap();

        let batch: crate::data::batcher::KeyphraseBatch<TB> = KeyphraseBatcher::new().batch(
            vec![example(vec![4, 5, 6], vec![7, 8]), example(vec![], vec![9, 10])],
            &device,
        );
        let out = model.forward(batch.src, Some(batch.src_mask), batch.trg).unwrap();
        assert_eq!(out.attention.dims(), [2, 2, 3]);

        let probs: Vec<f32> = out.probs.into_data().to_vec::<f32>().unwrap();
        assert!(probs.iter().all(|p| p.is_finite()));

        let att: Vec<f32> = out.attention.into_data().to_vec::<f32>().unwrap();
        for step in 0..2 {
            let real: f32 = att[step * 3..step * 3 + 3].iter().sum();
            assert!((real - 1.0).abs() < 1e-5, "step {step}: {real}");

            let empty = &att[6 + step * 3..6 + step * 3 + 3];
            assert!(empty.iter().all(|&w| w == 0.0), "step {step}: {empty:?}");
        }
    }

    #[test]
    fn test_empty_source_forward() {
        let device = Default::default();
        let model = small().init::<TB>(&device).unwrap();
        let src = Tensor::<TB, 2, Int>::zeros([2, 0], &device);

        let out = model.forward(src, None, ids(&[8, 9, 10, 11], 2)).unwrap();
        assert_eq!(out.probs.dims(), [2, 2, 12]);
        assert_eq!(out.attention.dims(), [2, 2, 0]);
    }

    #[test]
    fn test_empty_target_rejected() {
        let device = Default::default();
        let model = small().init::<TB>(&device).unwrap();
        let trg = Tensor::<TB, 2, Int>::zeros([1, 0], &device);
        assert!(matches!(
            model.forward(ids(&[4, 5], 1), None, trg),
            Err(KeyphraseError::EmptyTarget)
        ));
    }

    #[test]
    fn test_config_validation() {
        let device = Default::default();
        assert!(Seq2SeqConfig::new(4).init::<TB>(&device).is_err());

        // Encoder output is 2 × 5 = 10 wide, decoder 7: dot attention cannot score that.
        let err = small()
            .with_attention(AttentionMethod::Dot)
            .init::<TB>(&device)
            .unwrap_err();
        assert!(matches!(err, KeyphraseError::DimensionMismatch(_)));

        let ok = Seq2SeqConfig::new(12)
            .with_emb_dim(4)
            .with_src_hidden_dim(3)
            .with_trg_hidden_dim(6)
            .with_attention(AttentionMethod::Dot)
            .init::<TB>(&device);
        assert!(ok.is_ok());
    }
}
