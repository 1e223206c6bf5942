// ============================================================
// Layer 5 — Single-Step Attentional Decoder
// ============================================================
// One transition of the decoder state machine:
//
//   (hidden, cell), embedding of the last token
//        │
//        ▼  Lstm cell, sequence length 1
//   (hidden', cell')
//        │
//        ▼  AttentionScorer against the source memory
//   h_tilde
//        │
//        ▼  Linear → vocab_size, softmax
//   distribution over the output vocabulary
//
// The decoder never loops; RolloutDriver owns the time axis.

use burn::{
    module::Param,
    nn::{Linear, LinearConfig, Lstm, LstmConfig, LstmState},
    prelude::*,
    tensor::activation::softmax,
};

use crate::error;
use crate::ml::attention::{AttentionConfig, AttentionMethod, AttentionScorer, SourceMemory};

#[derive(Config, Debug)]
pub struct DecoderConfig {
    pub emb_dim:    usize,
    pub hidden_dim: usize,
    /// Width of the encoder outputs being attended over.
    pub enc_dim:    usize,
    pub vocab_size: usize,
    #[config(default = "AttentionMethod::Concat")]
    pub attention:  AttentionMethod,
}

impl DecoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> error::Result<Decoder<B>> {
        let attention = AttentionConfig::new(self.enc_dim, self.hidden_dim)
            .with_method(self.attention)
            .init(device)?;
        let cell    = LstmConfig::new(self.emb_dim, self.hidden_dim, true).init(device);
        let readout = zero_bias(LinearConfig::new(self.hidden_dim, self.vocab_size).init(device));
        Ok(Decoder { cell, attention, readout })
    }
}

/// Replace a freshly initialised bias with zeros; the weights keep
/// their random start.
pub(crate) fn zero_bias<B: Backend>(mut linear: Linear<B>) -> Linear<B> {
    let [_, d_output] = linear.weight.dims();
    let device = linear.weight.device();
    linear.bias = Some(Param::from_tensor(Tensor::zeros([d_output], &device)));
    linear
}

#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    pub cell:      Lstm<B>,
    pub attention: AttentionScorer<B>,
    pub readout:   Linear<B>,
}

/// Recurrent state carried between steps, each [batch, hidden].
#[derive(Debug, Clone)]
pub struct DecoderState<B: Backend> {
    pub hidden: Tensor<B, 2>,
    pub cell:   Tensor<B, 2>,
}

#[derive(Debug, Clone)]
pub struct DecoderStep<B: Backend> {
    pub state:     DecoderState<B>,
    /// [batch, hidden]
    pub h_tilde:   Tensor<B, 2>,
    /// [batch, vocab_size]
    pub probs:     Tensor<B, 2>,
    /// [batch, src_len]
    pub attention: Tensor<B, 2>,
}

impl<B: Backend> Decoder<B> {
    /// input: embedding of the previous token, [batch, emb_dim]
    pub fn step(
        &self,
        input:  Tensor<B, 2>,
        state:  DecoderState<B>,
        memory: &SourceMemory<B>,
    ) -> DecoderStep<B> {
        let [batch, emb_dim] = input.dims();
        let prior = LstmState { cell: state.cell, hidden: state.hidden };
        let (_, next) = self.cell.forward(input.reshape([batch, 1, emb_dim]), Some(prior));

        let attended = self.attention.forward(next.hidden.clone(), memory);
        let probs = softmax(self.readout.forward(attended.h_tilde.clone()), 1);

        DecoderStep {
            state:     DecoderState { hidden: next.hidden, cell: next.cell },
            h_tilde:   attended.h_tilde,
            probs,
            attention: attended.weights,
        }
    }

    pub fn vocab_size(&self) -> usize {
        self.readout.weight.dims()[1]
    }
}
