// ============================================================
// Layer 5 — Bidirectional Source Encoder
// ============================================================
// Stacked BiLSTM over the embedded source.
//
//   embedded src [b, s, emb]
//        │
//        ▼  BiLstm × num_layers (dropout between layers)
//   outputs      [b, s, 2·hidden]     ← attended over by the decoder
//   final state  [b, 2·hidden]        ← [forward ; backward] of the top layer
//        │
//        ▼  bridge: tanh(Linear(·))
//   decoder initial hidden / cell [b, trg_hidden]
//
// A zero-length source has nothing to run over: outputs come
// back as [b, 0, 2·hidden] and the final state is all zeros.

use burn::{
    nn::{BiLstm, BiLstmConfig, Dropout, DropoutConfig, Linear, LinearConfig},
    prelude::*,
    tensor::activation::tanh,
};

use crate::error::{self, KeyphraseError};
use crate::ml::decoder::{zero_bias, DecoderState};

#[derive(Config, Debug)]
pub struct EncoderConfig {
    pub emb_dim:        usize,
    /// Hidden size of each direction.
    pub hidden_dim:     usize,
    pub trg_hidden_dim: usize,
    #[config(default = 2)]
    pub num_layers:     usize,
    #[config(default = 0.0)]
    pub dropout:        f64,
}

impl EncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> error::Result<Encoder<B>> {
        if self.num_layers == 0 {
            return Err(KeyphraseError::DimensionMismatch(
                "encoder needs at least one layer".into(),
            ));
        }

        let layers = (0..self.num_layers)
            .map(|l| {
                let d_input = if l == 0 { self.emb_dim } else { self.output_dim() };
                BiLstmConfig::new(d_input, self.hidden_dim, true).init(device)
            })
            .collect();

        let bridge_hidden = zero_bias(LinearConfig::new(self.output_dim(), self.trg_hidden_dim).init(device));
        let bridge_cell   = zero_bias(LinearConfig::new(self.output_dim(), self.trg_hidden_dim).init(device));
        let dropout       = DropoutConfig::new(self.dropout).init();

        Ok(Encoder { layers, bridge_hidden, bridge_cell, dropout, hidden_dim: self.hidden_dim })
    }

    /// Width of each encoder output vector (both directions).
    pub fn output_dim(&self) -> usize {
        2 * self.hidden_dim
    }
}

#[derive(Module, Debug)]
pub struct Encoder<B: Backend> {
    pub layers:        Vec<BiLstm<B>>,
    pub bridge_hidden: Linear<B>,
    pub bridge_cell:   Linear<B>,
    pub dropout:       Dropout,
    pub hidden_dim:    usize,
}

#[derive(Debug, Clone)]
pub struct EncoderOutput<B: Backend> {
    /// [batch, src_len, 2·hidden]
    pub outputs: Tensor<B, 3>,
    /// [batch, 2·hidden]
    pub hidden:  Tensor<B, 2>,
    /// [batch, 2·hidden]
    pub cell:    Tensor<B, 2>,
}

impl<B: Backend> Encoder<B> {
    pub fn forward(&self, embedded: Tensor<B, 3>) -> EncoderOutput<B> {
        let [batch, src_len, _] = embedded.dims();
        if src_len == 0 {
            return self.empty(batch, &embedded.device());
        }

        let mut x = embedded;
        let mut last = None;
        for (i, layer) in self.layers.iter().enumerate() {
            if i > 0 {
                x = self.dropout.forward(x);
            }
            let (out, state) = layer.forward(x, None);
            x = out;
            last = Some(state);
        }

        let h = self.hidden_dim;
        match last {
            Some(state) => EncoderOutput {
                outputs: x,
                hidden:  join_directions(state.hidden, batch, h),
                cell:    join_directions(state.cell, batch, h),
            },
            None => self.empty(batch, &x.device()),
        }
    }

    /// Outputs and final state for a batch of zero-length sources.
    pub fn empty(&self, batch: usize, device: &B::Device) -> EncoderOutput<B> {
        let width = 2 * self.hidden_dim;
        EncoderOutput {
            outputs: Tensor::zeros([batch, 0, width], device),
            hidden:  Tensor::zeros([batch, width], device),
            cell:    Tensor::zeros([batch, width], device),
        }
    }

    /// Project the encoder's final state into the decoder's initial state.
    pub fn bridge(&self, encoded: &EncoderOutput<B>) -> DecoderState<B> {
        DecoderState {
            hidden: tanh(self.bridge_hidden.forward(encoded.hidden.clone())),
            cell:   tanh(self.bridge_cell.forward(encoded.cell.clone())),
        }
    }
}

/// [2, batch, hidden] (forward, backward) → [batch, 2·hidden]
fn join_directions<B: Backend>(state: Tensor<B, 3>, batch: usize, hidden: usize) -> Tensor<B, 2> {
    let forward  = state.clone().slice([0..1, 0..batch, 0..hidden]).reshape([batch, hidden]);
    let backward = state.slice([1..2, 0..batch, 0..hidden]).reshape([batch, hidden]);
    Tensor::cat(vec![forward, backward], 1)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TB = NdArray;

    fn config() -> EncoderConfig {
        EncoderConfig::new(8, 5, 7)
    }

    #[test]
    fn test_output_shapes() {
        let device = Default::default();
        let encoder = config().init::<TB>(&device).unwrap();
        let out = encoder.forward(Tensor::random([3, 4, 8], burn::tensor::Distribution::Default, &device));

        assert_eq!(out.outputs.dims(), [3, 4, 10]);
        assert_eq!(out.hidden.dims(), [3, 10]);
        assert_eq!(out.cell.dims(), [3, 10]);

        let state = encoder.bridge(&out);
        assert_eq!(state.hidden.dims(), [3, 7]);
        assert_eq!(state.cell.dims(), [3, 7]);
    }

    #[test]
    fn test_single_layer() {
        let device = Default::default();
        let encoder = config().with_num_layers(1).init::<TB>(&device).unwrap();
        assert_eq!(encoder.layers.len(), 1);
        let out = encoder.forward(Tensor::zeros([1, 2, 8], &device));
        assert_eq!(out.outputs.dims(), [1, 2, 10]);
    }

    #[test]
    fn test_empty_source_gives_zero_state() {
        let device = Default::default();
        let encoder = config().init::<TB>(&device).unwrap();
        let out = encoder.forward(Tensor::zeros([2, 0, 8], &device));

        assert_eq!(out.outputs.dims(), [2, 0, 10]);
        let hidden: Vec<f32> = out.hidden.into_data().to_vec::<f32>().unwrap();
        assert!(hidden.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_bridge_biases_start_at_zero() {
        let device = Default::default();
        let encoder = config().init::<TB>(&device).unwrap();
        for bridge in [&encoder.bridge_hidden, &encoder.bridge_cell] {
            let bias: Vec<f32> = bridge
                .bias
                .as_ref()
                .map(|b| b.val().into_data().to_vec::<f32>().unwrap())
                .unwrap();
            assert_eq!(bias, vec![0.0; 7]);
        }
    }

    #[test]
    fn test_zero_layers_rejected() {
        let device = Default::default();
        let err = config().with_num_layers(0).init::<TB>(&device).unwrap_err();
        assert!(matches!(err, KeyphraseError::DimensionMismatch(_)));
    }
}
