// ============================================================
// Layer 5 — Attention Scorer
// ============================================================
// Given the decoder hidden state h [b, d] and encoder outputs
// e [b, s, n], produce a distribution over source positions
// and the attended representation fed to the output layer.
//
//   score_i  = one of
//                dot      h · e_i                 (needs n == d)
//                general  h · (W e_i)
//                concat   v · tanh(W [h ; e_i])   (default)
//   weights  = softmax(score)      padding positions → exactly 0,
//                                  all-padding rows → all 0
//   context  = Σ_i weights_i · e_i                [b, n]
//   h_tilde  = tanh(W_out [context ; h])          [b, d]
//
// The scoring strategy is fixed when the scorer is built: it is
// whichever parameter set (none, `general`, `concat`) exists.

use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
    tensor::activation::{softmax, tanh},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{self, KeyphraseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttentionMethod {
    Dot,
    General,
    #[default]
    Concat,
}

impl fmt::Display for AttentionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dot     => "dot",
            Self::General => "general",
            Self::Concat  => "concat",
        };
        f.write_str(name)
    }
}

impl FromStr for AttentionMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dot"     => Ok(Self::Dot),
            "general" => Ok(Self::General),
            "concat"  => Ok(Self::Concat),
            other     => Err(format!("unknown attention method '{other}' (dot | general | concat)")),
        }
    }
}

#[derive(Config, Debug)]
pub struct AttentionConfig {
    /// Width of each encoder output vector.
    pub enc_dim: usize,
    /// Width of the decoder hidden state.
    pub dec_dim: usize,
    #[config(default = "AttentionMethod::Concat")]
    pub method:  AttentionMethod,
}

impl AttentionConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> error::Result<AttentionScorer<B>> {
        let (general, concat) = match self.method {
            AttentionMethod::Dot => {
                if self.enc_dim != self.dec_dim {
                    return Err(KeyphraseError::DimensionMismatch(format!(
                        "dot attention needs equal widths, encoder is {} and decoder is {}",
                        self.enc_dim, self.dec_dim
                    )));
                }
                (None, None)
            }
            AttentionMethod::General => {
                let proj = LinearConfig::new(self.enc_dim, self.dec_dim)
                    .with_bias(false)
                    .init(device);
                (Some(proj), None)
            }
            AttentionMethod::Concat => {
                let attn = LinearConfig::new(self.dec_dim + self.enc_dim, self.dec_dim).init(device);
                let v    = LinearConfig::new(self.dec_dim, 1).with_bias(false).init(device);
                (None, Some(ConcatScore { attn, v }))
            }
        };

        let linear_out = LinearConfig::new(self.enc_dim + self.dec_dim, self.dec_dim)
            .with_bias(false)
            .init(device);

        Ok(AttentionScorer { general, concat, linear_out })
    }
}

#[derive(Module, Debug)]
pub struct ConcatScore<B: Backend> {
    pub attn: Linear<B>,
    pub v:    Linear<B>,
}

#[derive(Module, Debug)]
pub struct AttentionScorer<B: Backend> {
    pub general:    Option<Linear<B>>,
    pub concat:     Option<ConcatScore<B>>,
    pub linear_out: Linear<B>,
}

/// What the decoder attends over: encoder outputs plus the
/// source padding mask (true = real token).
#[derive(Debug, Clone)]
pub struct SourceMemory<B: Backend> {
    pub outputs: Tensor<B, 3>,
    pub mask:    Option<Tensor<B, 2, Bool>>,
}

#[derive(Debug, Clone)]
pub struct AttentionOutput<B: Backend> {
    /// [batch, dec_dim]
    pub h_tilde: Tensor<B, 2>,
    /// [batch, enc_dim]
    pub context: Tensor<B, 2>,
    /// [batch, src_len]
    pub weights: Tensor<B, 2>,
}

enum Strategy<'a, B: Backend> {
    Dot,
    General(&'a Linear<B>),
    Concat(&'a ConcatScore<B>),
}

impl<B: Backend> AttentionScorer<B> {
    fn strategy(&self) -> Strategy<'_, B> {
        match (&self.general, &self.concat) {
            (_, Some(concat))     => Strategy::Concat(concat),
            (Some(general), None) => Strategy::General(general),
            (None, None)          => Strategy::Dot,
        }
    }

    pub fn method(&self) -> AttentionMethod {
        match self.strategy() {
            Strategy::Dot        => AttentionMethod::Dot,
            Strategy::General(_) => AttentionMethod::General,
            Strategy::Concat(_)  => AttentionMethod::Concat,
        }
    }

    /// hidden: [batch, dec_dim]
    pub fn forward(&self, hidden: Tensor<B, 2>, memory: &SourceMemory<B>) -> AttentionOutput<B> {
        let [batch, src_len, enc_dim] = memory.outputs.dims();
        let device = hidden.device();

        let (context, weights) = if src_len == 0 {
            (Tensor::zeros([batch, enc_dim], &device), Tensor::zeros([batch, 0], &device))
        } else {
            let scores = self.score(hidden.clone(), memory.outputs.clone());
            let scores = match &memory.mask {
                Some(mask) => scores.mask_fill(mask.clone().bool_not(), f32::NEG_INFINITY),
                None       => scores,
            };
            let weights = softmax(scores, 1);
            // a row with no real position softmaxes to NaN; it attends to nothing
            let weights = match &memory.mask {
                Some(mask) => weights.mask_fill(mask.clone().bool_not(), 0.0),
                None       => weights,
            };

            // [b, 1, s] × [b, s, n] → [b, 1, n]
            let context = weights
                .clone()
                .unsqueeze_dim::<3>(1)
                .matmul(memory.outputs.clone())
                .reshape([batch, enc_dim]);
            (context, weights)
        };

        let h_tilde = tanh(self.linear_out.forward(Tensor::cat(vec![context.clone(), hidden], 1)));
        AttentionOutput { h_tilde, context, weights }
    }

    /// Raw scores [batch, src_len].
    fn score(&self, hidden: Tensor<B, 2>, outputs: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch, src_len, _] = outputs.dims();
        let [_, dec_dim] = hidden.dims();

        let scores = match self.strategy() {
            Strategy::Dot => outputs.matmul(hidden.unsqueeze_dim::<3>(2)),
            Strategy::General(proj) => proj.forward(outputs).matmul(hidden.unsqueeze_dim::<3>(2)),
            Strategy::Concat(layer) => {
                let h = hidden.unsqueeze_dim::<3>(1).expand([batch, src_len, dec_dim]);
                let energy = tanh(layer.attn.forward(Tensor::cat(vec![h, outputs], 2)));
                layer.v.forward(energy)
            }
        };
        scores.reshape([batch, src_len])
    }
}
