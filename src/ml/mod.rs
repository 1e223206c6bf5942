// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn modules live here. The other layers hand in id
// tensors and get distributions or words back.
//
//   embedding.rs   shared token embedding, out-of-vocab → <unk>
//   encoder.rs     stacked BiLSTM + bridge to the decoder state
//   attention.rs   dot / general / concat scoring, masked softmax
//   decoder.rs     one LSTM step + attention + vocab softmax
//   rollout.rs     teacher-forced and self-fed time loops
//   model.rs       Seq2SeqConfig / Seq2SeqModel (forward, generate)
//   evaluator.rs   teacher-forced accuracy over a stored split
//   inferencer.rs  checkpoint → text → keyphrase candidates
//
// Reference: Luong et al. (2015) Effective Approaches to
//            Attention-based Neural Machine Translation
//            Meng et al. (2017) Deep Keyphrase Generation

pub mod embedding;

pub mod encoder;

/// Attention scoring strategies
pub mod attention;

pub mod decoder;

/// Time-axis driver for the decoder
pub mod rollout;

/// Full encoder–decoder model
pub mod model;

/// Teacher-forced evaluation loop
pub mod evaluator;

/// Inference engine — loads checkpoint and generates keyphrases
pub mod inferencer;
