// ============================================================
// Layer 5 — Teacher-Forced Evaluator
// ============================================================
// Runs the model over a stored split with Burn's DataLoader
// and measures how often the teacher-forced prediction at each
// target position is the gold token.
//
// Only real target positions count (trg_mask). No loss is
// computed and no weights change.

use anyhow::{bail, Result};
use burn::{data::dataloader::DataLoaderBuilder, data::dataset::Dataset, prelude::*};

use crate::data::{batcher::KeyphraseBatcher, dataset::KeyphraseDataset};
use crate::ml::model::Seq2SeqModel;

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub examples:       usize,
    pub target_tokens:  usize,
    pub correct:        usize,
    /// correct / target_tokens
    pub accuracy:       f64,
    /// Mean probability assigned to the gold token.
    pub mean_gold_prob: f64,
}

pub fn run_evaluation<B: Backend>(
    model:      &Seq2SeqModel<B>,
    dataset:    KeyphraseDataset,
    batch_size: usize,
    device:     &B::Device,
) -> Result<EvaluationReport> {
    if batch_size == 0 {
        bail!("batch_size must be at least 1");
    }

    let examples = dataset.len();
    let loader = DataLoaderBuilder::new(KeyphraseBatcher::new())
        .batch_size(batch_size)
        .set_device(device.clone())
        .build(dataset);

    let mut target_tokens = 0usize;
    let mut correct       = 0usize;
    let mut gold_prob_sum = 0.0f64;

    for batch in loader.iter() {
        let [rows, trg_len] = batch.trg.dims();
        if trg_len == 0 {
            continue;
        }

        let output = model.forward(batch.src, Some(batch.src_mask), batch.trg.clone())?;

        // argmax over the vocabulary: [b, t, 1] → [b, t]
        let predicted = output.probs.clone().argmax(2).reshape([rows, trg_len]);
        let hits = predicted.equal(batch.trg.clone()).bool_and(batch.trg_mask.clone());

        let gold = output
            .probs
            .gather(2, batch.trg.reshape([rows, trg_len, 1]))
            .reshape([rows, trg_len])
            .mask_fill(batch.trg_mask.clone().bool_not(), 0.0);

        correct       += hits.int().sum().into_scalar().elem::<i64>() as usize;
        target_tokens += batch.trg_mask.int().sum().into_scalar().elem::<i64>() as usize;
        gold_prob_sum += gold.sum().into_scalar().elem::<f64>();
    }

    let (accuracy, mean_gold_prob) = if target_tokens == 0 {
        (0.0, 0.0)
    } else {
        (correct as f64 / target_tokens as f64, gold_prob_sum / target_tokens as f64)
    };

    tracing::info!(
        "Evaluated {} examples: {}/{} target tokens correct ({:.2}%), mean gold p={:.4}",
        examples,
        correct,
        target_tokens,
        accuracy * 100.0,
        mean_gold_prob
    );

    Ok(EvaluationReport { examples, target_tokens, correct, accuracy, mean_gold_prob })
}
