// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Scores a checkpoint against a preprocessed split:
//
//   Step 1: Restore the model          (Layer 6 - checkpoint)
//   Step 2: Load the split's examples  (Layer 6 - corpus_store)
//   Step 3: Teacher-forced evaluation  (Layer 5 - evaluator)

use anyhow::{bail, Result};
use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::dataset::KeyphraseDataset;
use crate::infra::{
    checkpoint::CheckpointManager,
    corpus_store::{CorpusStore, Split},
};
use crate::ml::evaluator::{run_evaluation, EvaluationReport};
use crate::ml::inferencer::InferBackend;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateConfig {
    pub checkpoint_dir: String,
    pub corpus_dir:     String,
    pub split:          Split,
    pub batch_size:     usize,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: "checkpoints".to_string(),
            corpus_dir:     "corpus".to_string(),
            split:          Split::Valid,
            batch_size:     32,
        }
    }
}

pub struct EvaluateUseCase {
    config: EvaluateConfig,
}

impl EvaluateUseCase {
    pub fn new(config: EvaluateConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<EvaluationReport> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        self.execute_on::<InferBackend>(&device)
    }

    pub fn execute_on<B: Backend>(&self, device: &B::Device) -> Result<EvaluationReport> {
        let cfg = &self.config;

        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir)?;
        let (model_cfg, model) = ckpt.restore::<B>(device)?;

        let store = CorpusStore::new(&cfg.corpus_dir)?;
        let manifest = store.load_manifest()?;
        if manifest.vocab_size != model_cfg.vocab_size {
            bail!(
                "Corpus was built for vocab_size {} but the model has {}",
                manifest.vocab_size,
                model_cfg.vocab_size
            );
        }

        let examples = store.load_examples(cfg.split, &manifest)?;
        tracing::info!("Evaluating on {} {:?} examples", examples.len(), cfg.split);

        run_evaluation(&model, KeyphraseDataset::new(examples), cfg.batch_size, device)
    }
}
