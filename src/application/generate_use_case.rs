// ============================================================
// Layer 2 — GenerateUseCase
// ============================================================
// Loads everything inference needs once, then turns input
// texts into per-step keyphrase candidates:
//
//   corpus_dir     → Vocabulary + manifest (lowercasing)
//   checkpoint_dir → Seq2SeqModel via the Inferencer
//
// Generation always runs exactly `horizon` steps.

use anyhow::Result;
use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::vocab::Vocabulary;
use crate::infra::{checkpoint::CheckpointManager, corpus_store::CorpusStore};
use crate::ml::inferencer::{Candidate, InferBackend, Inferencer};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    pub checkpoint_dir: String,
    pub corpus_dir:     String,
    pub horizon:        usize,
    pub k:              usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: "checkpoints".to_string(),
            corpus_dir:     "corpus".to_string(),
            horizon:        6,
            k:              5,
        }
    }
}

pub struct GenerateUseCase<B: Backend = InferBackend> {
    config:     GenerateConfig,
    vocab:      Vocabulary,
    inferencer: Inferencer<B>,
}

impl GenerateUseCase<InferBackend> {
    pub fn new(config: GenerateConfig) -> Result<Self> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        Self::with_device(config, device)
    }
}

impl<B: Backend> GenerateUseCase<B> {
    pub fn with_device(config: GenerateConfig, device: B::Device) -> Result<Self> {
        let store = CorpusStore::new(&config.corpus_dir)?;
        let vocab = store.load_vocab()?;
        let manifest = store.load_manifest()?;

        let ckpt = CheckpointManager::new(&config.checkpoint_dir)?;
        let inferencer = Inferencer::from_checkpoint(&ckpt, manifest.lower, device)?;

        Ok(Self { config, vocab, inferencer })
    }

    pub fn generate(&self, text: &str) -> Result<Vec<Vec<Candidate>>> {
        let steps = self.inferencer.predict(text, &self.vocab, self.config.horizon, self.config.k)?;
        tracing::info!("Generated {} steps x {} candidates", steps.len(), self.config.k);
        Ok(steps)
    }
}
