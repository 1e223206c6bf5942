// ============================================================
// Layer 2 — InitUseCase
// ============================================================
// Builds a fresh Seq2SeqModel and writes it as a checkpoint:
//
//   Step 1: Resolve vocab_size   (explicit, or from the corpus manifest)
//   Step 2: Build the model      (Layer 5 - model)
//   Step 3: Save config + weights (Layer 6 - checkpoint)
//
// Weight updates are out of scope for this tool; the checkpoint
// is the starting point for an external trainer, and is enough
// for `evaluate` and `generate` to exercise the whole pipeline.

use anyhow::{bail, Context, Result};
use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::infra::{checkpoint::CheckpointManager, corpus_store::CorpusStore};
use crate::ml::attention::AttentionMethod;
use crate::ml::inferencer::InferBackend;
use crate::ml::model::Seq2SeqConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitConfig {
    pub checkpoint_dir: String,
    /// Preprocessed corpus to take vocab_size from.
    pub corpus_dir:     Option<String>,
    /// Overrides the corpus manifest when set.
    pub vocab_size:     Option<usize>,
    pub emb_dim:        usize,
    pub src_hidden_dim: usize,
    pub trg_hidden_dim: usize,
    pub src_layers:     usize,
    pub attention:      AttentionMethod,
    pub dropout:        f64,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: "checkpoints".to_string(),
            corpus_dir:     Some("corpus".to_string()),
            vocab_size:     None,
            emb_dim:        150,
            src_hidden_dim: 300,
            trg_hidden_dim: 300,
            src_layers:     2,
            attention:      AttentionMethod::Concat,
            dropout:        0.0,
        }
    }
}

pub struct InitUseCase {
    config: InitConfig,
}

impl InitUseCase {
    pub fn new(config: InitConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<Seq2SeqConfig> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);
        self.execute_on::<InferBackend>(&device)
    }

    pub fn execute_on<B: Backend>(&self, device: &B::Device) -> Result<Seq2SeqConfig> {
        let cfg = &self.config;

        // ── Step 1: vocab_size ────────────────────────────────────────────────
        let vocab_size = match (cfg.vocab_size, &cfg.corpus_dir) {
            (Some(size), _) => size,
            (None, Some(dir)) => {
                let store = CorpusStore::new(dir)?;
                store.load_manifest()?.vocab_size
            }
            (None, None) => bail!("Either a vocab size or a preprocessed corpus is required"),
        };

        // ── Step 2: model ─────────────────────────────────────────────────────
        let model_cfg = Seq2SeqConfig::new(vocab_size)
            .with_emb_dim(cfg.emb_dim)
            .with_src_hidden_dim(cfg.src_hidden_dim)
            .with_trg_hidden_dim(cfg.trg_hidden_dim)
            .with_src_layers(cfg.src_layers)
            .with_attention(cfg.attention)
            .with_dropout(cfg.dropout);
        let model = model_cfg
            .init::<B>(device)
            .context("Invalid model dimensions")?;
        tracing::info!(
            "Model ready: vocab={}, emb={}, encoder {}x2x{}, decoder {}, {} attention, {} parameters",
            vocab_size,
            cfg.emb_dim,
            cfg.src_layers,
            cfg.src_hidden_dim,
            cfg.trg_hidden_dim,
            cfg.attention,
            model.num_params()
        );

        // ── Step 3: checkpoint ────────────────────────────────────────────────
        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt.save_config(&model_cfg)?;
        ckpt.save_model(&model)?;

        Ok(model_cfg)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::corpus_store::CorpusManifest;
    use burn::backend::NdArray;

    type TB = NdArray;

    fn small(dir: &std::path::Path) -> InitConfig {
        InitConfig {
            checkpoint_dir: dir.join("ckpt").display().to_string(),
            corpus_dir:     None,
            vocab_size:     Some(20),
            emb_dim:        4,
            src_hidden_dim: 3,
            trg_hidden_dim: 5,
            src_layers:     1,
            ..InitConfig::default()
        }
    }

    #[test]
    fn test_writes_a_restorable_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = small(dir.path());
        let model_cfg = InitUseCase::new(cfg.clone()).execute_on::<TB>(&Default::default()).unwrap();
        assert_eq!(model_cfg.vocab_size, 20);

        let ckpt = CheckpointManager::new(&cfg.checkpoint_dir).unwrap();
        let (restored_cfg, model) = ckpt.restore::<TB>(&Default::default()).unwrap();
        assert_eq!(restored_cfg.src_layers, 1);
        assert_eq!(model.vocab_size(), 20);
    }

    #[test]
    fn test_vocab_size_from_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("corpus");
        CorpusStore::new(&corpus)
            .unwrap()
            .save_manifest(&CorpusManifest {
                vocab_size: 33,
                lower: true,
                one2many: false,
                train_examples: 0,
                valid_examples: 0,
            })
            .unwrap();

        let cfg = InitConfig {
            vocab_size: None,
            corpus_dir: Some(corpus.display().to_string()),
            ..small(dir.path())
        };
        let model_cfg = InitUseCase::new(cfg).execute_on::<TB>(&Default::default()).unwrap();
        assert_eq!(model_cfg.vocab_size, 33);
    }

    #[test]
    fn test_needs_a_vocab_size() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = InitConfig { vocab_size: None, corpus_dir: None, ..small(dir.path()) };
        assert!(InitUseCase::new(cfg).execute_on::<TB>(&Default::default()).is_err());
    }

    #[test]
    fn test_dot_attention_width_mismatch_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = InitConfig { attention: AttentionMethod::Dot, ..small(dir.path()) };
        let err = InitUseCase::new(cfg).execute_on::<TB>(&Default::default()).unwrap_err();
        assert!(format!("{err:#}").contains("dot attention"));
    }
}
