// ============================================================
// Layer 2 — PreprocessUseCase
// ============================================================
// Turns a raw JSON lines corpus into model-ready examples:
//
//   Step 1: Load documents              (Layer 4 - loader)
//   Step 2: Split train / valid         (Layer 4 - splitter)
//   Step 3: Tokenise + filter           (Layer 4 - filter)
//   Step 4: Build the vocabulary        (Layer 4 - vocab, train only)
//   Step 5: Build examples              (Layer 4 - dataset)
//   Step 6: Persist corpus              (Layer 6 - corpus_store)
//
// The split happens on documents, before one2one flattening,
// so a source text never appears on both sides. Training pairs
// are filtered with the validity checks on; validation pairs
// only lose keyphrases with bad punctuation.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::ExampleBuilder,
    filter::{FilterOptions, PairFilter},
    loader::JsonLinesLoader,
    splitter::split_train_valid,
    tokenizer::CopySeqTokenizer,
    vocab::Vocabulary,
};
use crate::domain::traits::PairSource;
use crate::infra::corpus_store::{CorpusManifest, CorpusStore, Split};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    pub data_path:           String,
    pub out_dir:             String,
    pub src_fields:          Vec<String>,
    pub trg_fields:          Vec<String>,
    pub trg_delimiter:       String,
    pub filter:              FilterOptions,
    pub vocab_size:          usize,
    pub words_min_frequency: usize,
    pub one2many:            bool,
    pub valid_fraction:      f64,
    pub seed:                u64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            data_path:           "data/kp20k.jsonl".to_string(),
            out_dir:             "corpus".to_string(),
            src_fields:          vec!["title".to_string(), "abstract".to_string()],
            trg_fields:          vec!["keyword".to_string()],
            trg_delimiter:       ";".to_string(),
            filter:              FilterOptions { lower: true, ..FilterOptions::default() },
            vocab_size:          50_000,
            words_min_frequency: 1,
            one2many:            false,
            valid_fraction:      0.1,
            seed:                3435,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessReport {
    pub documents:      usize,
    pub train_pairs:    usize,
    pub valid_pairs:    usize,
    pub vocab_words:    usize,
    pub train_examples: usize,
    pub valid_examples: usize,
}

pub struct PreprocessUseCase {
    config: PreprocessConfig,
}

impl PreprocessUseCase {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<PreprocessReport> {
        let cfg = &self.config;

        // ── Step 1: Load ──────────────────────────────────────────────────────
        let loader = JsonLinesLoader::new(
            &cfg.data_path,
            cfg.src_fields.clone(),
            cfg.trg_fields.clone(),
            &cfg.trg_delimiter,
        )?;
        let raw = loader.load_all()?;
        let documents = raw.len();

        // ── Step 2: Split ─────────────────────────────────────────────────────
        let (train_raw, valid_raw) = split_train_valid(raw, cfg.valid_fraction, cfg.seed);

        // ── Step 3: Tokenise + filter ─────────────────────────────────────────
        let tokenizer = CopySeqTokenizer::new()?;
        let filter = PairFilter::new(&tokenizer, cfg.filter.clone())?;
        let train_pairs = filter.apply(&train_raw, true);
        let valid_pairs = filter.apply(&valid_raw, false);
        tracing::info!(
            "Kept {} of {} train and {} of {} valid documents",
            train_pairs.len(),
            train_raw.len(),
            valid_pairs.len(),
            valid_raw.len()
        );

        // ── Step 4: Vocabulary ────────────────────────────────────────────────
        let vocab = Vocabulary::build(&train_pairs, cfg.words_min_frequency);
        tracing::info!(
            "Vocabulary: {} words, model will use the first {}",
            vocab.len(),
            cfg.vocab_size.min(vocab.len())
        );

        // ── Step 5 + 6: Examples, written per split ───────────────────────────
        let store = CorpusStore::new(&cfg.out_dir)?;
        let builder = ExampleBuilder::new(&vocab, cfg.vocab_size);

        let (train_examples, valid_examples) = if cfg.one2many {
            let train = builder.build_one2many(&train_pairs);
            let valid = builder.build_one2many(&valid_pairs);
            store.write_split(Split::Train, &train)?;
            store.write_split(Split::Valid, &valid)?;
            (train.len(), valid.len())
        } else {
            let train = builder.build_one2one(&train_pairs);
            let valid = builder.build_one2one(&valid_pairs);
            store.write_split(Split::Train, &train)?;
            store.write_split(Split::Valid, &valid)?;
            (train.len(), valid.len())
        };

        store.save_vocab(&vocab)?;
        store
            .save_manifest(&CorpusManifest {
                vocab_size: cfg.vocab_size,
                lower: cfg.filter.lower,
                one2many: cfg.one2many,
                train_examples,
                valid_examples,
            })
            .context("Cannot finish preprocessing")?;

        Ok(PreprocessReport {
            documents,
            train_pairs: train_pairs.len(),
            valid_pairs: valid_pairs.len(),
            vocab_words: vocab.len(),
            train_examples,
            valid_examples,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::example::{KeyphraseExample, One2ManyExample};
    use std::fs;

    const CORPUS: &str = concat!(
        "{\"title\":\"Deep keyphrase generation\",\"abstract\":\"We generate keyphrases with a copy mechanism\",\"keyword\":\"keyphrase generation;copy mechanism\"}\n",
        "{\"title\":\"Topic models\",\"abstract\":\"Latent topics in documents\",\"keyword\":\"topic model;lda (latent dirichlet allocation)\"}\n",
        "{\"title\":\"Graph ranking\",\"abstract\":\"Ranking words in a graph\",\"keyword\":\"textrank;graph\"}\n",
        "{\"title\":\"Neural attention\",\"abstract\":\"Attention over source words\",\"keyword\":\"attention\"}\n",
    );

    fn config(dir: &std::path::Path, one2many: bool) -> PreprocessConfig {
        let data = dir.join("corpus.jsonl");
        fs::write(&data, CORPUS).unwrap();
        PreprocessConfig {
            data_path: data.display().to_string(),
            out_dir: dir.join("out").display().to_string(),
            one2many,
            valid_fraction: 0.25,
            ..PreprocessConfig::default()
        }
    }

    #[test]
    fn test_one2one_run_writes_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), false);
        let report = PreprocessUseCase::new(cfg.clone()).execute().unwrap();

        assert_eq!(report.documents, 4);
        assert_eq!(report.train_pairs + report.valid_pairs, 4);
        assert!(report.vocab_words > 4);

        let store = CorpusStore::new(&cfg.out_dir).unwrap();
        let manifest = store.load_manifest().unwrap();
        assert!(!manifest.one2many);
        assert_eq!(manifest.train_examples, report.train_examples);

        let train: Vec<KeyphraseExample> = store.read_split(Split::Train).unwrap();
        assert_eq!(train.len(), report.train_examples);
        for ex in &train {
            assert_eq!(ex.src_map.len(), ex.src.len());
            assert_eq!(ex.copy_mask.len(), ex.trg.len());
            assert!(ex.copy_mask.iter().all(|&p| p == 0 || p >= cfg.vocab_size));
        }
        assert_eq!(store.load_vocab().unwrap().len(), report.vocab_words);
    }

    #[test]
    fn test_one2many_keeps_documents_whole() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path(), true);
        let report = PreprocessUseCase::new(cfg.clone()).execute().unwrap();

        assert_eq!(report.train_examples, report.train_pairs);
        let store = CorpusStore::new(&cfg.out_dir).unwrap();
        let docs: Vec<One2ManyExample> = store.read_split(Split::Train).unwrap();
        assert_eq!(docs.len(), report.train_pairs);
    }

    #[test]
    fn test_same_seed_same_output() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let cfg_a = config(a.path(), false);
        let cfg_b = config(b.path(), false);
        PreprocessUseCase::new(cfg_a.clone()).execute().unwrap();
        PreprocessUseCase::new(cfg_b.clone()).execute().unwrap();

        let read = |cfg: &PreprocessConfig| {
            fs::read_to_string(std::path::Path::new(&cfg.out_dir).join("train.jsonl")).unwrap()
        };
        assert_eq!(read(&cfg_a), read(&cfg_b));
    }

    #[test]
    fn test_missing_corpus_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = PreprocessConfig {
            data_path: dir.path().join("absent.jsonl").display().to_string(),
            out_dir: dir.path().join("out").display().to_string(),
            ..PreprocessConfig::default()
        };
        assert!(PreprocessUseCase::new(cfg).execute().is_err());
    }
}
