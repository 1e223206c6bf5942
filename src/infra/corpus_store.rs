// ============================================================
// Layer 6 — Corpus Store
// ============================================================
// Persists what `preprocess` produces so `init`, `evaluate`
// and `generate` can pick it up later:
//
//   corpus/
//     manifest.json   ← options the examples were built with
//     vocab.json      ← Vocabulary (its own file format)
//     train.jsonl     ← one example per line
//     valid.jsonl
//
// Examples are stored either as KeyphraseExample (one2one) or
// One2ManyExample (one2many); the manifest says which.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{BufRead, BufReader, BufWriter, Write},
    path::PathBuf,
    str::FromStr,
};

use crate::data::vocab::Vocabulary;
use crate::domain::example::{KeyphraseExample, One2ManyExample};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Valid,
}

impl Split {
    fn file_name(self) -> &'static str {
        match self {
            Split::Train => "train.jsonl",
            Split::Valid => "valid.jsonl",
        }
    }
}

impl FromStr for Split {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "train" => Ok(Split::Train),
            "valid" => Ok(Split::Valid),
            other   => Err(format!("unknown split '{other}' (train | valid)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusManifest {
    pub vocab_size:     usize,
    pub lower:          bool,
    pub one2many:       bool,
    pub train_examples: usize,
    pub valid_examples: usize,
}

pub struct CorpusStore {
    dir: PathBuf,
}

impl CorpusStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create corpus dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn save_vocab(&self, vocab: &Vocabulary) -> Result<()> {
        let path = self.dir.join("vocab.json");
        vocab
            .save(&path)
            .with_context(|| format!("Cannot write vocabulary '{}'", path.display()))?;
        tracing::debug!("Saved {} words to '{}'", vocab.len(), path.display());
        Ok(())
    }

    pub fn load_vocab(&self) -> Result<Vocabulary> {
        let path = self.dir.join("vocab.json");
        Vocabulary::load(&path).with_context(|| {
            format!("Cannot load vocabulary '{}'. Have you run 'preprocess' first?", path.display())
        })
    }

    pub fn save_manifest(&self, manifest: &CorpusManifest) -> Result<()> {
        let path = self.dir.join("manifest.json");
        fs::write(&path, serde_json::to_string_pretty(manifest)?)
            .with_context(|| format!("Cannot write manifest '{}'", path.display()))
    }

    pub fn load_manifest(&self) -> Result<CorpusManifest> {
        let path = self.dir.join("manifest.json");
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read manifest '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Write one JSON record per line.
    pub fn write_split<T: Serialize>(&self, split: Split, items: &[T]) -> Result<()> {
        let path = self.dir.join(split.file_name());
        let file = File::create(&path)
            .with_context(|| format!("Cannot create '{}'", path.display()))?;
        let mut out = BufWriter::new(file);
        for item in items {
            serde_json::to_writer(&mut out, item)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;

        tracing::info!("Wrote {} examples to '{}'", items.len(), path.display());
        Ok(())
    }

    pub fn read_split<T: DeserializeOwned>(&self, split: Split) -> Result<Vec<T>> {
        let path = self.dir.join(split.file_name());
        let file = File::open(&path)
            .with_context(|| format!("Cannot open '{}'", path.display()))?;

        let mut items = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let item = serde_json::from_str(&line)
                .with_context(|| format!("{}:{}", path.display(), idx + 1))?;
            items.push(item);
        }
        Ok(items)
    }

    /// Examples of a split as one2one items, flattening one2many records.
    pub fn load_examples(&self, split: Split, manifest: &CorpusManifest) -> Result<Vec<KeyphraseExample>> {
        if manifest.one2many {
            let docs: Vec<One2ManyExample> = self.read_split(split)?;
            Ok(docs.into_iter().flat_map(One2ManyExample::into_one2one).collect())
        } else {
            self.read_split(split)
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::ExampleBuilder;
    use crate::domain::example::TokenizedPair;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    fn corpus() -> (Vocabulary, Vec<TokenizedPair>) {
        let pairs = vec![
            TokenizedPair::new(toks("graph neural network"), vec![toks("graph"), toks("neural network")]),
            TokenizedPair::new(toks("topic model"), vec![toks("topic model")]),
        ];
        (Vocabulary::build(&pairs, 1), pairs)
    }

    fn manifest(one2many: bool) -> CorpusManifest {
        CorpusManifest { vocab_size: 50, lower: true, one2many, train_examples: 2, valid_examples: 0 }
    }

    #[test]
    fn test_vocab_and_manifest_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CorpusStore::new(dir.path()).unwrap();
        let (vocab, _) = corpus();

        store.save_vocab(&vocab).unwrap();
        store.save_manifest(&manifest(false)).unwrap();

        assert_eq!(store.load_vocab().unwrap(), vocab);
        assert_eq!(store.load_manifest().unwrap(), manifest(false));
    }

    #[test]
    fn test_one2many_split_flattens_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = CorpusStore::new(dir.path()).unwrap();
        let (vocab, pairs) = corpus();
        let builder = ExampleBuilder::new(&vocab, 50);

        store.write_split(Split::Train, &builder.build_one2many(&pairs)).unwrap();
        let examples = store.load_examples(Split::Train, &manifest(true)).unwrap();

        assert_eq!(examples, builder.build_one2one(&pairs));
        assert_eq!(examples.len(), 3);
    }

    #[test]
    fn test_one2one_split_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CorpusStore::new(dir.path()).unwrap();
        let (vocab, pairs) = corpus();
        let examples = ExampleBuilder::new(&vocab, 50).build_one2one(&pairs);

        store.write_split(Split::Valid, &examples).unwrap();
        assert_eq!(store.load_examples(Split::Valid, &manifest(false)).unwrap(), examples);
    }

    #[test]
    fn test_split_names() {
        assert_eq!("valid".parse::<Split>().unwrap(), Split::Valid);
        assert!("test".parse::<Split>().is_err());
    }

    #[test]
    fn test_missing_files_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = CorpusStore::new(dir.path()).unwrap();
        assert!(store.load_vocab().is_err());
        assert!(store.load_manifest().is_err());
        assert!(store.read_split::<KeyphraseExample>(Split::Train).is_err());
    }
}
