// ============================================================
// Layer 4 — JSON Lines Corpus Loader
// ============================================================
// Reads a keyphrase corpus stored as one JSON object per line,
// e.g. the KP20k layout:
//
//   {"title": "...", "abstract": "...", "keyword": "a;b;c"}
//
// Source text = the `src_fields` values joined with "."
// Keyphrases  = every `trg_fields` value split on the
//               `trg_delimiter` regex
//
// A line that is not valid JSON, or that lacks one of the
// configured fields, fails the whole load with the line number
// in the error. Blank lines are skipped.

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

use crate::domain::example::RawPair;
use crate::domain::traits::PairSource;

pub struct JsonLinesLoader {
    path:       PathBuf,
    src_fields: Vec<String>,
    trg_fields: Vec<String>,
    delimiter:  Regex,
}

impl JsonLinesLoader {
    pub fn new(
        path:          impl Into<PathBuf>,
        src_fields:    Vec<String>,
        trg_fields:    Vec<String>,
        trg_delimiter: &str,
    ) -> Result<Self> {
        let delimiter = Regex::new(trg_delimiter)
            .with_context(|| format!("Invalid keyphrase delimiter '{trg_delimiter}'"))?;
        Ok(Self { path: path.into(), src_fields, trg_fields, delimiter })
    }

    /// Parse a single corpus line.
    fn parse_line(&self, line: &str) -> Result<RawPair> {
        let json: Value = serde_json::from_str(line)?;

        let sources = self
            .src_fields
            .iter()
            .map(|f| string_field(&json, f))
            .collect::<Result<Vec<_>>>()?;

        let mut targets = Vec::new();
        for f in &self.trg_fields {
            let value = string_field(&json, f)?;
            targets.extend(self.delimiter.split(value).map(str::to_string));
        }

        Ok(RawPair::new(sources.join("."), targets))
    }
}

impl PairSource for JsonLinesLoader {
    fn load_all(&self) -> Result<Vec<RawPair>> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read corpus '{}'", self.path.display()))?;

        let mut pairs = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let pair = self
                .parse_line(line)
                .with_context(|| format!("{}:{}", self.path.display(), idx + 1))?;
            pairs.push(pair);
        }

        tracing::info!("Loaded {} documents from '{}'", pairs.len(), self.path.display());
        Ok(pairs)
    }
}

fn string_field<'a>(json: &'a Value, field: &str) -> Result<&'a str> {
    json.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("missing string field '{field}'"))
}
