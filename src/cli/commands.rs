// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// One Args struct per subcommand. Each converts into the
// matching application config, so Layer 2 never sees clap.

use clap::{Args, Subcommand};

use crate::application::{
    evaluate_use_case::EvaluateConfig,
    generate_use_case::GenerateConfig,
    init_use_case::InitConfig,
    preprocess_use_case::PreprocessConfig,
};
use crate::data::filter::FilterOptions;
use crate::infra::corpus_store::Split;
use crate::ml::attention::AttentionMethod;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tokenise, filter and index a JSON lines corpus
    Preprocess(PreprocessArgs),

    /// Write a freshly initialised model checkpoint
    Init(InitArgs),

    /// Teacher-forced accuracy of a checkpoint on a corpus split
    Evaluate(EvaluateArgs),

    /// Generate keyphrase candidates for a piece of text
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
pub struct PreprocessArgs {
    /// JSON lines corpus, one document per line
    #[arg(long)]
    pub data: String,

    /// Output directory for vocab.json, train.jsonl, valid.jsonl
    #[arg(long, default_value = "corpus")]
    pub out: String,

    /// Fields joined (with ".") into the source text
    #[arg(long, value_delimiter = ',', default_value = "title,abstract")]
    pub src_fields: Vec<String>,

    /// Fields holding delimited keyphrases
    #[arg(long, value_delimiter = ',', default_value = "keyword")]
    pub trg_fields: Vec<String>,

    /// Regex separating keyphrases inside a target field
    #[arg(long, default_value = ";")]
    pub trg_delimiter: String,

    /// Keep the original casing
    #[arg(long)]
    pub keep_case: bool,

    /// Truncate sources to this many tokens (0 = no limit)
    #[arg(long, default_value_t = 0)]
    pub src_seq_length_trunc: usize,

    /// Truncate keyphrases to this many tokens (0 = no limit)
    #[arg(long, default_value_t = 0)]
    pub trg_seq_length_trunc: usize,

    #[arg(long, default_value_t = 0)]
    pub min_src_seq_length: usize,

    #[arg(long, default_value_t = 0)]
    pub max_src_seq_length: usize,

    #[arg(long, default_value_t = 0)]
    pub min_trg_seq_length: usize,

    #[arg(long, default_value_t = 0)]
    pub max_trg_seq_length: usize,

    /// Output vocabulary size of the model; larger ids become <unk>
    #[arg(long, default_value_t = 50_000)]
    pub vocab_size: usize,

    /// Drop words seen fewer times than this
    #[arg(long, default_value_t = 1)]
    pub words_min_frequency: usize,

    /// Store one record per document instead of one per keyphrase
    #[arg(long)]
    pub one2many: bool,

    /// Share of documents held out for validation
    #[arg(long, default_value_t = 0.1)]
    pub valid_fraction: f64,

    /// Shuffle seed for the train/valid split
    #[arg(long, default_value_t = 3435)]
    pub seed: u64,
}

impl From<PreprocessArgs> for PreprocessConfig {
    fn from(a: PreprocessArgs) -> Self {
        PreprocessConfig {
            data_path:     a.data,
            out_dir:       a.out,
            src_fields:    a.src_fields,
            trg_fields:    a.trg_fields,
            trg_delimiter: a.trg_delimiter,
            filter: FilterOptions {
                lower:                !a.keep_case,
                src_seq_length_trunc: a.src_seq_length_trunc,
                trg_seq_length_trunc: a.trg_seq_length_trunc,
                min_src_seq_length:   a.min_src_seq_length,
                max_src_seq_length:   a.max_src_seq_length,
                min_trg_seq_length:   a.min_trg_seq_length,
                max_trg_seq_length:   a.max_trg_seq_length,
            },
            vocab_size:          a.vocab_size,
            words_min_frequency: a.words_min_frequency,
            one2many:            a.one2many,
            valid_fraction:      a.valid_fraction,
            seed:                a.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to write model_config.json and the weights into
    #[arg(long, default_value = "checkpoints")]
    pub out: String,

    /// Preprocessed corpus whose manifest gives vocab_size
    #[arg(long)]
    pub corpus_dir: Option<String>,

    /// Explicit vocab_size (overrides the corpus manifest)
    #[arg(long)]
    pub vocab_size: Option<usize>,

    #[arg(long, default_value_t = 150)]
    pub emb_dim: usize,

    /// Hidden size of each encoder direction
    #[arg(long, default_value_t = 300)]
    pub src_hidden_dim: usize,

    #[arg(long, default_value_t = 300)]
    pub trg_hidden_dim: usize,

    /// Number of stacked BiLSTM layers in the encoder
    #[arg(long, default_value_t = 2)]
    pub src_layers: usize,

    /// dot | general | concat
    #[arg(long, default_value = "concat")]
    pub attention: AttentionMethod,

    #[arg(long, default_value_t = 0.0)]
    pub dropout: f64,
}

impl From<InitArgs> for InitConfig {
    fn from(a: InitArgs) -> Self {
        InitConfig {
            checkpoint_dir: a.out,
            corpus_dir:     a.corpus_dir,
            vocab_size:     a.vocab_size,
            emb_dim:        a.emb_dim,
            src_hidden_dim: a.src_hidden_dim,
            trg_hidden_dim: a.trg_hidden_dim,
            src_layers:     a.src_layers,
            attention:      a.attention,
            dropout:        a.dropout,
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    #[arg(long, default_value = "corpus")]
    pub corpus_dir: String,

    /// train | valid
    #[arg(long, default_value = "valid")]
    pub split: Split,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,
}

impl From<EvaluateArgs> for EvaluateConfig {
    fn from(a: EvaluateArgs) -> Self {
        EvaluateConfig {
            checkpoint_dir: a.checkpoint_dir,
            corpus_dir:     a.corpus_dir,
            split:          a.split,
            batch_size:     a.batch_size,
        }
    }
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Text to generate keyphrases for
    #[arg(long)]
    pub text: String,

    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    #[arg(long, default_value = "corpus")]
    pub corpus_dir: String,

    /// Number of decoding steps (no early stop on </s>)
    #[arg(long, default_value_t = 6)]
    pub horizon: usize,

    /// Candidates kept per step
    #[arg(long, default_value_t = 5)]
    pub k: usize,
}

impl From<&GenerateArgs> for GenerateConfig {
    fn from(a: &GenerateArgs) -> Self {
        GenerateConfig {
            checkpoint_dir: a.checkpoint_dir.clone(),
            corpus_dir:     a.corpus_dir.clone(),
            horizon:        a.horizon,
            k:              a.k,
        }
    }
}
