// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes each subcommand to
// its use case. Printing results is this layer's job; the
// work itself happens in Layer 2.
//
//   preprocess → PreprocessUseCase
//   init       → InitUseCase
//   evaluate   → EvaluateUseCase
//   generate   → GenerateUseCase

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, GenerateArgs, InitArgs, PreprocessArgs};

#[derive(Parser, Debug)]
#[command(
    name = "copyseq-kp",
    version,
    about = "Keyphrase generation with an attentional encoder-decoder and copy-pointer data."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Preprocess(args) => run_preprocess(args),
            Commands::Init(args)       => run_init(args),
            Commands::Evaluate(args)   => run_evaluate(args),
            Commands::Generate(args)   => run_generate(args),
        }
    }
}

fn run_preprocess(args: PreprocessArgs) -> Result<()> {
    use crate::application::preprocess_use_case::PreprocessUseCase;

    tracing::info!("Preprocessing '{}' into '{}'", args.data, args.out);
    let report = PreprocessUseCase::new(args.into()).execute()?;

    println!(
        "{} documents → {} train / {} valid examples, {} vocabulary words",
        report.documents, report.train_examples, report.valid_examples, report.vocab_words
    );
    Ok(())
}

fn run_init(args: InitArgs) -> Result<()> {
    use crate::application::init_use_case::InitUseCase;

    let out = args.out.clone();
    let cfg = InitUseCase::new(args.into()).execute()?;

    println!("Initialised model (vocab_size={}) in '{}'", cfg.vocab_size, out);
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let report = EvaluateUseCase::new(args.into()).execute()?;

    println!(
        "{} examples, {} target tokens: accuracy {:.2}%, mean gold probability {:.4}",
        report.examples,
        report.target_tokens,
        report.accuracy * 100.0,
        report.mean_gold_prob
    );
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    use crate::application::generate_use_case::GenerateUseCase;

    let use_case = GenerateUseCase::new((&args).into())?;
    let steps = use_case.generate(&args.text)?;

    for (t, candidates) in steps.iter().enumerate() {
        let line: Vec<String> = candidates
            .iter()
            .map(|c| format!("{} ({:.4})", c.word, c.prob))
            .collect();
        println!("step {}: {}", t + 1, line.join(", "));
    }
    Ok(())
}
