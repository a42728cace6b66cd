use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use coursefind_cli::init_tracing;
use coursefind_core::config::Config;
use coursefind_embed::get_default_embedder;
use coursefind_store::{PreprocessOptions, PreprocessOutcome, Preprocessor};

#[derive(Parser)]
#[command(name = "coursefind-preprocess")]
#[command(about = "Normalize and embed the raw course CSV into a persisted dataset", long_about = None)]
struct Cli {
    /// Raw course CSV (default from config)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Output dataset directory (default from config)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Rebuild even if the dataset is up to date
    #[arg(long, default_value_t = false)]
    force: bool,
    /// Texts per embedder call (default from config)
    #[arg(long)]
    batch_size: Option<usize>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load().context("loading configuration")?;
    let settings = config.settings()?;

    let input = cli.input.unwrap_or_else(|| settings.courses_csv_path());
    let output = cli.output.unwrap_or_else(|| settings.dataset_path());
    let options = PreprocessOptions {
        batch_size: cli.batch_size.unwrap_or(settings.embedding.batch_size),
        force: cli.force,
    };
    let embedder = get_default_embedder(&settings.embedding, settings.model_dir_path().as_deref())?;

    println!("Input:  {}", input.display());
    println!("Output: {}", output.display());
    let outcome = tokio::runtime::Runtime::new()?
        .block_on(Preprocessor::new(embedder.as_ref(), options).run(&input, &output))?;
    match outcome {
        PreprocessOutcome::Written(meta) => {
            println!("Wrote {} courses ({} dims, embedder {})", meta.rows, meta.dim, meta.embedder_id);
        }
        PreprocessOutcome::Skipped(meta) => {
            println!("Dataset already up to date ({} courses from {}); use --force to rebuild", meta.rows, meta.created_at);
        }
    }
    Ok(())
}
