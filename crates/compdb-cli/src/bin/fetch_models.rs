use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use compdb_core::models::{BatchRunner, HubFetcher, ModelCatalog, Selection};

/// Download the models listed in a catalog from the Hugging Face hub
#[derive(Parser, Debug)]
#[command(name = "fetch-models")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Model catalog (JSON: {"models": [{"id", "targetDir", "description"}]})
    #[arg(long, value_name = "FILE")]
    catalog: PathBuf,

    /// Base directory the models' target directories are relative to
    #[arg(long, value_name = "DIR", default_value = "models")]
    base_dir: PathBuf,

    /// Hub access token (falls back to cached credentials)
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Download only the model at this catalog index
    #[arg(value_name = "INDEX")]
    index: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let catalog = ModelCatalog::from_file(&cli.catalog)
        .with_context(|| format!("Failed to load catalog {}", cli.catalog.display()))?;

    let selection = match cli.index {
        Some(index) => Selection::Index(index),
        None => Selection::All,
    };

    // Reject a bad index before touching the network
    for spec in catalog.select(selection)? {
        println!("{} - {}", spec.id, spec.description);
    }

    let fetcher = HubFetcher::new(cli.token).context("Failed to create hub client")?;
    let runner = BatchRunner::new(catalog, cli.base_dir, fetcher);

    let report = runner.run(selection)?;

    for failure in &report.failed {
        println!("FAILED {}: {}", failure.id, failure.message);
    }
    println!("{}", report.summary());

    Ok(())
}
