use anyhow::Context;
use clap::Parser;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use compdb_core::{CliOverrides, FlagResolver, InvalidationPolicy, ResolverConfig};

/// Print the compiler flags recorded for a source file in a compilation database
#[derive(Parser, Debug)]
#[command(name = "compdb-flags")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to compile_commands.json (the cache is written next to it)
    #[arg(value_name = "DATABASE")]
    database: PathBuf,

    /// Source file to look up, exactly as it appears in the database
    #[arg(value_name = "FILE")]
    file: String,

    /// Path to a compdb.yaml configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Cache file name, created next to the database
    #[arg(long, value_name = "NAME")]
    cache_file: Option<String>,

    /// When to trust an existing cache (existence, content-hash)
    #[arg(long, value_name = "POLICY")]
    invalidate: Option<InvalidationPolicy>,

    /// Parse the database without reading or writing the cache
    #[arg(long)]
    no_cache: bool,

    /// Delete the cache before resolving
    #[arg(long)]
    refresh: bool,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only the flags.
    // Set RUST_LOG=debug for detailed logs.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    debug!("Resolver config: {:?}", config);

    let resolver = FlagResolver::new(config);

    if cli.refresh {
        resolver
            .clear_cache(&cli.database)
            .context("Failed to remove cache file")?;
    }

    let flags = resolver
        .flags_for(&cli.database, &cli.file)
        .with_context(|| format!("Failed to resolve flags from {}", cli.database.display()))?;

    if let Some(flags) = flags {
        let stdout = std::io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        for flag in &flags {
            writeln!(out, "{}", flag)?;
        }
        out.flush()?;
    }

    Ok(())
}

/// Load configuration from file (explicit or next to the database) and apply CLI overrides
fn load_config(cli: &Cli) -> anyhow::Result<ResolverConfig> {
    let mut config = if let Some(ref path) = cli.config {
        ResolverConfig::from_file(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?
    } else {
        let dir = cli.database.parent().unwrap_or_else(|| Path::new(""));
        let dir = if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir
        };
        ResolverConfig::discover(dir).context("Failed to load compdb.yaml")?
    };

    let mut overrides = CliOverrides::default();
    if let Some(ref name) = cli.cache_file {
        overrides.cache_file_name = Some(name.clone());
    }
    overrides.invalidation = cli.invalidate;
    if cli.no_cache {
        overrides.use_cache = Some(false);
    }

    config.merge(&overrides);
    Ok(config)
}
