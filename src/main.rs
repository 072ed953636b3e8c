//! scrollsearch - Entry Point

use clap::Parser;
use scrollsearch::source::{CatalogSource, DataSource};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// scrollsearch - debounced search over an infinite-scroll result list
#[derive(Parser, Debug)]
#[command(name = "scrollsearch")]
#[command(version)]
#[command(about = "Search a catalog with debounced input and scroll-driven paging")]
pub struct Args {
    /// Path to JSONL catalog file (generates a synthetic catalog if not provided)
    pub file: Option<PathBuf>,

    /// Number of entries in the synthetic catalog
    #[arg(long, default_value = "500")]
    pub synthetic: usize,

    /// Start with this search query
    #[arg(short, long)]
    pub query: Option<String>,

    /// Items per page request (must be positive)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,

    /// Artificial delay before the catalog answers, in milliseconds
    #[arg(long)]
    pub latency_ms: Option<u64>,

    /// Make every Nth page request fail (for exercising retry)
    #[arg(long)]
    pub fail_every: Option<u64>,

    /// Output width in columns
    #[arg(long, default_value = "80")]
    pub width: usize,

    /// Rows the simulated viewport shows at once
    #[arg(long, default_value = "20", value_parser = clap::value_parser!(u32).range(1..))]
    pub rows: u32,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration with full precedence chain:
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        // 1. Load config file (or None if missing)
        let config_file = scrollsearch::config::load_config_with_precedence(args.config.clone())?;

        // 2. Merge with defaults
        let merged = scrollsearch::config::merge_config(config_file);

        // 3. Apply environment variable overrides
        let with_env = scrollsearch::config::apply_env_overrides(merged)?;

        // 4. Apply CLI argument overrides, then reject unusable values
        let page_size_override = args.page_size.map(|n| n as usize);
        scrollsearch::config::apply_cli_overrides(with_env, page_size_override, args.latency_ms)
            .validate()?
    };

    scrollsearch::logging::init(&config.log_file_path)?;

    info!(
        config = ?config,
        "Configuration loaded and resolved"
    );

    let catalog = match &args.file {
        Some(path) => CatalogSource::from_path(path)?,
        None => CatalogSource::synthetic(args.synthetic),
    };
    let catalog = catalog.with_latency(config.source_latency());
    let catalog = match args.fail_every {
        Some(n) => catalog.with_fail_every(n),
        None => catalog,
    };
    let source: Arc<dyn DataSource> = Arc::new(catalog);

    let options = scrollsearch::shell::ShellOptions {
        width: args.width,
        viewport_rows: args.rows as usize,
        initial_query: args.query.clone(),
        ..Default::default()
    };

    scrollsearch::shell::run_with_source(source, &config, options)?;

    Ok(())
}
