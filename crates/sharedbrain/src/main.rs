use anyhow::Context;
use clap::Parser;
use sharedbrain_core::{process_backlinks, Config, DirectorySink, DirectorySource};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Resolve `[[wiki links]]` in a folder of markdown notes and add backlinks.
#[derive(Parser, Debug)]
#[command(name = "sharedbrain", version, about)]
struct Opts {
    /// Source directory containing the markdown notes
    #[arg(long, env = "SHAREDBRAIN_CONTENT")]
    content: PathBuf,

    /// Destination directory for the converted notes
    #[arg(long, env = "SHAREDBRAIN_DEST")]
    dest: PathBuf,

    /// Optional TOML config file
    #[arg(long, env = "SHAREDBRAIN_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(opts: &Opts) -> anyhow::Result<()> {
    let config = match &opts.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let source = DirectorySource::new(&opts.content);
    let mut sink = DirectorySink::new(&opts.dest);
    let summary = process_backlinks(&source, &mut sink, &config).with_context(|| {
        format!(
            "processing {} into {}",
            opts.content.display(),
            opts.dest.display()
        )
    })?;
    tracing::info!(
        "Processed {} documents, {} of them stubs",
        summary.documents,
        summary.stubs
    );
    Ok(())
}

fn main() {
    let opts = Opts::parse();
    init_logging(opts.verbose);
    tracing::info!("sharedbrain {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&opts) {
        tracing::error!("Error when processing: {:?}", e);
        std::process::exit(1);
    }
    tracing::info!("Generation complete!");
}
