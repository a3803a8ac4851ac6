//! `uacap` command-line interface.
//!
//! - `uacap build` - compile a catalog into an index file
//! - `uacap lookup` - classify one user agent and print JSON
//! - `uacap inspect` - print index header statistics

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use uacap::{IndexReader, UacapConfig};

#[derive(Debug, Parser)]
#[command(name = "uacap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML configuration file; flags override its values.
    #[arg(long, global = true, env = "UACAP_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compile a catalog into an index file.
    Build(BuildArgs),
    /// Classify a user agent.
    Lookup(LookupArgs),
    /// Show statistics of a compiled index.
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
struct BuildArgs {
    /// Catalog (INI) to compile.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Index file to write.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Maximum patterns per content record.
    #[arg(long)]
    batch_size: Option<usize>,
}

#[derive(Debug, Args)]
struct LookupArgs {
    /// Compiled index to read.
    #[arg(long)]
    index: Option<PathBuf>,
    /// Pretty-print the JSON result.
    #[arg(long)]
    pretty: bool,
    /// User-agent string to classify.
    user_agent: String,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Compiled index to read.
    #[arg(long)]
    index: Option<PathBuf>,
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<UacapConfig> {
    match path {
        Some(path) => UacapConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(UacapConfig::default()),
    }
}

impl BuildArgs {
    /// Flags win over values loaded from the config file.
    fn apply(&self, config: &mut UacapConfig) {
        if let Some(catalog) = &self.catalog {
            config.catalog_path = catalog.clone();
        }
        if let Some(output) = &self.output {
            config.index_path = output.clone();
        }
        if let Some(batch_size) = self.batch_size {
            config.compile.batch_size = batch_size;
        }
    }
}

fn apply_index_override(config: &mut UacapConfig, index: Option<&PathBuf>) {
    if let Some(index) = index {
        config.index_path = index.clone();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;
    init_tracing(&config.log_level, cli.json_logs);

    match cli.command {
        Commands::Build(args) => {
            args.apply(&mut config);
            let summary = uacap::build_with_options(
                &config.catalog_path,
                &config.index_path,
                &config.compile_options(),
            )
            .with_context(|| format!("building {}", config.index_path.display()))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Lookup(args) => {
            apply_index_override(&mut config, args.index.as_ref());
            let classifier = uacap::open_with_config(&config)?;
            let info = classifier.classify(&args.user_agent)?;
            let out = if args.pretty {
                serde_json::to_string_pretty(&info)?
            } else {
                serde_json::to_string(&info)?
            };
            println!("{out}");
        }
        Commands::Inspect(args) => {
            apply_index_override(&mut config, args.index.as_ref());
            let reader = IndexReader::open(&config.index_path)?;
            let stats = reader.stats();
            println!("index:           {}", config.index_path.display());
            println!("file size:       {} bytes", stats.file_size);
            println!("content buckets: {}", stats.content_buckets);
            println!("content blocks:  {}", stats.content_blocks);
            println!("detail buckets:  {}", stats.detail_buckets);
            println!("detail blocks:   {}", stats.detail_blocks);
        }
    }

    Ok(())
}
