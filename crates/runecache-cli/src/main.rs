use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use runecache_cli::{EXIT_FAILURE, EXIT_INVALID_ARGUMENT, EXIT_OK, FileFilter, info};
use runecache_storage::{BackendKind, Cache, StorageConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "runecache",
    about = "Inspect JS5 asset caches",
    version,
    long_about = "Reads reference tables and files from a JS5 asset cache stored as a flat directory tree or as a main_file_cache.dat2 disk cache."
)]
struct Cli {
    /// Cache directory
    #[arg(long, env = "RUNECACHE_PATH", global = true)]
    cache: Option<PathBuf>,

    /// Storage layout of the cache directory
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    /// XTEA key file (.json key list or plain text)
    #[arg(long, global = true)]
    keys: Option<PathBuf>,

    /// JSON storage configuration; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log decoding progress to stderr
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about an index or some of its files
    Info {
        /// Index id
        index: u8,

        /// File ids, e.g. `1,4-7`; the index itself is described without them
        files: Option<FileFilter>,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge the optional config file with command-line flags
fn storage_config(cli: &Cli) -> Result<Option<StorageConfig>> {
    let mut config = match &cli.config {
        Some(path) => Some(
            StorageConfig::load(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        ),
        None => None,
    };

    if let Some(path) = &cli.cache {
        config = Some(config.unwrap_or_default().with_path(path));
    }
    let Some(mut config) = config else {
        return Ok(None);
    };

    if let Some(backend) = cli.backend {
        config = config.with_backend(backend);
    }
    if cli.keys.is_some() {
        config = config.with_key_file(cli.keys.as_ref());
    }
    Ok(Some(config))
}

fn run(cli: &Cli) -> Result<u8> {
    let Some(config) = storage_config(cli)? else {
        println!("No cache source specified.");
        return Ok(EXIT_INVALID_ARGUMENT);
    };
    debug!("Using {:?}", config);

    let storage = config.open_storage().context("Failed to open cache")?;
    let keys = config.load_keys().context("Failed to load XTEA keys")?;
    let cache = Cache::new(storage, keys).with_memoize_tables(config.memoize_tables);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match &cli.command {
        Commands::Info { index, files } => info::run(&cache, *index, files.as_ref(), &mut out)?,
    }
    out.flush()?;

    Ok(EXIT_OK)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
