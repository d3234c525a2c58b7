use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use vellum_cache::Partition;

mod commands;
mod error;

#[derive(Parser)]
#[command(name = "vellum", about = "Offline-first reader for line-oriented scripture corpora", version)]
struct Cli {
    /// Path to a TOML, YAML or JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Do not print progress while loading
    #[arg(short, long, global = true)]
    background: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a chapter and remember it as read
    Read {
        language: String,
        /// Defaults to the last book read
        book: Option<String>,
        /// Defaults to the furthest chapter read in the book
        chapter: Option<u32>,
    },
    /// List books with their chapter counts
    Books { language: String },
    /// Parse a corpus and report lines that are not verses
    Stats { language: String },
    /// Inspect and maintain the cache
    #[command(subcommand)]
    Cache(CacheCommands),
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Show the estimated cache size
    Size,
    /// Evict the oldest cached books
    Cleanup,
    /// Remove cached entries
    Clear {
        /// Only this partition (bible, book, metadata or progress)
        #[arg(value_parser = parse_partition)]
        partition: Option<Partition>,
    },
    /// List the entries of a partition
    List {
        #[arg(value_parser = parse_partition)]
        partition: Partition,
    },
}

fn parse_partition(value: &str) -> Result<Partition, String> {
    value.parse().map_err(|_| format!("unknown partition: {value}"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match commands::Context::new(cli.config.as_deref(), cli.background) {
        Ok(context) => {
            let result = match cli.command {
                Commands::Read {
                    language,
                    book,
                    chapter,
                } => context.read(&language, book.as_deref(), chapter).await,
                Commands::Books { language } => context.books(&language).await,
                Commands::Stats { language } => context.stats(&language).await,
                Commands::Cache(CacheCommands::Size) => context.cache_size().await,
                Commands::Cache(CacheCommands::Cleanup) => context.cache_cleanup().await,
                Commands::Cache(CacheCommands::Clear { partition }) => context.cache_clear(partition).await,
                Commands::Cache(CacheCommands::List { partition }) => context.cache_list(partition).await,
            };
            context.close().await;
            result
        },
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = ?err, "{err}");
            // EX_TEMPFAIL, so wrappers know a retry may help.
            if err.is_retryable() { ExitCode::from(75) } else { ExitCode::FAILURE }
        },
    }
}
