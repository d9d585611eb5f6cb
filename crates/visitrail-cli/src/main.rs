use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{App, AppOptions};

#[derive(Parser)]
#[command(name = "visitrail")]
#[command(about = "Visitrail - per-domain visit history tracker", long_about = None)]
struct Cli {
    /// Use DIR for both config.toml and storage.json
    #[arg(long, global = true, value_name = "DIR")]
    home: Option<PathBuf>,

    /// Path to the storage document (overrides --home)
    #[arg(long, global = true, value_name = "FILE")]
    store: Option<PathBuf>,

    /// Path to config.toml (overrides --home)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a visit to each URL
    Record {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Record every URL read from stdin, one per line
    Watch,
    /// Show the most visited domains
    Top {
        /// Number of domains to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Show visited domains, most recent first
    History {
        /// Only show this domain
        #[arg(long)]
        domain: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show every retained visit of one domain
    Detail {
        domain: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete the whole visit history
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let app = App::open(&AppOptions {
        home: cli.home,
        store: cli.store,
        config: cli.config,
    })?;

    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Record { urls } => commands::record::run(&app, &urls, &mut out).await?,
        Commands::Watch => {
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            commands::watch::run(&app, input, &mut out).await?;
        }
        Commands::Top { limit, json } => commands::top::run(&app, limit, json, &mut out).await?,
        Commands::History { domain, json } => {
            commands::history::run(&app, domain.as_deref(), json, &mut out).await?
        }
        Commands::Detail { domain, json } => {
            commands::detail::run(&app, &domain, json, &mut out).await?
        }
        Commands::Clear { yes } => {
            let mut input = std::io::stdin().lock();
            commands::clear::run(&app, yes, &mut input, &mut out).await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
