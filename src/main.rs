use anyhow::{Context, Result};
use clap::Parser;
use pubmed_fetch::config::{find_config_file, get_config, load_config, Config};
use pubmed_fetch::models::SearchQuery;
use pubmed_fetch::output::render_table;
use pubmed_fetch::pipeline;
use pubmed_fetch::sources::PubMedClient;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// PubMed Fetch - search PubMed and save paper metadata to CSV
#[derive(Parser, Debug)]
#[command(name = "pubmed-fetch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fetch research papers from PubMed", long_about = None)]
struct Cli {
    /// Search query for PubMed
    query: String,

    /// Enable debug mode (verbose tracing and full error chains)
    #[arg(long, short)]
    debug: bool,

    /// Output CSV file name (default: results/<query>_results.csv)
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// Maximum number of papers to fetch
    #[arg(long, short, value_parser = parse_max_results)]
    max_results: Option<usize>,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_max_results(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        Ok(_) => Err("must be at least 1".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.debug { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("pubmed_fetch={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("An error occurred: {}", e);
            if cli.debug {
                eprintln!("{:?}", e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;

    let query = SearchQuery::new(&cli.query)
        .max_results(cli.max_results.unwrap_or(config.output.default_max_results));
    let output_path = cli
        .file
        .clone()
        .unwrap_or_else(|| config.default_output_path(&query));

    tracing::debug!("Received query: {}", query.query);
    tracing::debug!("Output filename: {}", output_path.display());

    println!("Fetching papers...");

    let client = PubMedClient::from_config(&config.eutils)?;
    let summary = pipeline::run(&client, &query, &output_path).await?;

    if summary.records.is_empty() {
        println!("No papers found for \"{}\".", query.query);
        return Ok(());
    }

    println!("\nResearch Papers Found:");
    println!("{}", render_table(&summary.records));

    Ok(())
}

/// Load configuration from `--config`, a discovered file, or the environment
fn resolve_config(cli: &Cli) -> Result<Config> {
    if let Some(config_path) = &cli.config {
        load_config(config_path)
            .with_context(|| format!("Failed to load config file {}", config_path.display()))
    } else if let Some(config_path) = find_config_file() {
        tracing::info!("Using config file: {}", config_path.display());
        load_config(&config_path)
            .with_context(|| format!("Failed to load config file {}", config_path.display()))
    } else {
        get_config().context("Failed to read configuration from environment")
    }
}
