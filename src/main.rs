//! Ygglens main entry point
//!
//! Command-line interface for the Ygglens crawler and search engine.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use ygglens::config::{load_config_with_hash, Config};
use ygglens::crawler::{Orchestrator, VisitedSet};
use ygglens::render::{Extractor, HttpRenderer};
use ygglens::robots::{ComplianceEngine, RobotsCache};
use ygglens::search::{SearchEngine, SearchQuery};
use ygglens::storage::{SqliteStorage, Storage};

/// Ygglens: a restricted-network crawler and search engine
///
/// Ygglens crawls allow-listed domains while respecting robots.txt and
/// page-level directives, and serves relevance-ranked search over the
/// stored pages.
#[derive(Parser, Debug)]
#[command(name = "ygglens")]
#[command(version = "0.3.1")]
#[command(about = "A restricted-network crawler and search engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a seed URL to completion
    Crawl {
        /// Seed URL (its host must pass the domain allow-list)
        url: String,

        /// Depth bound; defaults to the configured default-max-depth
        #[arg(long)]
        depth: Option<u32>,

        /// Recorded as the job's submitter
        #[arg(long, default_value = "cli")]
        submitted_by: String,
    },

    /// Search the stored corpus
    Search {
        /// The query string
        query: String,

        /// Restrict results to one exact domain
        #[arg(long)]
        domain: Option<String>,

        /// Result page size; defaults to the configured default-limit
        #[arg(long)]
        limit: Option<usize>,

        /// Result offset, applied after ranking
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// List crawl jobs for a submitter, most recent first
    Jobs {
        #[arg(long, default_value = "cli")]
        submitted_by: String,

        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    match cli.command {
        Command::Crawl {
            url,
            depth,
            submitted_by,
        } => handle_crawl(config, &url, depth, &submitted_by).await?,
        Command::Search {
            query,
            domain,
            limit,
            offset,
        } => handle_search(config, &query, domain, limit, offset)?,
        Command::Jobs {
            submitted_by,
            limit,
        } => handle_jobs(config, &submitted_by, limit)?,
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ygglens=info,warn"),
            1 => EnvFilter::new("ygglens=debug,info"),
            2 => EnvFilter::new("ygglens=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Opens storage and wires the shared components exactly once
fn build_orchestrator(
    config: &Arc<Config>,
) -> anyhow::Result<(Orchestrator, Arc<Mutex<SqliteStorage>>)> {
    let storage = Arc::new(Mutex::new(SqliteStorage::new(Path::new(
        &config.storage.database_path,
    ))?));

    let user_agent = config.user_agent.agent_string();

    let compliance = Arc::new(ComplianceEngine::new(
        RobotsCache::new(),
        user_agent.clone(),
        Duration::from_secs(config.crawler.robots_timeout_secs),
    )?);

    let renderer = Arc::new(HttpRenderer::new(
        user_agent,
        Duration::from_secs(config.crawler.nav_timeout_secs),
    ));
    let extractor = Arc::new(Extractor::new(renderer));

    let orchestrator = Orchestrator::new(
        config.clone(),
        storage.clone(),
        compliance,
        extractor,
        VisitedSet::new(),
    );

    Ok((orchestrator, storage))
}

/// Handles the crawl subcommand: runs one job to completion
async fn handle_crawl(
    config: Config,
    url: &str,
    depth: Option<u32>,
    submitted_by: &str,
) -> anyhow::Result<()> {
    let config = Arc::new(config);
    let (orchestrator, _storage) = build_orchestrator(&config)?;

    let job = orchestrator.submit_and_wait(url, depth, submitted_by).await?;

    println!("Job:             {}", job.id);
    println!("Status:          {}", job.status.to_db_string());
    println!("Pages processed: {}", job.pages_processed);
    if let Some(error) = &job.error {
        println!("Error:           {}", error);
    }

    Ok(())
}

/// Handles the search subcommand
fn handle_search(
    config: Config,
    query: &str,
    domain: Option<String>,
    limit: Option<usize>,
    offset: usize,
) -> anyhow::Result<()> {
    let storage = Arc::new(Mutex::new(SqliteStorage::new(Path::new(
        &config.storage.database_path,
    ))?));
    let engine = SearchEngine::new(storage, config.search.clone());

    let request = SearchQuery {
        query: query.to_string(),
        domain,
        limit: limit.unwrap_or(config.search.default_limit),
        offset,
    };

    let response = engine.search(&request)?;

    println!(
        "{} results for \"{}\" (showing {} from offset {})\n",
        response.total,
        response.query,
        response.results.len(),
        response.offset
    );

    for (index, hit) in response.results.iter().enumerate() {
        println!(
            "{:2}. [{:>7.2}] {}",
            response.offset + index + 1,
            hit.score,
            hit.url
        );
        if !hit.title.is_empty() {
            println!("    {}", hit.title);
        }
        if !hit.snippet.is_empty() {
            println!("    {}", hit.snippet);
        }
        println!();
    }

    Ok(())
}

/// Handles the jobs subcommand
fn handle_jobs(config: Config, submitted_by: &str, limit: usize) -> anyhow::Result<()> {
    let storage = SqliteStorage::new(Path::new(&config.storage.database_path))?;
    let jobs = storage.find_jobs_by_submitter(submitted_by, limit)?;

    if jobs.is_empty() {
        println!("No jobs for submitter '{}'", submitted_by);
        return Ok(());
    }

    for job in jobs {
        println!(
            "{}  {:<9}  {:>4} pages  depth {}  {}",
            job.submitted_at,
            job.status.to_db_string(),
            job.pages_processed,
            job.max_depth,
            job.url
        );
        if let Some(error) = &job.error {
            println!("    error: {}", error);
        }
    }

    Ok(())
}
