//! Rental-Harvest main entry point
//!
//! This is the command-line interface for the Rental-Harvest marketplace harvester.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rental_harvest::config::{load_config_with_hash, Config};
use rental_harvest::crawler::{run_calendar, run_search, RefreshReport};
use rental_harvest::url::SearchParams;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Rental-Harvest: a short-term-rental marketplace harvester
///
/// Rental-Harvest crawls marketplace search results, deduplicates the
/// listings it finds, and keeps their booking calendars and pricing current.
#[derive(Parser, Debug)]
#[command(name = "rental-harvest")]
#[command(version)]
#[command(about = "A short-term-rental marketplace harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl every search page for a query and save the listings found
    Search {
        /// Free-text search query, e.g. "Lisbon, Portugal"
        query: String,

        /// Check-in date (YYYY-MM-DD)
        #[arg(long)]
        checkin: Option<NaiveDate>,

        /// Check-out date (YYYY-MM-DD)
        #[arg(long, requires = "checkin")]
        checkout: Option<NaiveDate>,

        /// Minimum nightly price
        #[arg(long)]
        price_min: Option<u32>,

        /// Maximum nightly price
        #[arg(long)]
        price_max: Option<u32>,

        /// Number of adult guests
        #[arg(long)]
        adults: Option<u32>,
    },

    /// Refresh calendars and pricing ("index" for every listing, or one listing id)
    Calendar {
        /// "index" or a listing id
        source: String,
    },

    /// Show statistics from the database and exit
    Stats,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Search {
            query,
            checkin,
            checkout,
            price_min,
            price_max,
            adults,
        } => {
            let params = SearchParams {
                checkin,
                checkout,
                price_min,
                price_max,
                adults,
                ..SearchParams::default()
            };
            handle_search(&config, &config_hash, &query, params).await?;
        }
        Command::Calendar { source } => handle_calendar(&config, &config_hash, &source).await?,
        Command::Stats => handle_stats(&config)?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rental_harvest=info,warn"),
            1 => EnvFilter::new("rental_harvest=debug,info"),
            2 => EnvFilter::new("rental_harvest=trace,debug"),
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

/// Handles the `search` command
async fn handle_search(
    config: &Config,
    config_hash: &str,
    query: &str,
    params: SearchParams,
) -> Result<(), Box<dyn std::error::Error>> {
    match run_search(config, config_hash, query, params).await {
        Ok(report) => {
            println!(
                "✓ {} listings saved for {:?} ({} duplicates skipped, {} pages)",
                report.new_listings, query, report.duplicates, report.pages
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Search failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the `calendar` command
async fn handle_calendar(
    config: &Config,
    config_hash: &str,
    source: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    use rental_harvest::output::render_listing_rates;

    match run_calendar(config, config_hash, source).await {
        Ok(RefreshReport::Index(summary)) => {
            println!(
                "✓ {} listings refreshed: {} with pricing, {} calendar only, {} delisted",
                summary.total(),
                summary.updated,
                summary.calendar_only,
                summary.delisted
            );
            Ok(())
        }
        Ok(RefreshReport::Listing(rates)) => {
            println!("{}", render_listing_rates(&rates)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Calendar refresh failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the `stats` command: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use rental_harvest::output::{load_statistics, print_statistics};
    use rental_harvest::storage::SqliteStorage;
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}
