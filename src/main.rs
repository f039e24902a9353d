//! Tender-Harvest main entry point
//!
//! This is the command-line interface for the Tender-Harvest ingestion
//! pipeline.

use chrono::{DateTime, NaiveDate};
use clap::Parser;
use std::path::{Path, PathBuf};
use tender_harvest::config::{load_config_with_hash, Config};
use tender_harvest::harvest::Harvester;
use tender_harvest::storage::{ArticleFilter, SqliteStorage, Storage};
use tracing_subscriber::EnvFilter;

/// Tender-Harvest: a procurement portal ingestion pipeline
///
/// Tender-Harvest walks the portal's category tree, traverses each
/// category's paginated listing, enriches every article with a detail
/// fetch, and upserts the merged result into a SQLite store. Re-running is
/// safe: writes are idempotent on the portal's own identifiers.
#[derive(Parser, Debug)]
#[command(name = "tender-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A procurement portal ingestion pipeline", long_about = None)]
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

    /// Validate config and show what would be harvested without issuing requests
    #[arg(long, conflicts_with_all = ["stats", "categories", "search"])]
    dry_run: bool,

    /// Show statistics from the store and exit
    #[arg(long, conflicts_with_all = ["dry_run", "categories", "search"])]
    stats: bool,

    /// List stored categories and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "search"])]
    categories: bool,

    /// Search stored articles and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats", "categories"])]
    search: bool,

    /// Title substring filter (case-insensitive)
    #[arg(long, requires = "search")]
    title: Option<String>,

    /// Local category ID filter
    #[arg(long, requires = "search")]
    category_id: Option<i64>,

    /// Project name substring filter
    #[arg(long, requires = "search")]
    project: Option<String>,

    /// Purchase name substring filter (case-insensitive)
    #[arg(long, requires = "search")]
    purchase: Option<String>,

    /// District name substring filter (case-insensitive)
    #[arg(long, requires = "search")]
    district: Option<String>,

    /// Exact procurement method filter (case-insensitive)
    #[arg(long, requires = "search")]
    method: Option<String>,

    /// Supplier name substring filter (case-insensitive)
    #[arg(long, requires = "search")]
    supplier: Option<String>,

    /// Publish date range start (YYYY-MM-DD)
    #[arg(long, requires = "search")]
    published_from: Option<NaiveDate>,

    /// Publish date range end, inclusive (YYYY-MM-DD)
    #[arg(long, requires = "search")]
    published_to: Option<NaiveDate>,

    /// Minimum budget price
    #[arg(long, requires = "search")]
    budget_min: Option<f64>,

    /// Maximum budget price
    #[arg(long, requires = "search")]
    budget_max: Option<f64>,

    /// Minimum total contract amount
    #[arg(long, requires = "search")]
    amount_min: Option<f64>,

    /// Maximum total contract amount
    #[arg(long, requires = "search")]
    amount_max: Option<f64>,

    /// Bid opening range start (YYYY-MM-DD)
    #[arg(long, requires = "search")]
    bid_from: Option<NaiveDate>,

    /// Bid opening range end, inclusive (YYYY-MM-DD)
    #[arg(long, requires = "search")]
    bid_to: Option<NaiveDate>,

    /// Result page number
    #[arg(long, default_value_t = 1, requires = "search")]
    page: u32,

    /// Results per page (capped at 100)
    #[arg(long, default_value_t = 20, requires = "search")]
    per_page: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.categories {
        handle_categories(&config)?;
    } else if cli.search {
        handle_search(&config, &cli)?;
    } else {
        handle_harvest(config).await?;
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
            0 => EnvFilter::new("tender_harvest=info,warn"),
            1 => EnvFilter::new("tender_harvest=debug,info"),
            2 => EnvFilter::new("tender_harvest=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &Config) {
    println!("=== Tender-Harvest Dry Run ===\n");

    println!("Portal:");
    println!("  Base URL: {}", config.portal.base_url);
    println!(
        "  Tree root: parentId={}, siteId={}",
        config.portal.tree_parent_id, config.portal.tree_site_id
    );
    println!("  Code prefix: {}", config.portal.category_code_prefix);
    println!("  Page size: {}", config.portal.page_size);
    println!(
        "  Excluded district prefixes: {:?}",
        config.portal.exclude_district_prefixes
    );

    println!("\nCrawler:");
    println!(
        "  Timeouts (tree/listing/detail): {}ms / {}ms / {}ms",
        config.crawler.tree_timeout_ms,
        config.crawler.listing_timeout_ms,
        config.crawler.detail_timeout_ms
    );
    println!(
        "  Delays (page/detail): {}ms / {}ms",
        config.crawler.page_delay_ms, config.crawler.detail_delay_ms
    );
    println!("  Max categories: {}", cap_display(config.crawler.max_categories));
    println!(
        "  Max pages per category: {}",
        cap_display(config.crawler.max_pages_per_category)
    );
    println!(
        "  Max articles per category: {}",
        cap_display(config.crawler.max_articles_per_category)
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
}

fn cap_display(cap: Option<u32>) -> String {
    cap.map(|c| c.to_string())
        .unwrap_or_else(|| "unlimited".to_string())
}

/// Handles the --stats mode: shows statistics from the store
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use tender_harvest::output::{load_statistics, print_statistics};

    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --categories mode: lists stored categories
fn handle_categories(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let categories = storage.list_categories()?;

    println!("Categories ({}):", categories.len());
    for category in categories {
        println!(
            "  [{}] {} ({}) {}",
            category.id,
            category.name,
            category.category_code,
            category.path_name.as_deref().unwrap_or("")
        );
    }

    Ok(())
}

/// Handles the --search mode: runs a filtered article search
fn handle_search(config: &Config, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    let filter = ArticleFilter {
        title: cli.title.clone(),
        category_id: cli.category_id,
        project_name: cli.project.clone(),
        purchase_name: cli.purchase.clone(),
        district_name: cli.district.clone(),
        procurement_method: cli.method.clone(),
        supplier_name: cli.supplier.clone(),
        publish_date_start: cli.published_from,
        publish_date_end: cli.published_to,
        budget_price_min: cli.budget_min,
        budget_price_max: cli.budget_max,
        total_contract_amount_min: cli.amount_min,
        total_contract_amount_max: cli.amount_max,
        bid_opening_time_start: cli.bid_from,
        bid_opening_time_end: cli.bid_to,
    };

    let results = storage.search_articles(&filter, cli.page, cli.per_page)?;

    println!(
        "Page {}/{} ({} articles total):\n",
        results.page, results.total_pages, results.total_articles
    );
    for article in &results.articles {
        println!(
            "  [{}] {} ({})",
            article.id,
            article.title.as_deref().unwrap_or("No title"),
            article.article_api_id
        );
        println!(
            "      published: {}  budget: {}  district: {}",
            format_ms_date(article.publish_date),
            article
                .budget_price
                .map(|b| b.to_string())
                .unwrap_or_else(|| "-".to_string()),
            article.district_name.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

/// Formats a millisecond epoch as a date, or "-" when absent
fn format_ms_date(ms: Option<i64>) -> String {
    ms.and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut harvester = Harvester::new(config)?;

    match harvester.run().await {
        Ok(summary) => {
            println!("=== Harvest Summary ===");
            println!("Categories processed: {}", summary.categories_processed);
            println!("Articles considered: {}", summary.articles_considered);
            println!("Details fetched: {}", summary.details_fetched);
            println!("Articles saved: {}", summary.articles_saved);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
