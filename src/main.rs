//! Linkmap main entry point
//!
//! This is the command-line interface for the Linkmap internal-link auditor.

use anyhow::Context;
use clap::Parser;
use linkmap::config::{load_profile_with_hash, CompiledProfile, SiteProfile};
use linkmap::output::{export_csv, generate_markdown_summary, write_csv};
use linkmap::storage::{open_storage, Storage};
use linkmap::{Coordinator, CrawlResult};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Linkmap: an internal-link auditor
///
/// Linkmap crawls a single site described by a TOML profile, builds the graph
/// of its internal links and reports every page ranked by inbound links,
/// with each backlink and its anchor text.
#[derive(Parser, Debug)]
#[command(name = "linkmap")]
#[command(version)]
#[command(about = "An internal-link auditor for a single website", long_about = None)]
struct Cli {
    /// Path to the TOML site profile
    #[arg(value_name = "PROFILE")]
    profile: PathBuf,

    /// Start URL (defaults to the profile's base-url)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Maximum number of pages to record (defaults to the profile's page-limit)
    #[arg(short, long, value_name = "PAGES")]
    limit: Option<usize>,

    /// Write the CSV report here instead of stdout
    #[arg(short, long, value_name = "CSV")]
    output: Option<PathBuf>,

    /// Also write a markdown summary
    #[arg(long, value_name = "MARKDOWN")]
    summary: Option<PathBuf>,

    /// Save the finished run to a SQLite database
    #[arg(long, value_name = "SQLITE")]
    database: Option<PathBuf>,

    /// Validate the profile and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading profile from: {}", cli.profile.display());
    let (profile, profile_hash) = match load_profile_with_hash(&cli.profile) {
        Ok((profile, hash)) => {
            tracing::info!("Profile loaded successfully (hash: {})", hash);
            (profile, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load profile: {}", e);
            return Err(e).context(format!("loading {}", cli.profile.display()));
        }
    };

    let base_url = cli.base_url.clone().unwrap_or_else(|| profile.start_url());
    let limit = cli.limit.unwrap_or(profile.crawler.page_limit);

    if cli.dry_run {
        return handle_dry_run(&profile, &base_url, limit);
    }

    let result = match handle_crawl(&profile, &base_url, limit).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Crawl failed: {:#}", e);
            return Err(e);
        }
    };

    write_outputs(&cli, &result, &profile_hash)
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so the CSV report can be piped from stdout.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkmap=info,warn"),
            1 => EnvFilter::new("linkmap=debug,info"),
            2 => EnvFilter::new("linkmap=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates the profile and shows the plan
fn handle_dry_run(profile: &SiteProfile, base_url: &str, limit: usize) -> anyhow::Result<()> {
    let compiled = CompiledProfile::compile(profile).context("compiling profile")?;
    linkmap::config::validate_base_url(base_url, compiled.domain())
        .context("validating start URL")?;

    println!("=== Linkmap Dry Run ===\n");

    println!("Site:");
    println!("  Domain: {}", profile.site.domain);
    println!("  Start URL: {}", base_url);
    println!("  Sitemaps: {}", profile.site.sitemap_paths.join(", "));
    println!("  Sitemaps from robots.txt: {}", profile.site.sitemap_from_robots);
    if !profile.site.keep_query_params.is_empty() {
        println!(
            "  Kept query parameters: {}",
            profile.site.keep_query_params.join(", ")
        );
    }

    println!("\nCrawler Configuration:");
    println!("  Page limit: {}", limit);
    println!("  Delay: {}ms", profile.crawler.delay_ms);
    println!("  Timeout: {}s", profile.crawler.timeout_secs);
    println!("  User agent: {}", profile.user_agent.header_value());

    println!("\nExtraction:");
    println!(
        "  Content selectors ({}): {}",
        profile.extract.content_selectors.len(),
        profile.extract.content_selectors.join(", ")
    );
    println!(
        "  Exclude selectors: {}",
        profile.extract.exclude_selectors.len()
    );
    println!(
        "  Title cleanup patterns: {}",
        profile.extract.title_cleanup.len()
    );

    println!("\nClassification:");
    println!("  Allow rules: {}", compiled.allow.len());
    println!("  Deny rules: {}", compiled.deny.len());
    println!("  Default policy: {:?}", compiled.default_policy);
    println!("  Cushion phrases: {}", compiled.cushion_phrases.len());
    println!(
        "  Exclusion URL patterns: {}",
        compiled.exclude_url_patterns.len()
    );

    println!("\n✓ Profile is valid");
    println!("✓ Would crawl up to {} pages starting at {}", limit, base_url);

    Ok(())
}

/// Handles the main crawl operation, wiring Ctrl-C to cancellation
async fn handle_crawl(
    profile: &SiteProfile,
    base_url: &str,
    limit: usize,
) -> anyhow::Result<CrawlResult> {
    let mut coordinator = Coordinator::new(base_url, profile, limit)?;

    let cancel = coordinator.cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; stopping after the current page");
            cancel.cancel();
        }
    });

    let result = coordinator.run().await?;
    Ok(result)
}

/// Writes the CSV report, and the summary and database snapshot if requested
fn write_outputs(cli: &Cli, result: &CrawlResult, profile_hash: &str) -> anyhow::Result<()> {
    match &cli.output {
        Some(path) => {
            write_csv(result, path).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Report written to: {}", path.display());
        }
        None => print!("{}", export_csv(result)?),
    }

    if let Some(path) = &cli.summary {
        generate_markdown_summary(result, path)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("Summary written to: {}", path.display());
    }

    if let Some(path) = &cli.database {
        let mut storage = open_storage(path)
            .with_context(|| format!("opening database {}", path.display()))?;
        let run_id = storage.save_result(result, profile_hash)?;
        tracing::info!("Run {} saved to: {}", run_id, path.display());
    }

    Ok(())
}
