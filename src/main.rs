// src/main.rs
// =============================================================================
// Entry point of the uci-crawler CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging
// 3. Dispatch to the subcommand handler (crawl, report, check)
// 4. Exit with proper code (0 = success, 2 = error)
// =============================================================================

mod cli;
mod config;
mod crawl;
mod dedup;
mod error;
mod filter;
mod logging;
mod politeness;
mod report;
mod state;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use cli::{Cli, Commands};
use config::CrawlConfig;
use crawl::{run_crawl, CrawlLimits, Crawler, HttpFetcher, PageFetcher};
use filter::UrlPolicy;
use state::{checkpoint, CrawlState};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Crawl {
            seeds,
            config,
            max_pages,
            concurrency,
            checkpoint,
            report,
            fresh,
        } => {
            let mut config = CrawlConfig::load(config.as_deref())?;
            if max_pages.is_some() {
                config.max_pages = max_pages;
            }
            if let Some(concurrency) = concurrency {
                anyhow::ensure!(concurrency > 0, "--concurrency must be at least 1");
                config.concurrency = concurrency;
            }
            if let Some(path) = checkpoint {
                config.checkpoint_path = path;
            }
            if let Some(path) = report {
                config.report_path = path;
            }
            handle_crawl(config, &seeds, fresh).await
        }
        Commands::Report {
            config,
            checkpoint,
            report,
            json,
        } => {
            let mut config = CrawlConfig::load(config.as_deref())?;
            if let Some(path) = checkpoint {
                config.checkpoint_path = path;
            }
            handle_report(&config, report, json)
        }
        Commands::Check { urls, base, config } => {
            let config = CrawlConfig::load(config.as_deref())?;
            handle_check(&config, base.as_deref(), &urls)
        }
    }
}

// Crawls from the seeds (plus whatever the checkpoint still had pending),
// then saves a final checkpoint and writes the report
async fn handle_crawl(config: CrawlConfig, seeds: &[String], fresh: bool) -> Result<i32> {
    let state = if fresh {
        info!("--fresh given, ignoring any existing checkpoint");
        CrawlState::new(config.duplicate_threshold)
    } else {
        CrawlState::restore(&config.checkpoint_path, config.duplicate_threshold)
    };

    let fetcher: Arc<dyn PageFetcher> =
        Arc::new(HttpFetcher::new(&config).context("failed to build HTTP client")?);
    let crawler = Arc::new(Crawler::new(&config, Arc::clone(&fetcher), state));

    let added = crawler.seed(seeds).await;
    let pending = crawler.state().lock().await.pending();
    info!(seeds = added, pending, "starting crawl");
    if pending == 0 {
        warn!("nothing to crawl: every seed was invalid or already visited");
    }

    let limits = CrawlLimits {
        concurrency: config.concurrency,
        max_pages: config.max_pages,
        delay: Duration::from_millis(config.politeness_delay_ms),
    };
    let summary = run_crawl(Arc::clone(&crawler), fetcher, limits).await;

    let state = crawler.state().lock().await;
    checkpoint::save(&config.checkpoint_path, &state.snapshot())
        .context("failed to write final checkpoint")?;

    let report = report::build_report(&state, &config.report_domain, config.top_words);
    report.write_to(&config.report_path)?;

    println!(
        "Crawl finished: {} fetched, {} failed, {} disallowed, {} unique pages",
        summary.fetched, summary.failed, summary.disallowed, report.unique_pages
    );
    println!("Report saved to {}", config.report_path.display());
    Ok(0)
}

fn handle_report(config: &CrawlConfig, out: Option<PathBuf>, json: bool) -> Result<i32> {
    let snapshot = checkpoint::load(&config.checkpoint_path)?.with_context(|| {
        format!(
            "no checkpoint at {}; run a crawl first",
            config.checkpoint_path.display()
        )
    })?;

    let mut state = CrawlState::new(config.duplicate_threshold);
    state.merge_checkpoint(snapshot);
    let report = report::build_report(&state, &config.report_domain, config.top_words);

    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_text());
    }

    if let Some(path) = out {
        report.write_to(&path)?;
        eprintln!("Report saved to {}", path.display());
    }
    Ok(0)
}

// Prints how the filter layer sees each URL
fn handle_check(config: &CrawlConfig, base: Option<&str>, urls: &[String]) -> Result<i32> {
    let policy = UrlPolicy::from_config(config);

    println!("{:<70} {:<8} {:<20}", "URL", "VALID", "TRAP");
    println!("{}", "=".repeat(98));

    for raw in urls {
        let normalized = match base {
            Some(base) => filter::normalize(base, raw),
            None => filter::canonicalize(raw).ok().map(|url| url.to_string()),
        };

        let Some(url) = normalized else {
            println!("{:<70} {:<8} {:<20}", raw, "no", "(malformed)");
            continue;
        };

        let valid = if policy.is_valid(&url) { "yes" } else { "no" };
        let trap = filter::matched_signature(&url).unwrap_or("-");

        let url_display = if url.len() > 67 {
            format!("{}...", &url[..67])
        } else {
            url
        };
        println!("{:<70} {:<8} {:<20}", url_display, valid, trap);
    }

    Ok(0)
}
