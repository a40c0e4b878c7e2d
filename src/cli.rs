// src/cli.rs
// =============================================================================
// Command-line interface, built with clap's derive API.
//
// Three subcommands:
// - crawl: run the crawler from one or more seed URLs
// - report: render the report from an existing checkpoint
// - check: show how the URL filters judge a URL (debugging aid)
//
// Every flag on `crawl` is optional. When given, it overrides the matching
// field of CrawlConfig (defaults < --config file < flags).
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "uci-crawler",
    version,
    about = "A polite web crawler for the UCI ICS, CS, Informatics and Statistics domains",
    long_about = "uci-crawler crawls the UCI departmental web, skipping crawler traps, \
                  near-duplicate pages and low-content pages, and reports word and \
                  subdomain statistics. Progress is checkpointed so a crawl can resume."
)]
pub struct Cli {
    /// Show debug logs, including why each page was skipped
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl starting from one or more seed URLs
    ///
    /// Example: uci-crawler crawl https://www.ics.uci.edu https://www.stat.uci.edu --max-pages 500
    Crawl {
        /// Seed URLs (must be inside the allowed domains)
        #[arg(required = true)]
        seeds: Vec<String>,

        /// JSON config file; fields not mentioned keep their defaults
        #[arg(long)]
        config: Option<PathBuf>,

        /// Stop after this many fetches
        #[arg(long)]
        max_pages: Option<usize>,

        /// Number of fetches in flight at once
        #[arg(long)]
        concurrency: Option<usize>,

        /// Checkpoint file to resume from and write to
        #[arg(long)]
        checkpoint: Option<PathBuf>,

        /// Where to write the report when the crawl ends
        #[arg(long)]
        report: Option<PathBuf>,

        /// Ignore any existing checkpoint and start from scratch
        #[arg(long)]
        fresh: bool,
    },

    /// Build the report from a checkpoint without crawling
    Report {
        /// JSON config file (for report domain and top-word count)
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        checkpoint: Option<PathBuf>,

        /// Also write the text report to this file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the normalized form, validity and trap verdict for URLs
    ///
    /// Example: uci-crawler check "https://wiki.ics.uci.edu/doku.php?do=edit"
    Check {
        #[arg(required = true)]
        urls: Vec<String>,

        /// Resolve the URLs as hrefs found on this page
        #[arg(long)]
        base: Option<String>,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_crawl_flags() {
        let cli = Cli::parse_from([
            "uci-crawler",
            "crawl",
            "https://www.ics.uci.edu",
            "--max-pages",
            "10",
            "--fresh",
            "-v",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Crawl {
                seeds,
                max_pages,
                fresh,
                concurrency,
                ..
            } => {
                assert_eq!(seeds, vec!["https://www.ics.uci.edu"]);
                assert_eq!(max_pages, Some(10));
                assert!(fresh);
                assert_eq!(concurrency, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_crawl_requires_a_seed() {
        assert!(Cli::try_parse_from(["uci-crawler", "crawl"]).is_err());
    }
}
