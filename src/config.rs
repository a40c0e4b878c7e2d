// src/config.rs
// =============================================================================
// Crawl configuration.
//
// Every tunable the crawler uses lives in CrawlConfig. Values come from three
// layers, lowest precedence first:
//   1. Built-in defaults (Default impl below)
//   2. An optional JSON file passed with --config
//   3. Command-line flags (applied in main.rs)
//
// #[serde(default)] means a config file only has to mention the fields it
// wants to change; everything else keeps its default.
// =============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Domains (and their subdomains) the crawler is allowed to visit
pub const DEFAULT_ALLOWED_DOMAINS: &[&str] = &[
    "ics.uci.edu",
    "cs.uci.edu",
    "informatics.uci.edu",
    "stat.uci.edu",
];

/// Binary, media and document extensions that are never worth fetching
pub const DEFAULT_DENIED_EXTENSIONS: &[&str] = &[
    "css", "js", "bmp", "gif", "jpg", "jpeg", "ico", "png", "tif", "tiff", "mid", "mp2", "mp3",
    "mp4", "wav", "avi", "mov", "mpeg", "ram", "m4v", "mkv", "ogg", "ogv", "pdf", "ps", "eps",
    "tex", "ppt", "pptx", "pps", "doc", "docx", "xls", "xlsx", "names", "data", "dat", "exe",
    "bz2", "tar", "msi", "bin", "7z", "psd", "dmg", "iso", "epub", "dll", "cnf", "tgz", "sha1",
    "thmx", "mso", "arff", "rtf", "jar", "csv", "rm", "smil", "wmv", "swf", "wma", "zip", "rar",
    "gz", "ical", "djvu", "apk", "bak", "tmp", "svg",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Hosts must equal one of these or be a subdomain of one
    pub allowed_domains: Vec<String>,
    /// Case-insensitive path extensions to skip
    pub denied_extensions: Vec<String>,
    /// Pages with fewer whitespace-separated words are dropped
    pub min_word_count: usize,
    /// Bodies larger than this are dropped (1 MiB by default)
    pub max_body_bytes: usize,
    /// Fingerprints closer than this many bits are near-duplicates
    pub duplicate_threshold: u32,
    /// User-agent token robots.txt groups are evaluated against
    pub robots_agent: String,
    /// User-Agent header sent with every request
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Pause between fetch batches
    pub politeness_delay_ms: u64,
    /// Number of fetches in flight at once
    pub concurrency: usize,
    /// Stop after this many fetches (None = until the frontier is empty)
    pub max_pages: Option<usize>,
    pub checkpoint_path: PathBuf,
    pub report_path: PathBuf,
    /// Only subdomains of this domain appear in the report
    pub report_domain: String,
    /// How many of the most frequent words the report lists
    pub top_words: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            allowed_domains: DEFAULT_ALLOWED_DOMAINS.iter().map(|d| d.to_string()).collect(),
            denied_extensions: DEFAULT_DENIED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            min_word_count: 50,
            max_body_bytes: 1024 * 1024,
            duplicate_threshold: 5,
            robots_agent: "*".to_string(),
            user_agent: concat!("uci-crawler/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 10,
            politeness_delay_ms: 100,
            concurrency: 4,
            max_pages: None,
            checkpoint_path: PathBuf::from("crawler_checkpoint.json"),
            report_path: PathBuf::from("crawler_report.txt"),
            report_domain: "ics.uci.edu".to_string(),
            top_words: 50,
        }
    }
}

impl CrawlConfig {
    // Loads defaults, overlaid with the JSON file at `path` if one is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: CrawlConfig = serde_json::from_str(&raw)
            .with_context(|| format!("invalid config file {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.allowed_domains.is_empty() {
            anyhow::bail!("allowed_domains must not be empty");
        }
        if self.concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }
        if self.duplicate_threshold > 64 {
            anyhow::bail!("duplicate_threshold cannot exceed 64 bits");
        }
        Ok(())
    }
}
