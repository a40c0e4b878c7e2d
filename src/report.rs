// src/report.rs
// =============================================================================
// The end-of-crawl report.
//
// build_report() takes a read-only look at a CrawlState and produces a
// Report, which can be rendered two ways:
// - render_text(): the plain-text format written to crawler_report.txt
// - serde_json: the same data as JSON (`report --json`)
//
// Text layout:
//
//   Total Unique Pages: 1234
//   Longest Page: https://... with 5678 words
//
//   Top 50 Most Common Words:
//   research: 812
//   ...
//
//   Subdomains in ics.uci.edu:
//   vision.ics.uci.edu, 42
//   ...
// =============================================================================

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

use crate::state::CrawlState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubdomainCount {
    pub host: String,
    pub pages: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub unique_pages: usize,
    pub longest_page: Option<String>,
    pub longest_page_words: u64,
    pub top_words: Vec<WordCount>,
    pub domain: String,
    pub subdomains: Vec<SubdomainCount>,
}

pub fn build_report(state: &CrawlState, domain: &str, top_n: usize) -> Report {
    Report {
        unique_pages: state.crawled_count(),
        longest_page: state.longest.url.clone(),
        longest_page_words: state.longest.words,
        top_words: state
            .words
            .top(top_n)
            .into_iter()
            .map(|(word, count)| WordCount {
                word: word.to_string(),
                count,
            })
            .collect(),
        domain: domain.to_string(),
        subdomains: state
            .subdomains
            .within(domain)
            .into_iter()
            .map(|(host, pages)| SubdomainCount {
                host: host.to_string(),
                pages,
            })
            .collect(),
    }
}

impl Report {
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        // Writing into a String cannot fail, so the fmt::Results are ignored
        let _ = writeln!(out, "Total Unique Pages: {}", self.unique_pages);
        let _ = writeln!(
            out,
            "Longest Page: {} with {} words",
            self.longest_page.as_deref().unwrap_or("(none)"),
            self.longest_page_words
        );

        let _ = writeln!(out, "\nTop {} Most Common Words:", self.top_words.len());
        for entry in &self.top_words {
            let _ = writeln!(out, "{}: {}", entry.word, entry.count);
        }

        let _ = writeln!(out, "\nSubdomains in {}:", self.domain);
        for entry in &self.subdomains {
            let _ = writeln!(out, "{}, {}", entry.host, entry.pages);
        }

        out
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize report")
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render_text())
            .with_context(|| format!("failed to write report to {}", path.display()))
    }
}
