// src/crawl/mod.rs
// =============================================================================
// Crawling: fetching pages and running them through the decision pipeline.
//
// Submodules:
// - fetch: the PageFetcher seam and its reqwest implementation
// - extract: HTML -> visible text + hrefs, and the tokenizer
// - pipeline: Crawler::process_page, the per-page decision sequence
// - queue: the breadth-first fetch loop with a bounded worker pool
// =============================================================================

pub mod fetch;
mod extract;
mod pipeline;
mod queue;

pub use fetch::{HttpFetcher, PageFetcher};
pub use pipeline::Crawler;
pub use queue::{run_crawl, CrawlLimits};
