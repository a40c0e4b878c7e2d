// src/state/mod.rs
// =============================================================================
// Crawl state: frontier, visited set, fingerprints, statistics, and the
// checkpoint file that lets a crawl resume after a restart.
// =============================================================================

pub mod checkpoint;
mod frontier;
mod stats;

pub use frontier::CrawlState;
