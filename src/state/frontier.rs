// src/state/frontier.rs
// =============================================================================
// The mutable crawl state, owned by one object.
//
// CrawlState holds:
// - visited: every URL ever enqueued or processed. A URL gets in at most
//   once, and only then is it pushed onto the frontier.
// - frontier: FIFO queue of URLs waiting to be fetched.
// - in_flight: URLs handed out by next_batch and not yet finished. They are
//   written back into the checkpoint's frontier, so a crawl killed mid-batch
//   fetches them again on resume instead of losing them to the visited set.
// - crawled: pages that made it all the way through the pipeline. Drives
//   the page count and makes subdomain counting idempotent.
// - fingerprints: accepted page fingerprints for near-duplicate checks.
// - words / subdomains / longest: the report statistics.
//
// Nothing here is global. The orchestrator keeps one CrawlState behind a
// Mutex, and every worker goes through it, so "insert if absent" on the
// visited set is a single linearized operation.
// =============================================================================

use std::collections::{HashSet, VecDeque};
use std::path::Path;
use tracing::{info, warn};
use url::Url;

use super::checkpoint::{self, Checkpoint};
use super::stats::{LongestPage, SubdomainStats, WordStats};
use crate::dedup::FingerprintSet;

#[derive(Debug, Clone)]
pub struct CrawlState {
    visited: HashSet<String>,
    frontier: VecDeque<String>,
    in_flight: HashSet<String>,
    crawled: HashSet<String>,
    fingerprints: FingerprintSet,
    pub words: WordStats,
    pub subdomains: SubdomainStats,
    pub longest: LongestPage,
}

impl CrawlState {
    pub fn new(duplicate_threshold: u32) -> Self {
        Self {
            visited: HashSet::new(),
            frontier: VecDeque::new(),
            in_flight: HashSet::new(),
            crawled: HashSet::new(),
            fingerprints: FingerprintSet::new(duplicate_threshold),
            words: WordStats::default(),
            subdomains: SubdomainStats::default(),
            longest: LongestPage::default(),
        }
    }

    // Fresh state merged with the checkpoint at `path`, if there is a usable
    // one. A missing file is normal; a corrupt one is logged and ignored.
    pub fn restore(path: &Path, duplicate_threshold: u32) -> Self {
        let mut state = Self::new(duplicate_threshold);

        match checkpoint::load(path) {
            Ok(Some(snapshot)) => {
                state.merge_checkpoint(snapshot);
                info!(
                    path = %path.display(),
                    visited = state.visited.len(),
                    pending = state.frontier.len(),
                    "resumed from checkpoint"
                );
            }
            Ok(None) => info!(path = %path.display(), "no checkpoint found, starting fresh"),
            Err(e) => warn!(error = %e, "ignoring unreadable checkpoint, starting fresh"),
        }

        state
    }

    // Marks `url` visited and queues it. False if it was already seen.
    pub fn try_enqueue(&mut self, url: &str) -> bool {
        if !self.visited.insert(url.to_string()) {
            return false;
        }
        self.frontier.push_back(url.to_string());
        true
    }

    pub fn next_batch(&mut self, max: usize) -> Vec<String> {
        let take = max.min(self.frontier.len());
        let batch: Vec<String> = self.frontier.drain(..take).collect();
        self.in_flight.extend(batch.iter().cloned());
        batch
    }

    // A batch URL is done (processed, rejected, failed or disallowed)
    pub fn finish(&mut self, url: &str) {
        self.in_flight.remove(url);
    }

    pub fn pending(&self) -> usize {
        self.frontier.len()
    }

    #[cfg(test)]
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    #[cfg(test)]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn crawled_count(&self) -> usize {
        self.crawled.len()
    }

    // Near-duplicate check; a new fingerprint is remembered
    pub fn is_near_duplicate(&mut self, fingerprint: u64) -> bool {
        self.fingerprints.is_near_duplicate(fingerprint)
    }

    // Content statistics for one accepted page
    pub fn record_page(&mut self, url: &Url, tokens: &[String]) {
        self.words.record(tokens);
        self.longest.offer(url.as_str(), tokens.len() as u64);
    }

    // Marks a processed page visited; the host counter moves only the
    // first time a given URL is processed
    pub fn mark_crawled(&mut self, url: &Url) -> bool {
        self.visited.insert(url.to_string());
        if !self.crawled.insert(url.to_string()) {
            return false;
        }
        if let Some(host) = url.host_str() {
            self.subdomains.record(host);
        }
        true
    }

    pub fn snapshot(&self) -> Checkpoint {
        let mut visited_urls: Vec<String> = self.visited.iter().cloned().collect();
        visited_urls.sort();
        let mut crawled_urls: Vec<String> = self.crawled.iter().cloned().collect();
        crawled_urls.sort();

        // Unfinished batch URLs go back to the front of the queue
        let mut in_flight: Vec<String> = self.in_flight.iter().cloned().collect();
        in_flight.sort();
        let frontier = in_flight
            .into_iter()
            .chain(self.frontier.iter().cloned())
            .collect();

        Checkpoint {
            visited_urls,
            word_counts: self.words.as_map().clone(),
            subdomain_counts: self.subdomains.as_map().clone(),
            longest_page: (self.longest.url.clone(), self.longest.words),
            fingerprints: self.fingerprints.as_slice().to_vec(),
            crawled_urls,
            frontier,
        }
    }

    // Union for URL sets, addition for counts, max for the longest page.
    // Pending URLs are re-queued unless this state already knows them.
    pub fn merge_checkpoint(&mut self, snapshot: Checkpoint) {
        for url in snapshot.frontier {
            self.try_enqueue(&url);
        }
        self.visited.extend(snapshot.visited_urls);
        self.crawled.extend(snapshot.crawled_urls);
        self.fingerprints.restore(snapshot.fingerprints);
        self.words.merge(snapshot.word_counts);
        self.subdomains.merge(snapshot.subdomain_counts);
        let (url, words) = snapshot.longest_page;
        self.longest.merge(url, words);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn test_enqueue_at_most_once() {
        let mut state = CrawlState::new(5);
        assert!(state.try_enqueue("https://www.ics.uci.edu/a"));
        assert!(!state.try_enqueue("https://www.ics.uci.edu/a"));
        assert!(state.try_enqueue("https://www.ics.uci.edu/b"));

        assert_eq!(state.pending(), 2);
        assert_eq!(
            state.next_batch(10),
            vec!["https://www.ics.uci.edu/a", "https://www.ics.uci.edu/b"]
        );

        // Still visited after leaving the frontier
        assert!(!state.try_enqueue("https://www.ics.uci.edu/a"));
        assert_eq!(state.pending(), 0);
    }

    #[test]
    fn test_next_batch_is_fifo_and_bounded() {
        let mut state = CrawlState::new(5);
        for i in 0..5 {
            state.try_enqueue(&format!("https://www.ics.uci.edu/{i}"));
        }
        assert_eq!(
            state.next_batch(2),
            vec!["https://www.ics.uci.edu/0", "https://www.ics.uci.edu/1"]
        );
        assert_eq!(state.pending(), 3);
    }

    #[test]
    fn test_unfinished_batch_survives_restart() {
        let mut state = CrawlState::new(5);
        for i in 1..=3 {
            state.try_enqueue(&format!("https://www.ics.uci.edu/{i}"));
        }
        state.try_enqueue("https://www.ics.uci.edu/4");

        let batch = state.next_batch(3);
        assert_eq!(batch.len(), 3);
        state.mark_crawled(&url("https://www.ics.uci.edu/1"));
        state.finish("https://www.ics.uci.edu/1");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        checkpoint::save(&path, &state.snapshot()).unwrap();

        let mut resumed = CrawlState::restore(&path, 5);
        assert_eq!(resumed.pending(), 3);
        assert_eq!(
            resumed.next_batch(10),
            vec![
                "https://www.ics.uci.edu/2",
                "https://www.ics.uci.edu/3",
                "https://www.ics.uci.edu/4",
            ]
        );
        assert!(!resumed.try_enqueue("https://www.ics.uci.edu/1"));
    }

    #[test]
    fn test_subdomain_counted_once_per_url() {
        let mut state = CrawlState::new(5);
        let page = url("https://vision.ics.uci.edu/people.html");

        assert!(state.mark_crawled(&page));
        assert!(!state.mark_crawled(&page));
        assert!(state.mark_crawled(&url("https://vision.ics.uci.edu/other.html")));

        assert_eq!(state.subdomains.get("vision.ics.uci.edu"), 2);
        assert_eq!(state.crawled_count(), 2);
        assert!(state.is_visited("https://vision.ics.uci.edu/people.html"));
    }

    #[test]
    fn test_record_page_tracks_longest() {
        let mut state = CrawlState::new(5);
        let tokens: Vec<String> = ["alpha", "beta", "alpha"].iter().map(|s| s.to_string()).collect();
        state.record_page(&url("https://a.ics.uci.edu/"), &tokens);

        assert_eq!(state.words.get("alpha"), 2);
        assert_eq!(state.longest.words, 3);
        assert_eq!(state.longest.url.as_deref(), Some("https://a.ics.uci.edu/"));
    }

    #[test]
    fn test_snapshot_round_trip_through_file() {
        let mut state = CrawlState::new(5);
        let page = url("https://www.ics.uci.edu/");
        state.try_enqueue("https://www.ics.uci.edu/next");
        state.mark_crawled(&page);
        state.record_page(&page, &["informatics".to_string(), "research".to_string()]);
        state.is_near_duplicate(0xDEAD_BEEF);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        checkpoint::save(&path, &state.snapshot()).unwrap();

        let restored = CrawlState::restore(&path, 5);
        assert_eq!(restored.visited, state.visited);
        assert_eq!(restored.crawled, state.crawled);
        assert_eq!(restored.words, state.words);
        assert_eq!(restored.subdomains, state.subdomains);
        assert_eq!(restored.longest, state.longest);
        assert_eq!(restored.frontier, state.frontier);
        assert_eq!(restored.fingerprints.as_slice(), state.fingerprints.as_slice());
    }

    #[test]
    fn test_merge_is_additive() {
        let mut state = CrawlState::new(5);
        let page = url("https://www.ics.uci.edu/");
        state.record_page(&page, &["data".to_string()]);
        state.mark_crawled(&page);

        let snapshot = state.snapshot();
        state.merge_checkpoint(snapshot);

        assert_eq!(state.words.get("data"), 2);
        assert_eq!(state.subdomains.get("www.ics.uci.edu"), 2);
        assert_eq!(state.visited_count(), 1);
    }

    #[test]
    fn test_restore_from_corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        std::fs::write(&path, "not json at all").unwrap();

        let state = CrawlState::restore(&path, 5);
        assert_eq!(state.visited_count(), 0);
        assert!(state.words.is_empty());
    }

    #[test]
    fn test_restore_missing_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let state = CrawlState::restore(&dir.path().join("nope.json"), 5);
        assert_eq!(state.pending(), 0);
    }
}
