// src/crawl/pipeline.rs
// =============================================================================
// The per-page decision pipeline.
//
// Crawler::process_page(url, response) is the one entry point. For each
// fetched page it runs, in order:
//
//   robots gate -> content filter -> (redirect? return its target and stop)
//   -> text extraction -> minimum word count -> near-duplicate check
//   -> tokenize + drop stopwords -> statistics -> mark visited
//   -> normalize/validate every href -> enqueue new links -> checkpoint
//
// and returns the links it newly added to the frontier. An empty Vec is the
// normal result for filtered content, not an error.
//
// Concurrency: all shared state lives in one tokio Mutex<CrawlState>. The
// CPU work that doesn't need the state (HTML parsing, fingerprinting,
// tokenizing, resolving links) happens before the lock is taken; everything
// that reads or writes the state, including the checkpoint write, happens
// under a single lock acquisition.
// =============================================================================

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use super::extract::{content_tokens, extract_page};
use super::fetch::PageFetcher;
use crate::config::CrawlConfig;
use crate::dedup::fingerprint;
use crate::error::Rejection;
use crate::filter::{self, should_process, FetchedPage, UrlPolicy, Verdict};
use crate::politeness::PolitenessGate;
use crate::state::{checkpoint, CrawlState};

pub struct Crawler {
    urls: UrlPolicy,
    gate: PolitenessGate,
    state: Mutex<CrawlState>,
    min_word_count: usize,
    max_body_bytes: usize,
    // None disables checkpointing (used by tests and dry runs)
    checkpoint_path: Option<PathBuf>,
}

impl Crawler {
    pub fn new(config: &CrawlConfig, fetcher: Arc<dyn PageFetcher>, state: CrawlState) -> Self {
        Self {
            urls: UrlPolicy::from_config(config),
            gate: PolitenessGate::new(fetcher, &config.robots_agent),
            state: Mutex::new(state),
            min_word_count: config.min_word_count,
            max_body_bytes: config.max_body_bytes,
            checkpoint_path: Some(config.checkpoint_path.clone()),
        }
    }

    #[cfg(test)]
    pub fn without_checkpoint(mut self) -> Self {
        self.checkpoint_path = None;
        self
    }

    pub fn state(&self) -> &Mutex<CrawlState> {
        &self.state
    }

    // Normalizes and validates seeds, then queues the ones not seen before
    pub async fn seed<I, S>(&self, seeds: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = self.state.lock().await;
        let mut added = 0;
        for seed in seeds {
            let seed = seed.as_ref();
            match filter::canonicalize(seed) {
                Ok(url) if self.urls.accepts(&url) => {
                    if state.try_enqueue(url.as_str()) {
                        added += 1;
                    }
                }
                Ok(_) => warn!(seed, "seed is outside the allowed domains, skipping"),
                Err(e) => warn!(error = %e, "skipping malformed seed"),
            }
        }
        added
    }

    pub async fn next_batch(&self, max: usize) -> Vec<String> {
        self.state.lock().await.next_batch(max)
    }

    // Robots check the fetch loop runs before spending a request
    pub async fn may_fetch(&self, raw: &str) -> bool {
        match Url::parse(raw) {
            Ok(url) => self.gate.can_fetch(&url).await,
            Err(_) => false,
        }
    }

    pub async fn process_page(&self, raw_url: &str, page: &FetchedPage) -> Vec<String> {
        let links = match self.run_pipeline(raw_url, page).await {
            Ok(links) => links,
            Err(reason) => {
                debug!(url = raw_url, %reason, "page rejected");
                Vec::new()
            }
        };
        self.finish(raw_url).await;
        links
    }

    // Releases a batch URL that will not reach process_page (fetch failed
    // or robots.txt disallowed it)
    pub async fn finish(&self, raw_url: &str) {
        self.state.lock().await.finish(raw_url);
    }

    async fn run_pipeline(
        &self,
        raw_url: &str,
        page: &FetchedPage,
    ) -> Result<Vec<String>, Rejection> {
        let url = match filter::canonicalize(raw_url) {
            Ok(url) => url,
            Err(e) => {
                debug!(error = %e, "cannot process page with malformed URL");
                return Ok(Vec::new());
            }
        };

        if !self.gate.can_fetch(&url).await {
            return Err(Rejection::Disallowed);
        }

        match should_process(url.as_str(), page, self.max_body_bytes) {
            Verdict::Accept => {}
            Verdict::RedirectTo(location) => return self.follow_redirect(&url, &location).await,
            Verdict::Reject(reason) => return Err(reason),
        }

        let html = page.text().unwrap_or_default();
        let extracted = extract_page(&html);
        if extracted.word_count() < self.min_word_count {
            return Err(Rejection::LowContent);
        }

        let fp = fingerprint(&extracted.text);
        let tokens = content_tokens(&extracted.text);
        let candidates: Vec<Url> = extracted
            .hrefs
            .iter()
            .filter_map(|href| filter::resolve(&url, href).ok())
            .filter(|link| self.urls.accepts(link))
            .collect();

        let mut state = self.state.lock().await;

        if state.is_near_duplicate(fp) {
            return Err(Rejection::DuplicateContent);
        }

        state.record_page(&url, &tokens);
        state.mark_crawled(&url);

        let mut added = Vec::new();
        for link in candidates {
            if state.try_enqueue(link.as_str()) {
                added.push(link.to_string());
            }
        }

        state.finish(raw_url);
        self.write_checkpoint(&state);
        Ok(added)
    }

    // A redirect's Location becomes the only outbound link, provided it
    // passes the same validation as any href and hasn't been seen yet
    async fn follow_redirect(&self, from: &Url, location: &str) -> Result<Vec<String>, Rejection> {
        let target = filter::resolve(from, location).map_err(|_| Rejection::InvalidRedirect)?;
        if !self.urls.accepts(&target) {
            return Err(Rejection::InvalidRedirect);
        }

        let mut state = self.state.lock().await;
        if state.try_enqueue(target.as_str()) {
            Ok(vec![target.to_string()])
        } else {
            Ok(Vec::new())
        }
    }

    fn write_checkpoint(&self, state: &CrawlState) {
        let Some(path) = &self.checkpoint_path else {
            return;
        };
        if let Err(e) = checkpoint::save(path, &state.snapshot()) {
            warn!(error = %e, "failed to write checkpoint");
        }
    }
}
