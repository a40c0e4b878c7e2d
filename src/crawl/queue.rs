// src/crawl/queue.rs
// =============================================================================
// The fetch loop: drains the frontier breadth-first.
//
// How it works:
// 1. Take up to `concurrency` URLs from the front of the frontier
// 2. Check robots.txt for each (skip disallowed ones without fetching)
// 3. Fetch them concurrently
// 4. Run every response through Crawler::process_page, which pushes new
//    links onto the back of the frontier
// 5. Sleep a little (politeness) and repeat until the frontier is empty or
//    the page budget is spent
//
// Fetching is the only parallel part. All decisions go through the single
// Crawler, whose state sits behind one Mutex.
// =============================================================================

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::fetch::PageFetcher;
use super::pipeline::Crawler;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Responses received (any status)
    pub fetched: usize,
    /// Fetches that failed outright (network error, timeout)
    pub failed: usize,
    /// URLs skipped because robots.txt disallows them
    pub disallowed: usize,
    /// New links added to the frontier
    pub discovered: usize,
}

pub struct CrawlLimits {
    pub concurrency: usize,
    pub max_pages: Option<usize>,
    pub delay: Duration,
}

enum Outcome {
    Processed(usize),
    Failed,
    Disallowed,
}

pub async fn run_crawl(
    crawler: Arc<Crawler>,
    fetcher: Arc<dyn PageFetcher>,
    limits: CrawlLimits,
) -> CrawlSummary {
    let mut summary = CrawlSummary::default();
    let concurrency = limits.concurrency.max(1);

    loop {
        let budget = match limits.max_pages {
            Some(max) => max.saturating_sub(summary.fetched + summary.failed),
            None => usize::MAX,
        };
        if budget == 0 {
            info!("page budget reached, stopping");
            break;
        }

        let batch = crawler.next_batch(concurrency.min(budget)).await;
        if batch.is_empty() {
            info!("frontier is empty, crawl complete");
            break;
        }

        let outcomes: Vec<Outcome> = stream::iter(batch)
            .map(|url| {
                let crawler = Arc::clone(&crawler);
                let fetcher = Arc::clone(&fetcher);
                async move { crawl_one(&crawler, &*fetcher, &url).await }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        for outcome in outcomes {
            match outcome {
                Outcome::Processed(links) => {
                    summary.fetched += 1;
                    summary.discovered += links;
                }
                Outcome::Failed => summary.failed += 1,
                Outcome::Disallowed => summary.disallowed += 1,
            }
        }

        let pending = crawler.state().lock().await.pending();
        info!(
            fetched = summary.fetched,
            failed = summary.failed,
            discovered = summary.discovered,
            pending,
            "batch done"
        );

        if !limits.delay.is_zero() {
            tokio::time::sleep(limits.delay).await;
        }
    }

    summary
}

async fn crawl_one(crawler: &Crawler, fetcher: &dyn PageFetcher, url: &str) -> Outcome {
    if !crawler.may_fetch(url).await {
        debug!(url, "disallowed by robots.txt, not fetching");
        crawler.finish(url).await;
        return Outcome::Disallowed;
    }

    match fetcher.fetch(url).await {
        Ok(page) => {
            debug!(url, status = page.status, "fetched");
            let links = crawler.process_page(url, &page).await;
            Outcome::Processed(links.len())
        }
        Err(e) => {
            warn!(error = %e, "fetch failed, skipping page");
            crawler.finish(url).await;
            Outcome::Failed
        }
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why batches instead of a long-running worker pool?
//    - A batch ends at a known point, which is where the politeness delay
//      and the page budget are checked
//    - Pages found while a batch runs go to the back of the frontier and are
//      picked up by a later batch, so the order stays breadth-first
//
// 2. buffer_unordered(n):
//    - Runs up to n futures at once and yields results as they finish
//    - Same tool the link checker used for HTTP requests; here every future
//      is "robots check, fetch, process"
//
// 3. Who fetches robots.txt?
//    - Crawler::may_fetch asks the PolitenessGate, which fetches each
//      origin's robots.txt once and caches the parsed rules
// -----------------------------------------------------------------------------
