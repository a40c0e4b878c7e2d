// src/politeness/gate.rs
// =============================================================================
// The politeness gate: "may we fetch this URL?"
//
// robots.txt is per origin (scheme + host + port), so the first time we see
// an origin we fetch "<scheme>://<host>/robots.txt", parse it, and cache the
// result for the rest of the process. Every later question about that
// origin is a pure cache lookup.
//
// Concurrency: several workers can hit a brand-new origin at the same time.
// Each cache slot is a tokio OnceCell, so exactly one of them performs the
// fetch and the others wait for its result.
//
// Failure policy is fail-open: if robots.txt can't be fetched (network
// error, timeout, server error, 404...), the origin is treated as fully
// allowed. Because that silently changes crawl behaviour, real fetch
// failures are logged at warn level.
// =============================================================================

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use url::Url;

use super::robots::RobotsPolicy;
use crate::crawl::PageFetcher;

// Redirect hops we follow when fetching robots.txt itself
const MAX_ROBOTS_REDIRECTS: usize = 5;

pub struct PolitenessGate {
    fetcher: Arc<dyn PageFetcher>,
    agent: String,
    cache: DashMap<String, Arc<OnceCell<Arc<RobotsPolicy>>>>,
}

impl PolitenessGate {
    pub fn new(fetcher: Arc<dyn PageFetcher>, agent: &str) -> Self {
        Self {
            fetcher,
            agent: agent.to_string(),
            cache: DashMap::new(),
        }
    }

    pub async fn can_fetch(&self, url: &Url) -> bool {
        let Some(key) = robots_key(url) else {
            // No host means no origin to ask; such URLs never pass validation anyway
            debug!(url = %url, "no origin for robots lookup, allowing");
            return true;
        };

        let policy = self.policy_for(&key).await;

        let mut path = url.path().to_string();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }
        policy.allows(&path)
    }

    // Number of origins whose policy has been resolved
    #[cfg(test)]
    pub fn cached_origins(&self) -> usize {
        self.cache
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    async fn policy_for(&self, key: &str) -> Arc<RobotsPolicy> {
        // Clone the slot out of the map so no DashMap guard lives across an await
        let slot = Arc::clone(&self.cache.entry(key.to_string()).or_default());

        let policy = slot
            .get_or_init(|| async { Arc::new(self.load_policy(key).await) })
            .await;
        Arc::clone(policy)
    }

    async fn load_policy(&self, robots_url: &str) -> RobotsPolicy {
        let mut target = robots_url.to_string();

        for _ in 0..=MAX_ROBOTS_REDIRECTS {
            let page = match self.fetcher.fetch(&target).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(robots = robots_url, error = %e, "robots.txt fetch failed, allowing all (fail-open)");
                    return RobotsPolicy::AllowAll;
                }
            };

            match page.status {
                200 => {
                    let body = page.text().unwrap_or_default();
                    info!(robots = robots_url, "loaded robots.txt");
                    return RobotsPolicy::parse(&body, &self.agent);
                }
                300..=399 => {
                    let next = page
                        .header("location")
                        .and_then(|location| Url::parse(&target).ok()?.join(location).ok());
                    match next {
                        Some(next) => target = next.to_string(),
                        None => break,
                    }
                }
                401 | 403 => {
                    info!(robots = robots_url, status = page.status, "robots.txt access denied, disallowing origin");
                    return RobotsPolicy::DisallowAll;
                }
                400..=499 => {
                    debug!(robots = robots_url, status = page.status, "no robots.txt, allowing all");
                    return RobotsPolicy::AllowAll;
                }
                status => {
                    warn!(robots = robots_url, status, "robots.txt unavailable, allowing all (fail-open)");
                    return RobotsPolicy::AllowAll;
                }
            }
        }

        warn!(robots = robots_url, "robots.txt redirect chain unusable, allowing all (fail-open)");
        RobotsPolicy::AllowAll
    }
}

// "<scheme>://<host>[:port]/robots.txt" for the URL's origin
pub fn robots_key(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}/robots.txt", url.scheme(), host, port),
        None => format!("{}://{}/robots.txt", url.scheme(), host),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::fetch::testing::StubFetcher;
    use crate::filter::FetchedPage;

    const ROBOTS_URL: &str = "https://www.ics.uci.edu/robots.txt";

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    fn stub_with_robots(body: &str) -> Arc<StubFetcher> {
        Arc::new(
            StubFetcher::new().with_page(ROBOTS_URL, FetchedPage::new(200).with_body(body)),
        )
    }

    #[test]
    fn test_robots_key() {
        assert_eq!(
            robots_key(&url("https://www.ics.uci.edu/a/b?c=d")).as_deref(),
            Some("https://www.ics.uci.edu/robots.txt")
        );
        assert_eq!(
            robots_key(&url("http://host.ics.uci.edu:8080/x")).as_deref(),
            Some("http://host.ics.uci.edu:8080/robots.txt")
        );
    }

    #[tokio::test]
    async fn test_rules_are_applied() {
        let stub = stub_with_robots("User-agent: *\nDisallow: /private/\n");
        let gate = PolitenessGate::new(stub, "*");

        assert!(gate.can_fetch(&url("https://www.ics.uci.edu/about.html")).await);
        assert!(!gate.can_fetch(&url("https://www.ics.uci.edu/private/x.html")).await);
    }

    #[tokio::test]
    async fn test_query_is_part_of_the_checked_path() {
        let stub = stub_with_robots("User-agent: *\nDisallow: /search?\n");
        let gate = PolitenessGate::new(stub, "*");

        assert!(gate.can_fetch(&url("https://www.ics.uci.edu/search")).await);
        assert!(!gate.can_fetch(&url("https://www.ics.uci.edu/search?q=x")).await);
    }

    #[tokio::test]
    async fn test_policy_fetched_once_per_origin() {
        let stub = stub_with_robots("User-agent: *\nDisallow:\n");
        let gate = PolitenessGate::new(stub.clone(), "*");

        for path in ["/a", "/b", "/c"] {
            let target = url(&format!("https://www.ics.uci.edu{path}"));
            assert!(gate.can_fetch(&target).await);
        }

        assert_eq!(stub.calls_to(ROBOTS_URL), 1);
        assert_eq!(gate.cached_origins(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_access_fetches_once() {
        let stub = stub_with_robots("User-agent: *\nDisallow: /no/\n");
        let gate = Arc::new(PolitenessGate::new(stub.clone(), "*"));

        let mut handles = Vec::new();
        for i in 0..16 {
            let gate = Arc::clone(&gate);
            handles.push(tokio::spawn(async move {
                gate.can_fetch(&url(&format!("https://www.ics.uci.edu/page{i}")))
                    .await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        assert_eq!(stub.calls_to(ROBOTS_URL), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_fails_open() {
        // The stub has no robots.txt at all, so the fetch errors out
        let stub = Arc::new(StubFetcher::new());
        let gate = PolitenessGate::new(stub.clone(), "*");

        assert!(gate.can_fetch(&url("https://down.ics.uci.edu/anything")).await);
        assert!(gate.can_fetch(&url("https://down.ics.uci.edu/else")).await);
        assert_eq!(stub.calls_to("https://down.ics.uci.edu/robots.txt"), 1);
    }

    #[tokio::test]
    async fn test_server_error_fails_open_and_forbidden_fails_closed() {
        let stub = Arc::new(
            StubFetcher::new()
                .with_page("https://broken.ics.uci.edu/robots.txt", FetchedPage::new(503))
                .with_page("https://locked.ics.uci.edu/robots.txt", FetchedPage::new(403)),
        );
        let gate = PolitenessGate::new(stub, "*");

        assert!(gate.can_fetch(&url("https://broken.ics.uci.edu/x")).await);
        assert!(!gate.can_fetch(&url("https://locked.ics.uci.edu/x")).await);
    }

    #[tokio::test]
    async fn test_robots_redirect_is_followed() {
        let stub = Arc::new(
            StubFetcher::new()
                .with_page(
                    "http://www.ics.uci.edu/robots.txt",
                    FetchedPage::new(301).with_header("Location", ROBOTS_URL),
                )
                .with_page(
                    ROBOTS_URL,
                    FetchedPage::new(200).with_body("User-agent: *\nDisallow: /secret\n"),
                ),
        );
        let gate = PolitenessGate::new(stub, "*");

        assert!(!gate.can_fetch(&url("http://www.ics.uci.edu/secret")).await);
        assert!(gate.can_fetch(&url("http://www.ics.uci.edu/open")).await);
    }
}
