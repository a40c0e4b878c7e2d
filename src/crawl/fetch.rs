// src/crawl/fetch.rs
// =============================================================================
// The fetch collaborator.
//
// The crawl pipeline never talks to reqwest directly. It goes through the
// PageFetcher trait so that:
// - the real crawler uses HttpFetcher (reqwest, timeouts, size cap)
// - tests use an in-memory stub and never touch the network
//
// HttpFetcher deliberately does NOT follow redirects. A 3xx response is
// handed back as-is so the content filter can turn its Location header into
// a frontier entry (which then goes through the same validation as any
// other link).
// =============================================================================

use async_trait::async_trait;
use reqwest::{redirect, Client};
use std::time::Duration;

use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::filter::FetchedPage;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, CrawlError>;
}

pub struct HttpFetcher {
    client: Client,
    // We stop reading one byte past this so oversized bodies are detectable
    // without downloading all of them
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .redirect(redirect::Policy::none())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| CrawlError::fetch("<client>", e))?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, CrawlError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CrawlError::fetch(url, describe(&e)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| CrawlError::fetch(url, describe(&e)))?
        {
            body.extend_from_slice(&chunk);
            if body.len() > self.max_body_bytes {
                break;
            }
        }

        Ok(FetchedPage {
            status,
            headers,
            body: Some(body),
        })
    }
}

// Short, readable reason for a reqwest failure
fn describe(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        "connection failed".to_string()
    } else {
        error.to_string()
    }
}
