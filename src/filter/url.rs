// src/filter/url.rs
// =============================================================================
// URL normalization and validation.
//
// Every href we find on a page goes through two steps before it can reach
// the frontier:
//
// 1. normalize(): resolve it against the page URL (so "/x.html" becomes
//    "https://host/x.html") and drop any "#fragment". Two links that only
//    differ by fragment point at the same document, so they must compare
//    equal.
// 2. is_valid(): http/https only, host inside the allow-list, and the path
//    must not end in a binary/media/document extension.
//
// The domain check is done on label boundaries: "cal.ics.uci.edu" is a
// subdomain of "ics.uci.edu", but "notics.uci.edu" is not.
// =============================================================================

use std::collections::HashSet;
use tracing::debug;
use url::Url;

use crate::config::CrawlConfig;
use crate::error::CrawlError;

// Resolves `href` against `base` and strips the fragment
//
// Absolute hrefs ignore the base, relative ones are joined to it following
// the usual URI resolution rules (the same thing a browser does).
pub fn resolve(base: &Url, href: &str) -> Result<Url, CrawlError> {
    let mut url = base
        .join(href.trim())
        .map_err(|e| CrawlError::malformed(href, e))?;
    url.set_fragment(None);
    Ok(url)
}

// Parses an absolute URL string and strips its fragment
pub fn canonicalize(raw: &str) -> Result<Url, CrawlError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| CrawlError::malformed(raw, e))?;
    url.set_fragment(None);
    Ok(url)
}

// String-level convenience around resolve(): None when either side is
// unparsable. Malformed input is never an error for the caller, just a link
// we skip.
pub fn normalize(base: &str, href: &str) -> Option<String> {
    let base = match canonicalize(base) {
        Ok(url) => url,
        Err(e) => {
            debug!(error = %e, "skipping href with malformed base");
            return None;
        }
    };

    match resolve(&base, href) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            debug!(error = %e, "skipping malformed href");
            None
        }
    }
}

// Scheme, domain and extension rules applied to every candidate link
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    allowed_domains: Vec<String>,
    denied_extensions: HashSet<String>,
}

impl UrlPolicy {
    pub fn new<D, E>(allowed_domains: D, denied_extensions: E) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Self {
            allowed_domains: allowed_domains
                .into_iter()
                .map(|d| d.as_ref().trim_matches('.').to_ascii_lowercase())
                .collect(),
            denied_extensions: denied_extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(&config.allowed_domains, &config.denied_extensions)
    }

    // String entry point: malformed URLs are simply invalid
    pub fn is_valid(&self, raw: &str) -> bool {
        match Url::parse(raw) {
            Ok(url) => self.accepts(&url),
            Err(e) => {
                debug!(url = raw, error = %e, "malformed URL treated as invalid");
                false
            }
        }
    }

    // Checks run in order: scheme, domain, extension
    pub fn accepts(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        let Some(host) = url.host_str() else {
            return false;
        };
        if !self.is_allowed_host(host) {
            return false;
        }

        !self.has_denied_extension(url.path())
    }

    // Suffix match on whole labels, never a plain substring match
    pub fn is_allowed_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.allowed_domains
            .iter()
            .any(|domain| is_same_or_subdomain(&host, domain))
    }

    fn has_denied_extension(&self, path: &str) -> bool {
        match path_extension(path) {
            Some(ext) => self.denied_extensions.contains(&ext),
            None => false,
        }
    }
}

impl Default for UrlPolicy {
    fn default() -> Self {
        Self::from_config(&CrawlConfig::default())
    }
}

// True when `host` is `domain` itself or ends in ".<domain>"
pub fn is_same_or_subdomain(host: &str, domain: &str) -> bool {
    match host.strip_suffix(domain) {
        Some("") => true,
        Some(prefix) => prefix.ends_with('.'),
        None => false,
    }
}

// Lower-cased extension of the last path segment, if it has one
fn path_extension(path: &str) -> Option<String> {
    let last_segment = path.rsplit('/').next()?;
    let (stem, ext) = last_segment.rsplit_once('.')?;
    if stem.is_empty() && ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
