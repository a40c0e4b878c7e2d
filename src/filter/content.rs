// src/filter/content.rs
// =============================================================================
// Response-level filtering.
//
// Before we spend any time parsing HTML we look at what the fetcher handed
// us and decide one of three things:
//
//   Accept          -> go on to text extraction
//   RedirectTo(url) -> the Location header becomes the only outbound link
//   Reject(reason)  -> drop the page silently
//
// The checks run in a fixed order and the first one that fires decides:
//   1. status 600-699        -> reject
//   2. status 300-399        -> redirect if Location is present, else reject
//   3. status != 200 / no body -> reject
//   4. body > size limit     -> reject
//   5. URL is a crawler trap -> reject
// =============================================================================

use std::collections::HashMap;

use super::trap;
use crate::error::Rejection;

// What the fetch collaborator gives us for one URL
//
// Header names are stored lower-cased so lookups are case-insensitive,
// like HTTP header names themselves.
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl FetchedPage {
    #[cfg(test)]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    #[cfg(test)]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    // Body decoded as text, invalid UTF-8 replaced rather than failing
    pub fn text(&self) -> Option<String> {
        self.body
            .as_deref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    /// Raw Location header value, not yet resolved or validated
    RedirectTo(String),
    Reject(Rejection),
}

pub fn should_process(url: &str, page: &FetchedPage, max_body_bytes: usize) -> Verdict {
    if (600..700).contains(&page.status) {
        return Verdict::Reject(Rejection::NonStandardStatus);
    }

    if (300..400).contains(&page.status) {
        return match page.header("location").map(str::trim) {
            Some(location) if !location.is_empty() => Verdict::RedirectTo(location.to_string()),
            _ => Verdict::Reject(Rejection::RedirectWithoutTarget),
        };
    }

    if page.status != 200 {
        return Verdict::Reject(Rejection::UnsuccessfulStatus);
    }
    let Some(body) = page.body.as_ref() else {
        return Verdict::Reject(Rejection::MissingBody);
    };

    if body.len() > max_body_bytes {
        return Verdict::Reject(Rejection::Oversized);
    }

    if trap::is_trap(url) {
        return Verdict::Reject(Rejection::TrapMatch);
    }

    Verdict::Accept
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 1024 * 1024;
    const URL: &str = "https://www.ics.uci.edu/about.html";

    #[test]
    fn test_ok_page_is_accepted() {
        let page = FetchedPage::new(200).with_body("<html></html>");
        assert_eq!(should_process(URL, &page, LIMIT), Verdict::Accept);
    }

    #[test]
    fn test_600_range_rejected_before_anything_else() {
        let page = FetchedPage::new(608).with_header("Location", "https://x.ics.uci.edu/");
        assert_eq!(
            should_process(URL, &page, LIMIT),
            Verdict::Reject(Rejection::NonStandardStatus)
        );
    }

    #[test]
    fn test_redirect_with_location() {
        let page = FetchedPage::new(302).with_header("Location", "https://a.ics.uci.edu/y");
        assert_eq!(
            should_process(URL, &page, LIMIT),
            Verdict::RedirectTo("https://a.ics.uci.edu/y".to_string())
        );
    }

    #[test]
    fn test_redirect_wins_over_trap() {
        // Step 2 runs before step 5, so a trap URL that redirects still redirects
        let page = FetchedPage::new(301).with_header("location", "/elsewhere");
        assert_eq!(
            should_process("https://www.ics.uci.edu/list?sort=asc", &page, LIMIT),
            Verdict::RedirectTo("/elsewhere".to_string())
        );
    }

    #[test]
    fn test_redirect_without_location() {
        let page = FetchedPage::new(307);
        assert_eq!(
            should_process(URL, &page, LIMIT),
            Verdict::Reject(Rejection::RedirectWithoutTarget)
        );
    }

    #[test]
    fn test_error_status_and_missing_body() {
        let not_found = FetchedPage::new(404).with_body("nope");
        assert_eq!(
            should_process(URL, &not_found, LIMIT),
            Verdict::Reject(Rejection::UnsuccessfulStatus)
        );

        let empty = FetchedPage::new(200);
        assert_eq!(
            should_process(URL, &empty, LIMIT),
            Verdict::Reject(Rejection::MissingBody)
        );
    }

    #[test]
    fn test_oversized_body() {
        let page = FetchedPage::new(200).with_body(vec![b'a'; LIMIT + 1]);
        assert_eq!(
            should_process(URL, &page, LIMIT),
            Verdict::Reject(Rejection::Oversized)
        );

        let exact = FetchedPage::new(200).with_body(vec![b'a'; LIMIT]);
        assert_eq!(should_process(URL, &exact, LIMIT), Verdict::Accept);
    }

    #[test]
    fn test_trap_url_rejected() {
        let page = FetchedPage::new(200).with_body("<p>hi</p>");
        assert_eq!(
            should_process("https://www.ics.uci.edu/list?page=7", &page, LIMIT),
            Verdict::Reject(Rejection::TrapMatch)
        );
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let page = FetchedPage::new(200).with_header("Content-Type", "text/html");
        assert_eq!(page.header("content-type"), Some("text/html"));
        assert_eq!(page.header("CONTENT-TYPE"), Some("text/html"));
    }
}
