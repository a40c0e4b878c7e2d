// src/filter/mod.rs
// =============================================================================
// Stateless filters that decide whether a URL or a response is worth
// crawling.
//
// Submodules:
// - url: resolve hrefs, strip fragments, check scheme/domain/extension
// - trap: pattern-match URLs against known infinite URL spaces
// - content: status/size/redirect/trap checks on a fetched response
//
// Nothing in here touches the network or the crawl state, which makes
// these functions easy to test in isolation.
// =============================================================================

mod content;
mod trap;
mod url;

pub use self::content::{should_process, FetchedPage, Verdict};
pub use self::trap::matched_signature;
pub use self::url::{canonicalize, is_same_or_subdomain, normalize, resolve, UrlPolicy};
