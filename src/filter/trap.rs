// src/filter/trap.rs
// =============================================================================
// Crawler trap detection.
//
// Some URL spaces are effectively infinite: a calendar has a "next month"
// link forever, a listing page can be sorted and filtered in thousands of
// combinations, a wiki exposes every revision and diff of every page. None
// of these add new content, they only grow the frontier.
//
// The signatures below are data, not code: to catch a new kind of trap, add
// a line to TRAP_SIGNATURES. They are checked in order and the first match
// wins. This is a heuristic, some traps will still get through and the
// overall page limit bounds those.
// =============================================================================

use once_cell::sync::Lazy;
use regex::Regex;

/// (name, pattern) pairs, matched case-insensitively against the full URL
pub const TRAP_SIGNATURES: &[(&str, &str)] = &[
    // Pagination and listing controls
    ("pagination", r"[?&;](page|paged|start|offset|limit|per_page)="),
    ("sort", r"[?&;](sort|order|orderby|sortby|dir)="),
    ("filter", r"[?&;](filter|view|mode|print|format|lang|tag|category)="),
    // Calendars and dates
    ("date-query", r"[?&;](date|year|month|day|week|time|ical|outlook-ical|tribe-bar-date|eventdisplay)="),
    ("calendar", r"calendar"),
    ("dated-event-path", r"/events?/(list|month|day|week|\d{4}-\d{2}(-\d{2})?)(/|$|\?)"),
    // Sessions and tracking
    ("session", r"[?&;](session|sessionid|sid|phpsessid|jsessionid|cfid|cftoken)="),
    ("tracking", r"[?&;](fbclid|gclid|msclkid|mc_cid|mc_eid|utm_[a-z]+)="),
    // Wiki and CMS action scripts, rejected whatever the query string says
    ("wiki-action-script", r"/(doku\.php|wp-login\.php|xmlrpc\.php|wp-admin/|wp-json/|mediawiki/index\.php|w/index\.php)"),
    ("wiki-special-page", r"/(special|spezial):"),
    // Revisions, diffs and edit endpoints
    ("revision", r"[?&;](do|action|rev|rev2|diff|oldid|curid|version|idx|replytocom|share)(\[\d*\])?="),
    // Only under wiki or repository browsers; a plain /about/history/ is content
    ("revision-path", r"/(wiki|w|trac|mediawiki)/(.*/)?(revisions?|diff|edit|history)(/|$|\?)|/-/(commits?|compare|blame)/"),
    // Calendar exports served as files
    ("calendar-export", r"\.(ics|ical|ifb|vcs)($|\?)"),
];

static COMPILED: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    TRAP_SIGNATURES
        .iter()
        .map(|(name, pattern)| {
            // The table above is constant, so a bad pattern is a programming error
            let regex = Regex::new(&format!("(?i){pattern}"))
                .unwrap_or_else(|e| panic!("invalid trap signature '{name}': {e}"));
            (*name, regex)
        })
        .collect()
});

// Name of the first signature that matches `url`, if any
pub fn matched_signature(url: &str) -> Option<&'static str> {
    COMPILED
        .iter()
        .find(|(_, regex)| regex.is_match(url))
        .map(|(name, _)| *name)
}

pub fn is_trap(url: &str) -> bool {
    matched_signature(url).is_some()
}
