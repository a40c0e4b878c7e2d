// src/crawl/extract.rs
// =============================================================================
// HTML text/link extraction and tokenization.
//
// Two small collaborators the pipeline relies on:
//
// - extract_page(): parse raw HTML with `scraper` and return the visible
//   text plus every <a href> value (unresolved, exactly as written).
// - tokenize(): split text into lower-cased ASCII alphanumeric words.
//
// Text inside <script>, <style>, <noscript> and <template> is skipped: it is
// markup noise, not page content.
//
// Text nodes are concatenated as written, so inline markup inside a word
// (`Hel<b>lo</b>`) does not split it. Block-level elements do separate
// words even when the HTML has no whitespace between them.
// =============================================================================

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;

// Selector::parse only fails on invalid CSS, and this one is a constant
static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("a[href] is a valid selector"));

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9]+").expect("token pattern is valid"));

const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "option", "p", "pre", "section", "table", "td", "th", "title", "tr", "ul",
];

/// English stopwords excluded from word statistics
pub static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    "a about above after again against all am an and any are aren't as at be because been \
     before being below between both but by can't cannot could couldn't did didn't do does \
     doesn't doing don't down during each few for from further had hadn't has hasn't have \
     haven't having he he'd he'll he's her here here's hers herself him himself his how how's \
     i i'd i'll i'm i've if in into is isn't it it's its itself let's me more most mustn't my \
     myself no nor not of off on once only or other ought our ours ourselves out over own same \
     shan't she she'd she'll she's should shouldn't so some such than that that's the their \
     theirs them themselves then there there's these they they'd they'll they're they've this \
     those through to too under until up very was wasn't we we'd we'll we're we've were weren't \
     what what's when when's where where's which while who who's whom why why's with won't \
     would wouldn't you you'd you'll you're you've your yours yourself yourselves"
        .split_whitespace()
        .collect()
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    /// Visible text with whitespace runs collapsed to single spaces
    pub text: String,
    /// Raw href attribute values in document order
    pub hrefs: Vec<String>,
}

impl ExtractedPage {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

pub fn extract_page(html: &str) -> ExtractedPage {
    let document = Html::parse_document(html);

    let mut raw = String::new();
    for node in document.root_element().descendants() {
        // Whatever follows a closed block (`<p>a</p>b`) starts a new word
        let after_block = node
            .prev_sibling()
            .and_then(|sibling| sibling.value().as_element())
            .map_or(false, |element| BLOCK_TAGS.contains(&element.name()));
        if after_block {
            raw.push(' ');
        }

        if let Some(element) = node.value().as_element() {
            if BLOCK_TAGS.contains(&element.name()) {
                raw.push(' ');
            }
            continue;
        }

        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element())
            .map_or(false, |element| NON_CONTENT_TAGS.contains(&element.name()));
        if hidden {
            continue;
        }

        raw.push_str(text);
    }

    let hrefs = document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect();

    ExtractedPage {
        text: raw.split_whitespace().collect::<Vec<_>>().join(" "),
        hrefs,
    }
}

pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_ascii_lowercase())
        .collect()
}

// Tokens that count towards word statistics (stopwords removed)
pub fn content_tokens(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|token| !STOPWORDS.contains(token.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_text_and_hrefs() {
        let html = r#"
            <html><head><title>ICS</title><style>p { color: red; }</style></head>
            <body>
              <p>Hello <b>world</b></p>
              <a href="/x.html">X</a>
              <a href="x.css">style</a>
              <a name="anchor-only">no href</a>
              <script>var hidden = "do not count";</script>
            </body></html>
        "#;
        let page = extract_page(html);

        assert_eq!(page.hrefs, vec!["/x.html".to_string(), "x.css".to_string()]);
        assert!(page.text.contains("Hello"));
        assert!(page.text.contains("world"));
        assert!(page.text.contains("ICS"));
        assert!(!page.text.contains("color"));
        assert!(!page.text.contains("hidden"));
    }

    #[test]
    fn test_word_count_uses_whitespace() {
        let page = extract_page("<p>one two</p><p>three</p>");
        assert_eq!(page.word_count(), 3);
    }

    #[test]
    fn test_inline_markup_does_not_split_words() {
        let page = extract_page("<p>Hel<b>lo</b> world</p>");
        assert_eq!(page.text, "Hello world");
        assert_eq!(page.word_count(), 2);

        let page = extract_page("<p>Hel<b>lo</b> wor<i>ld</i></p>");
        assert_eq!(page.word_count(), 2);
    }

    #[test]
    fn test_block_elements_separate_words() {
        let page = extract_page("<div>alpha</div>beta<ul><li>gamma</li><li>delta</li></ul>x<br>y");
        assert_eq!(page.text, "alpha beta gamma delta x y");

        let page = extract_page("<p>one</p><a href=\"/a\">two</a>");
        assert_eq!(page.word_count(), 2);
    }

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        assert_eq!(
            tokenize("Don't panic: CS-121, 2024!"),
            vec!["don", "t", "panic", "cs", "121", "2024"]
        );
    }

    #[test]
    fn test_content_tokens_drop_stopwords() {
        assert_eq!(
            content_tokens("The cat and THE hat"),
            vec!["cat".to_string(), "hat".to_string()]
        );
    }

    #[test]
    fn test_empty_document() {
        let page = extract_page("");
        assert!(page.text.is_empty());
        assert!(page.hrefs.is_empty());
    }
}
