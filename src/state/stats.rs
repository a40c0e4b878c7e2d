// src/state/stats.rs
// =============================================================================
// Aggregate crawl statistics.
//
// - WordStats: how often each (non-stopword) word has appeared
// - SubdomainStats: how many distinct pages we processed per host
// - LongestPage: the page with the most content words so far
//
// All three only ever grow. Each has a merge() used when a checkpoint is
// loaded into a running state (counts add up, the longest page keeps the
// larger record).
// =============================================================================

use std::collections::{BTreeMap, HashMap};

use crate::filter::is_same_or_subdomain;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordStats {
    counts: HashMap<String, u64>,
}

impl WordStats {
    pub fn record<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in tokens {
            let token = token.as_ref();
            match self.counts.get_mut(token) {
                Some(count) => *count += 1,
                None => {
                    self.counts.insert(token.to_string(), 1);
                }
            }
        }
    }

    pub fn merge(&mut self, other: HashMap<String, u64>) {
        for (word, count) in other {
            *self.counts.entry(word).or_insert(0) += count;
        }
    }

    #[cfg(test)]
    pub fn get(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    // The `n` most frequent words; ties are broken alphabetically so the
    // output is stable from run to run
    pub fn top(&self, n: usize) -> Vec<(&str, u64)> {
        let mut words: Vec<(&str, u64)> = self
            .counts
            .iter()
            .map(|(word, count)| (word.as_str(), *count))
            .collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        words.truncate(n);
        words
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn as_map(&self) -> &HashMap<String, u64> {
        &self.counts
    }
}

// BTreeMap keeps hosts sorted, which is the order the report wants
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubdomainStats {
    counts: BTreeMap<String, u64>,
}

impl SubdomainStats {
    pub fn record(&mut self, host: &str) {
        *self.counts.entry(host.to_ascii_lowercase()).or_insert(0) += 1;
    }

    pub fn merge(&mut self, other: BTreeMap<String, u64>) {
        for (host, count) in other {
            *self.counts.entry(host).or_insert(0) += count;
        }
    }

    #[cfg(test)]
    pub fn get(&self, host: &str) -> u64 {
        self.counts.get(host).copied().unwrap_or(0)
    }

    // Hosts equal to `domain` or under it, alphabetically
    pub fn within(&self, domain: &str) -> Vec<(&str, u64)> {
        self.counts
            .iter()
            .filter(|(host, _)| is_same_or_subdomain(host, domain))
            .map(|(host, count)| (host.as_str(), *count))
            .collect()
    }

    pub fn as_map(&self) -> &BTreeMap<String, u64> {
        &self.counts
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LongestPage {
    pub url: Option<String>,
    pub words: u64,
}

impl LongestPage {
    // Replaces the record only on a strictly larger count
    pub fn offer(&mut self, url: &str, words: u64) -> bool {
        if words > self.words {
            self.url = Some(url.to_string());
            self.words = words;
            true
        } else {
            false
        }
    }

    pub fn merge(&mut self, url: Option<String>, words: u64) {
        if let Some(url) = url {
            self.offer(&url, words);
        }
    }
}
