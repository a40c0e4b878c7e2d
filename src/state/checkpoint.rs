// src/state/checkpoint.rs
// =============================================================================
// The checkpoint file: a JSON snapshot of everything needed to resume.
//
// Written after every processed page. We write to "<path>.tmp" first and
// then rename over the real file, so a crash mid-write leaves the previous
// snapshot intact instead of a half-written one.
//
// The four core fields (visitedURLs, wordCounts, subdomainCounts,
// longestPage) are always present. fingerprints, crawledURLs and frontier
// were added later and default to empty, so older files still load.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CrawlError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(rename = "visitedURLs")]
    pub visited_urls: Vec<String>,
    #[serde(rename = "wordCounts")]
    pub word_counts: HashMap<String, u64>,
    #[serde(rename = "subdomainCounts")]
    pub subdomain_counts: BTreeMap<String, u64>,
    /// (url, word count); url is null until a page has been processed
    #[serde(rename = "longestPage")]
    pub longest_page: (Option<String>, u64),
    #[serde(default)]
    pub fingerprints: Vec<u64>,
    #[serde(rename = "crawledURLs", default)]
    pub crawled_urls: Vec<String>,
    #[serde(default)]
    pub frontier: Vec<String>,
}

pub fn save(path: &Path, checkpoint: &Checkpoint) -> Result<(), CrawlError> {
    let tmp = temp_path(path);
    let io_err = |source| CrawlError::CheckpointIo {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_vec(checkpoint).map_err(|source| CrawlError::CheckpointFormat {
        path: path.to_path_buf(),
        source,
    })?;

    fs::write(&tmp, json).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

// Ok(None) when there is no checkpoint yet
pub fn load(path: &Path) -> Result<Option<Checkpoint>, CrawlError> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(CrawlError::CheckpointIo {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|source| CrawlError::CheckpointFormat {
            path: path.to_path_buf(),
            source,
        })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
