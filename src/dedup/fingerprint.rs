// src/dedup/fingerprint.rs
// =============================================================================
// 64-bit SimHash fingerprints for near-duplicate detection.
//
// How a fingerprint is built:
// 1. Lower-case the text and drop every non-word character (so whitespace
//    and punctuation changes don't matter).
// 2. Slide a 3-character window over it; each window is a "shingle".
// 3. Hash every shingle to 64 bits.
// 4. For each bit position keep a running score: +1 if the shingle hash has
//    the bit set, -1 if not.
// 5. The fingerprint has bit i set iff score i ended up positive.
//
// Similar texts share most shingles, so their scores (and therefore their
// fingerprints) agree on most bits. Two pages are near-duplicates when their
// fingerprints differ in fewer than `threshold` bit positions.
// =============================================================================

use sha2::{Digest, Sha256};

pub const SHINGLE_LEN: usize = 3;
pub const FINGERPRINT_BITS: usize = 64;

pub fn fingerprint(text: &str) -> u64 {
    let mut scores = [0i32; FINGERPRINT_BITS];

    for shingle in shingles(text) {
        let hash = hash_shingle(&shingle);
        for (bit, score) in scores.iter_mut().enumerate() {
            if (hash >> bit) & 1 == 1 {
                *score += 1;
            } else {
                *score -= 1;
            }
        }
    }

    scores
        .iter()
        .enumerate()
        .filter(|(_, score)| **score > 0)
        .fold(0u64, |fp, (bit, _)| fp | (1 << bit))
}

pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

// Overlapping character windows over the cleaned text
//
// Text shorter than one window becomes a single shingle (possibly empty),
// so every input produces at least one feature.
fn shingles(text: &str) -> Vec<String> {
    let cleaned: Vec<char> = text
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();

    if cleaned.len() < SHINGLE_LEN {
        return vec![cleaned.into_iter().collect()];
    }

    cleaned
        .windows(SHINGLE_LEN)
        .map(|window| window.iter().collect())
        .collect()
}

// First 8 bytes of the SHA-256 digest, little-endian
fn hash_shingle(shingle: &str) -> u64 {
    let digest = Sha256::digest(shingle.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

// Every fingerprint accepted so far
//
// The set only grows: fingerprints are never evicted, and checking a page
// compares it against every accepted page (linear in pages seen). That is
// fine for a crawl of a few university domains. A much larger crawl would
// want to bucket fingerprints by bit blocks instead of scanning them all.
#[derive(Debug, Clone)]
pub struct FingerprintSet {
    seen: Vec<u64>,
    threshold: u32,
}

impl FingerprintSet {
    pub fn new(threshold: u32) -> Self {
        Self {
            seen: Vec::new(),
            threshold,
        }
    }

    // True if `fp` is within the threshold of an accepted fingerprint.
    // Otherwise `fp` is accepted and remembered. Duplicates are never
    // stored, so a rejected page can't pull later pages towards itself.
    pub fn is_near_duplicate(&mut self, fp: u64) -> bool {
        if self
            .seen
            .iter()
            .any(|&old| hamming_distance(fp, old) < self.threshold)
        {
            return true;
        }
        self.seen.push(fp);
        false
    }

    // Re-inserts fingerprints from a checkpoint, skipping exact repeats
    pub fn restore(&mut self, fingerprints: impl IntoIterator<Item = u64>) {
        for fp in fingerprints {
            if !self.seen.contains(&fp) {
                self.seen.push(fp);
            }
        }
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.seen
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAGRAPH: &str = "The Donald Bren School of Information and Computer Sciences \
        offers undergraduate and graduate programs in computer science, informatics, \
        and statistics, with research spanning machine learning and systems.";

    #[test]
    fn test_fingerprint_is_deterministic() {
        assert_eq!(fingerprint(PARAGRAPH), fingerprint(PARAGRAPH));
    }

    #[test]
    fn test_whitespace_and_case_do_not_matter() {
        let spaced = PARAGRAPH.replace("graduate programs", "graduate      programs");
        let shouted = PARAGRAPH.to_uppercase();

        assert!(hamming_distance(fingerprint(PARAGRAPH), fingerprint(&spaced)) < 5);
        assert_eq!(fingerprint(PARAGRAPH), fingerprint(&shouted));
    }

    #[test]
    fn test_unrelated_text_is_far() {
        let other = "Zebras graze quietly near the river while a storm approaches from \
            the western hills and fishermen pull their boats ashore before dusk.";
        assert!(hamming_distance(fingerprint(PARAGRAPH), fingerprint(other)) >= 5);
    }

    #[test]
    fn test_short_text_is_single_shingle() {
        assert_eq!(shingles("a!"), vec!["a".to_string()]);
        assert_eq!(shingles(""), vec![String::new()]);
        assert_eq!(shingles("abcd"), vec!["abc".to_string(), "bcd".to_string()]);
    }

    #[test]
    fn test_hamming_distance() {
        assert_eq!(hamming_distance(0, 0), 0);
        assert_eq!(hamming_distance(0b1011, 0b0001), 2);
        assert_eq!(hamming_distance(u64::MAX, 0), 64);
    }

    #[test]
    fn test_set_inserts_only_new_content() {
        let mut set = FingerprintSet::new(5);
        let fp = fingerprint(PARAGRAPH);

        assert!(!set.is_near_duplicate(fp));
        assert_eq!(set.len(), 1);

        assert!(set.is_near_duplicate(fp));
        assert!(set.is_near_duplicate(fp ^ 0b1111));
        assert_eq!(set.len(), 1);

        assert!(!set.is_near_duplicate(!fp));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut set = FingerprintSet::new(5);
        set.is_near_duplicate(0);
        // exactly 5 differing bits is not a duplicate
        assert!(!set.is_near_duplicate(0b11111));
    }

    #[test]
    fn test_restore_skips_repeats() {
        let mut set = FingerprintSet::new(5);
        set.restore([1, 2, 2, 3]);
        assert_eq!(set.as_slice(), &[1, 2, 3]);
    }
}
