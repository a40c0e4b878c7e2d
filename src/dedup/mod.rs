// src/dedup/mod.rs
// =============================================================================
// Near-duplicate content detection (SimHash fingerprints).
// =============================================================================

mod fingerprint;

pub use fingerprint::{fingerprint, FingerprintSet};
