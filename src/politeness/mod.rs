// src/politeness/mod.rs
// =============================================================================
// Politeness: robots.txt parsing and the per-origin allow/deny gate.
//
// Submodules:
// - robots: turn a robots.txt body into a RobotsPolicy
// - gate: fetch-once-per-origin cache answering can_fetch(url)
// =============================================================================

mod gate;
mod robots;

pub use gate::PolitenessGate;
