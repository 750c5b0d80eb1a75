//! Scholarship Ranking Pipeline
//!
//! Core library for normalizing scraped scholarship records,
//! deduplicating them across sources, matching them against a user's
//! eligibility profile and ranking them by fit score.

pub mod dedup;
pub mod matcher;
pub mod normalize;
pub mod scorer;
pub mod tables;
pub mod types;

pub use types::*;
