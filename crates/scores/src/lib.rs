//! Scores: submission rules, score service clients, leaderboard pagination
//! and run-time formatting.
//!
//! # Invariants
//! - Submitted aliases are trimmed and never empty.
//! - At most one leaderboard page is in flight; stale pages are dropped.
//! - Network failures never panic and never retry on their own.

mod entry;
mod error;
mod format;
mod leaderboard;
mod service;

pub use entry::{DEFAULT_ALIAS, ScoreEntry, ScoreSubmission};
pub use error::ScoreError;
pub use format::{format_rank, format_time};
pub use leaderboard::{Leaderboard, LeaderboardRow, PageRequest};
pub use service::{HttpScoreService, LocalScoreService, PAGE_SIZE, ScoreService};

pub fn crate_info() -> &'static str {
    "neoncity-scores v0.1.0"
}
