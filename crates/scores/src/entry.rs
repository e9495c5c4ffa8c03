use serde::{Deserialize, Serialize};

use crate::error::ScoreError;

/// Alias used when the player leaves the name field blank.
pub const DEFAULT_ALIAS: &str = "ANONYMOUS";

/// One leaderboard row as exchanged with the score service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub alias: String,
    pub time_ms: u64,
}

/// A validated score ready to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    alias: String,
    time_ms: u64,
}

impl ScoreSubmission {
    /// Trim the typed alias (blank becomes [`DEFAULT_ALIAS`]) and reject a
    /// zero run time.
    pub fn new(alias: &str, time_ms: u64) -> Result<Self, ScoreError> {
        if time_ms == 0 {
            return Err(ScoreError::Invalid("time_ms must be positive"));
        }
        let alias = match alias.trim() {
            "" => DEFAULT_ALIAS,
            trimmed => trimmed,
        };
        Ok(Self {
            alias: alias.to_owned(),
            time_ms,
        })
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn time_ms(&self) -> u64 {
        self.time_ms
    }

    /// Whether a fetched row is (very likely) this submission.
    pub fn matches(&self, entry: &ScoreEntry) -> bool {
        entry.alias == self.alias && entry.time_ms.abs_diff(self.time_ms) < 100
    }

    pub fn to_entry(&self) -> ScoreEntry {
        ScoreEntry {
            alias: self.alias.clone(),
            time_ms: self.time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_is_trimmed_and_defaulted() {
        assert_eq!(ScoreSubmission::new("  AB ", 10).unwrap().alias(), "AB");
        assert_eq!(ScoreSubmission::new("   ", 10).unwrap().alias(), DEFAULT_ALIAS);
        assert_eq!(ScoreSubmission::new("", 10).unwrap().alias(), DEFAULT_ALIAS);
    }

    #[test]
    fn zero_time_rejected() {
        assert!(matches!(ScoreSubmission::new("AB", 0), Err(ScoreError::Invalid(_))));
    }

    #[test]
    fn matching_tolerates_rounding() {
        let me = ScoreSubmission::new("AB", 65_432).unwrap();
        let row = |alias: &str, time_ms| ScoreEntry {
            alias: alias.into(),
            time_ms,
        };
        assert!(me.matches(&row("AB", 65_432)));
        assert!(me.matches(&row("AB", 65_500)));
        assert!(!me.matches(&row("AB", 65_532)));
        assert!(!me.matches(&row("ab", 65_432)));
        assert_eq!(me.to_entry(), row("AB", 65_432));
    }
}
