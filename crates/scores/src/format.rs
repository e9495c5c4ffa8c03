/// Render a run time as `MM:SS:hh` (minutes, seconds, hundredths).
///
/// Minutes are not wrapped, so runs over an hour show three or more minute
/// digits.
pub fn format_time(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let hundredths = (ms % 1000) / 10;
    format!("{minutes:02}:{seconds:02}:{hundredths:02}")
}

/// One-based leaderboard rank, zero-padded to two digits.
pub fn format_rank(rank: usize) -> String {
    format!("{rank:02}")
}
