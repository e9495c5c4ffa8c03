use neoncity_persist::StoreError;

/// Failures talking to a score service. Never fatal to the session.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("score service answered {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid score: {0}")]
    Invalid(&'static str),
    #[error("score store error: {0}")]
    Store(#[from] StoreError),
}
