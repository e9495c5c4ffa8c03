use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use neoncity_persist::ScoreStore;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::entry::{ScoreEntry, ScoreSubmission};
use crate::error::ScoreError;

/// Default page size for leaderboard requests.
pub const PAGE_SIZE: usize = 50;

/// Anything that can store and rank scores.
pub trait ScoreService {
    /// Prepare the backing store. Idempotent.
    fn init(&self) -> impl Future<Output = Result<(), ScoreError>> + Send;

    fn submit(
        &self,
        score: &ScoreSubmission,
    ) -> impl Future<Output = Result<(), ScoreError>> + Send;

    /// Fastest scores first, `limit` rows starting at rank `offset`.
    fn top_scores(
        &self,
        limit: usize,
        offset: usize,
    ) -> impl Future<Output = Result<Vec<ScoreEntry>, ScoreError>> + Send;
}

#[derive(Deserialize)]
struct ScoresBody {
    #[serde(default)]
    scores: Vec<ScoreEntry>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for the HTTP score service.
#[derive(Debug, Clone)]
pub struct HttpScoreService {
    client: reqwest::Client,
    base: String,
}

impl HttpScoreService {
    /// `base` is the service root, e.g. `http://127.0.0.1:8787`.
    pub fn new(base: impl Into<String>) -> Result<Self, ScoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::with_client(client, base))
    }

    pub fn with_client(client: reqwest::Client, base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_owned();
        Self { client, base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    async fn checked(response: reqwest::Response) -> Result<reqwest::Response, ScoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        tracing::warn!(status = status.as_u16(), %message, "score service request failed");
        Err(ScoreError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

impl ScoreService for HttpScoreService {
    async fn init(&self) -> Result<(), ScoreError> {
        let response = self.client.post(format!("{}/init", self.base)).send().await?;
        Self::checked(response).await?;
        tracing::debug!(base = %self.base, "score service initialized");
        Ok(())
    }

    async fn submit(&self, score: &ScoreSubmission) -> Result<(), ScoreError> {
        let response = self
            .client
            .post(format!("{}/leaderboard", self.base))
            .json(&score.to_entry())
            .send()
            .await?;
        Self::checked(response).await?;
        tracing::info!(alias = score.alias(), time_ms = score.time_ms(), "score submitted");
        Ok(())
    }

    async fn top_scores(&self, limit: usize, offset: usize) -> Result<Vec<ScoreEntry>, ScoreError> {
        let response = self
            .client
            .get(format!("{}/leaderboard", self.base))
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await?;
        let body: ScoresBody = Self::checked(response).await?.json().await?;
        tracing::debug!(limit, offset, rows = body.scores.len(), "scores fetched");
        Ok(body.scores)
    }
}

/// In-process service over a local [`ScoreStore`], for offline play and
/// tests.
#[derive(Debug, Clone)]
pub struct LocalScoreService {
    store: Arc<Mutex<ScoreStore>>,
}

impl LocalScoreService {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScoreError> {
        Ok(Self::new(Arc::new(Mutex::new(ScoreStore::open(path)?))))
    }

    pub fn new(store: Arc<Mutex<ScoreStore>>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<Mutex<ScoreStore>> {
        &self.store
    }
}

impl ScoreService for LocalScoreService {
    async fn init(&self) -> Result<(), ScoreError> {
        let store = self.store.lock().await;
        store.verify_integrity()?;
        Ok(())
    }

    async fn submit(&self, score: &ScoreSubmission) -> Result<(), ScoreError> {
        self.store.lock().await.insert(score.alias(), score.time_ms())?;
        Ok(())
    }

    async fn top_scores(&self, limit: usize, offset: usize) -> Result<Vec<ScoreEntry>, ScoreError> {
        let store = self.store.lock().await;
        Ok(store
            .page(offset, limit)
            .iter()
            .map(|r| ScoreEntry {
                alias: r.alias.clone(),
                time_ms: r.time_ms,
            })
            .collect())
    }
}
