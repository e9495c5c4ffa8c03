//! Score service: a small JSON API over the file-backed score store.
//!
//! # Invariants
//! - `POST /init` is idempotent.
//! - Rows come back fastest first, ties in submission order.
//! - Every failure is answered with a JSON `{"error": ...}` body.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use neoncity_persist::{ScoreStore, StoreError};
use neoncity_scores::{PAGE_SIZE, ScoreEntry};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

/// Largest page a single request may ask for.
pub const MAX_LIMIT: usize = 500;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<ScoreStore>>,
}

impl AppState {
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = ScoreStore::open(data_dir.into())?;
        Ok(Self {
            store: Arc::new(Mutex::new(store)),
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/init", post(init).options(preflight).fallback(method_not_allowed))
        .route(
            "/leaderboard",
            get(list_scores)
                .post(submit_score)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .with_state(state)
        .layer(open_cors())
}

fn open_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Serve until `shutdown` resolves. Returns the address that was served.
pub async fn serve_listener(
    listener: tokio::net::TcpListener,
    data_dir: PathBuf,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<SocketAddr> {
    let state = AppState::open(&data_dir)?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, data_dir = %data_dir.display(), "score service listening");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(addr)
}

/// Handler failures, each mapped to a status and a JSON error body.
#[derive(Debug)]
enum ApiError {
    BadSubmission,
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadSubmission => (StatusCode::BAD_REQUEST, "Missing alias or time_ms"),
            ApiError::Store(err) => {
                tracing::error!(error = %err, "score store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn init(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.lock().await.verify_integrity()?;
    Ok(Json(json!({ "success": true, "message": "Database initialized" })))
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

/// Loosely typed so that wrong types end up as 400, not as an extractor
/// rejection.
#[derive(Deserialize)]
struct SubmitBody {
    alias: Option<serde_json::Value>,
    time_ms: Option<serde_json::Value>,
}

fn parse_submission(body: &[u8]) -> Option<(String, u64)> {
    let body: SubmitBody = serde_json::from_slice(body).ok()?;
    let alias = body.alias?.as_str()?.trim().to_owned();
    let time_ms = body.time_ms?.as_u64()?;
    (!alias.is_empty() && time_ms > 0).then_some((alias, time_ms))
}

async fn submit_score(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let (alias, time_ms) = parse_submission(&body).ok_or(ApiError::BadSubmission)?;
    let record = state.store.lock().await.insert(&alias, time_ms)?;
    tracing::info!(alias = %record.alias, time_ms, seq = record.seq, "score recorded");
    Ok((StatusCode::CREATED, Json(json!({ "success": true }))).into_response())
}

#[derive(Serialize)]
struct ScoresBody {
    scores: Vec<ScoreEntry>,
}

/// `parseInt`-style paging: anything unparsable or zero falls back to the
/// default.
fn paging(query: &HashMap<String, String>) -> (usize, usize) {
    let number = |key: &str| {
        query
            .get(key)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
    };
    let limit = number("limit").unwrap_or(PAGE_SIZE).min(MAX_LIMIT);
    let offset = number("offset").unwrap_or(0);
    (limit, offset)
}

async fn list_scores(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<ScoresBody> {
    let (limit, offset) = paging(&query);
    let store = state.store.lock().await;
    let scores = store
        .page(offset, limit)
        .iter()
        .map(|r| ScoreEntry {
            alias: r.alias.clone(),
            time_ms: r.time_ms,
        })
        .collect();
    tracing::debug!(limit, offset, "leaderboard page served");
    Json(ScoresBody { scores })
}
