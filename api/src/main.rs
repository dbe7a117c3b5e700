use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use quran_search::{AppState, SearchConfig, SearchOptions, SearchResults, Segment};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tracing_subscriber::EnvFilter;

const ADDR_ENV: &str = "QURAN_SEARCH_ADDR";
const DEFAULT_ADDR: &str = "127.0.0.1:3000";
/// Only GET routes are served; anything with a real body is refused.
const MAX_BODY_BYTES: usize = 16 * 1024;

type ApiError = (StatusCode, Json<ErrorResponse>);

// === Request/Response types ===

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
    lemma: Option<bool>,
    root: Option<bool>,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct HighlightQuery {
    gid: u64,
    q: String,
    lemma: Option<bool>,
    root: Option<bool>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    verses: usize,
}

#[derive(Serialize)]
struct HighlightResponse {
    gid: u64,
    segments: Vec<Segment>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: message.into() }))
}

fn bad_query(rejection: QueryRejection) -> ApiError {
    error(StatusCode::BAD_REQUEST, rejection.body_text())
}

fn options(lemma: Option<bool>, root: Option<bool>) -> SearchOptions {
    SearchOptions {
        lemma: lemma.unwrap_or(false),
        root: root.unwrap_or(false),
    }
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        verses: state.verse_count(),
    })
}

async fn search(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<SearchResults>, ApiError> {
    let Query(params) = params.map_err(bad_query)?;
    let options = options(params.lemma, params.root);

    let mut results = tokio::task::spawn_blocking(move || state.search(&params.q, options))
        .await
        .map_err(|e| error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    if let Some(limit) = params.limit {
        results.results.truncate(limit);
    }
    Ok(Json(results))
}

async fn highlight(
    State(state): State<Arc<AppState>>,
    params: Result<Query<HighlightQuery>, QueryRejection>,
) -> Result<Json<HighlightResponse>, ApiError> {
    let Query(params) = params.map_err(bad_query)?;
    let options = options(params.lemma, params.root);

    state
        .highlight(params.gid, &params.q, options)
        .map(|segments| Json(HighlightResponse { gid: params.gid, segments }))
        .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("verse {} not found", params.gid)))
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/search", get(search))
        .route("/verse/highlight", get(highlight))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = SearchConfig::from_env()?;
    tracing::info!(data_dir = ?config.data_dir, "loading datasets");
    let state = Arc::new(AppState::load(config).await?);

    let addr = std::env::var(ADDR_ENV).unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;

    Ok(())
}
