//! Start endpoint
//!
//! `POST /solve_quiz` with `{email, secret, url}` runs one chain and
//! returns its outcome. Every request gets its own HTTP session.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use quiz_core::ChainRequest;
use quiz_net::FetchConfig;
use quiz_runtime::{solve_quiz_chain, ChainConfig};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Secret callers must present
    pub secret: String,
    pub fetch: FetchConfig,
    pub chain: ChainConfig,
}

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    secret: Arc<str>,
    fetch: FetchConfig,
    chain: ChainConfig,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            secret: Arc::from(config.secret.as_str()),
            fetch: config.fetch.clone(),
            chain: config.chain.clone(),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/solve_quiz", post(solve_quiz))
        .route("/health", get(health))
        .with_state(state)
}

async fn solve_quiz(State(state): State<AppState>, Json(request): Json<ChainRequest>) -> Response {
    if request.shared_secret != *state.secret {
        warn!("Rejected start request for {}: invalid secret", request.caller_identity);
        return (StatusCode::FORBIDDEN, Json(json!({"error": "Invalid secret"}))).into_response();
    }

    info!("Starting chain for {} at {}", request.caller_identity, request.start_url);
    let outcome = solve_quiz_chain(request, &state.fetch, state.chain.clone()).await;
    Json(outcome).into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

/// Start the web server.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let app = create_router(AppState::new(&config));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
