use axum::{
    Extension, Router,
    routing::{get, post},
};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::{api, config, error, gemini::client::GeminiModel, spotify::auth::TokenManager, types::Session};

/// Application state shared across handlers. The session is a single,
/// fully-replaceable value; partial mutation is avoided by construction.
pub struct DashboardState {
    pub token: TokenManager,
    pub model: Option<GeminiModel>,
    pub session: Option<Session>,
}

impl DashboardState {
    pub fn new() -> Self {
        DashboardState {
            token: TokenManager::new(),
            model: None,
            session: None,
        }
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedState = Arc<Mutex<DashboardState>>;

pub fn dashboard_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/api/analyze", post(api::analyze))
        .route("/api/session", get(api::session))
        .route("/api/reset", post(api::reset))
        .layer(Extension(state))
}

pub async fn start_dashboard_server() {
    let state: SharedState = Arc::new(Mutex::new(DashboardState::new()));
    let app = dashboard_router(state);

    let addr = match SocketAddr::from_str(&config::server_addr()) {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address: {}", e),
    };

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Failed to bind {}: {}", addr, e),
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    }
}
