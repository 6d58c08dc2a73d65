//! # API Module
//!
//! This module provides the HTTP API endpoints for the playlens dashboard
//! server. It is the boundary between the analysis pipeline and the
//! presentation layer: everything it returns is plain data.
//!
//! ## Endpoints
//!
//! - [`analyze`] - Runs the full pipeline (catalog fetch, model analysis,
//!   recommendations) for a playlist URL and replaces the session.
//! - [`session`] - Returns the last computed session.
//! - [`reset`] - Discards the session state.
//! - [`health`] - Health check with application status and version.
//!
//! ## Error Semantics
//!
//! Configuration-level failures (invalid URL, unknown or private playlist)
//! surface as blocking HTTP errors. Model-side failures never do: they
//! degrade into defaulted records, marked by the `*_degraded` flags on the
//! session.
//!
//! ## Architecture
//!
//! Built on [Axum](https://docs.rs/axum); the shared session state is passed
//! via `Extension` and requests are serialized on its mutex, so a single
//! analysis runs at a time.

mod analyze;
mod health;
mod session;

pub use analyze::analyze;
pub use health::health;
pub use session::{reset, session};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Blocking errors surfaced to the dashboard user.
#[derive(Debug)]
pub enum ApiError {
    InvalidUrl,
    PlaylistNotFound,
    EmptyOrPrivatePlaylist,
    Catalog(String),
    NoSession,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidUrl => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid Spotify playlist URL.".to_string(),
            ),
            ApiError::PlaylistNotFound => {
                (StatusCode::NOT_FOUND, "Playlist not found.".to_string())
            }
            ApiError::EmptyOrPrivatePlaylist => (
                StatusCode::NOT_FOUND,
                "No tracks found or playlist is private.".to_string(),
            ),
            ApiError::Catalog(message) => (StatusCode::BAD_GATEWAY, message),
            ApiError::NoSession => (
                StatusCode::NOT_FOUND,
                "No analysis has been run yet.".to_string(),
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
