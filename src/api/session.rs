use axum::{Extension, Json, http::StatusCode};

use crate::{api::ApiError, info, server::SharedState, types::Session};

/// Returns the last computed session, or 404 when none exists yet.
pub async fn session(
    Extension(state): Extension<SharedState>,
) -> Result<Json<Session>, ApiError> {
    let state = state.lock().await;
    state.session.clone().map(Json).ok_or(ApiError::NoSession)
}

/// Discards the session state. The whole session is replaced with `None`;
/// an in-flight analysis is not interrupted (it finishes against its own
/// lock tenure and installs its result afterwards).
pub async fn reset(Extension(state): Extension<SharedState>) -> StatusCode {
    let mut state = state.lock().await;
    state.session = None;
    info!("Session state reset");
    StatusCode::NO_CONTENT
}
