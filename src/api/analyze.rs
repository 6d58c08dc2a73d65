use axum::{Extension, Json};
use serde::Deserialize;

use crate::{
    api::ApiError,
    gemini::{self, client::GeminiModel},
    info,
    server::SharedState,
    spotify, success,
    types::{PlaylistSummary, Session, SpotifyError},
    utils,
};

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

/// Runs the full analysis pipeline for a playlist URL.
///
/// Validates the URL up front (no network call on invalid input), then
/// fetches playlist metadata and tracks, analyzes them with the bound Gemini
/// model, requests recommendations, and replaces the whole session with the
/// result. The state lock is held across the pipeline, so requests are
/// strictly serialized.
pub async fn analyze(
    Extension(state): Extension<SharedState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Session>, ApiError> {
    if !utils::is_valid_playlist_url(&request.url) {
        return Err(ApiError::InvalidUrl);
    }
    let playlist_id =
        utils::extract_playlist_id_from_url(&request.url).ok_or(ApiError::InvalidUrl)?;

    let mut state = state.lock().await;

    info!("Processing playlist {}", playlist_id);

    info!("Fetching playlist details...");
    let details = spotify::playlist::get_playlist_details(&playlist_id, &mut state.token)
        .await
        .map_err(map_catalog_error)?;

    let tracks = spotify::playlist::get_playlist_tracks(&playlist_id, &mut state.token)
        .await
        .map_err(map_catalog_error)?;
    if tracks.is_empty() {
        return Err(ApiError::EmptyOrPrivatePlaylist);
    }
    success!("Collected {} tracks", tracks.len());

    // Bind a model once and keep it for the session.
    let model = match state.model.take() {
        Some(model) => model,
        None => GeminiModel::setup().await,
    };

    let decade = utils::primary_decade(&tracks);

    info!("Analyzing with Gemini...");
    let analysis = gemini::analysis::analyze_playlist(&model, &tracks, decade.as_ref()).await;
    if analysis.is_fallback() {
        info!("Analysis degraded to defaults");
    }

    info!("Generating recommendations...");
    let recommendations =
        gemini::analysis::get_song_recommendations(&model, analysis.value(), decade.as_ref())
            .await;

    state.model = Some(model);

    let playlist = PlaylistSummary {
        name: details.name,
        description: details.description.unwrap_or_else(|| "N/A".to_string()),
        image_url: details.images.first().map(|i| i.url.clone()),
        owner: details
            .owner
            .display_name
            .unwrap_or_else(|| "Unknown".to_string()),
        followers: details.followers.map(|f| f.total),
        track_count: tracks.len(),
        total_duration_ms: utils::total_duration_ms(&tracks),
    };

    let analysis_degraded = analysis.is_fallback();
    let recommendations_degraded = recommendations.is_fallback();
    let session = Session {
        playlist,
        tracks,
        analysis: analysis.into_inner(),
        analysis_degraded,
        recommendations: recommendations.into_inner(),
        recommendations_degraded,
    };

    // Replace the whole session rather than mutating fields.
    state.session = Some(session.clone());
    success!("Analysis complete");

    Ok(Json(session))
}

fn map_catalog_error(err: SpotifyError) -> ApiError {
    match err {
        SpotifyError::NotFound => ApiError::PlaylistNotFound,
        other => ApiError::Catalog(other.to_string()),
    }
}
