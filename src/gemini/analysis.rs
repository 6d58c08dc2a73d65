//! Orchestration of the two generate-then-normalize round trips.
//!
//! Both call sites share one algorithm shape: build the prompt, ask the
//! model, slice and repair the reply text, parse it, validate it into a
//! typed record. A malformed reply is not fatal - the whole round trip is
//! retried with a fresh model call up to the policy ceiling, after which the
//! result degrades to a hardcoded default instead of surfacing an error.

use std::collections::BTreeMap;

use serde_json::Value;
use tokio::time::sleep;

use crate::{
    gemini::{
        client::{GeminiModel, GenerationOptions},
        extract::{self, JsonShape},
        normalize::{self, Normalized},
        prompt,
    },
    retry::RetryPolicy,
    types::{PlaylistAnalysis, Recommendation, Track},
    utils::DecadeStats,
    warning,
};

/// Analyzes a track list with the bound model and returns a fully-defaulted
/// [`PlaylistAnalysis`].
///
/// # Algorithm
///
/// Builds the analysis prompt once, then per attempt: generate, extract the
/// JSON object from the raw reply, run the textual repair pass, parse, and
/// validate. Replies that fail to yield an object - or that carry the
/// error marker - count as malformed and trigger a fresh model call after
/// backoff. After the retry ceiling the hardcoded default record is
/// returned as [`Normalized::Fallback`]; the caller never sees a parser
/// error.
pub async fn analyze_playlist(
    model: &GeminiModel,
    tracks: &[Track],
    decade: Option<&DecadeStats>,
) -> Normalized<PlaylistAnalysis> {
    let request = prompt::build_analysis_prompt(tracks, decade);
    let options = GenerationOptions::analysis();
    let policy = RetryPolicy::default();

    if model.is_fallback() {
        return Normalized::Fallback(PlaylistAnalysis::default());
    }

    for attempt in 0..policy.max_attempts {
        match model.generate(&request, &options).await {
            Ok(raw) => {
                if let Some(analysis) = parse_analysis(&raw) {
                    return Normalized::Parsed(analysis);
                }
                warning!("Malformed analysis reply (attempt {})", attempt + 1);
            }
            Err(e) => {
                warning!("Analysis generation failed: {}", e);
            }
        }

        if policy.attempts_left(attempt) {
            sleep(policy.delay(attempt)).await;
        }
    }

    Normalized::Fallback(PlaylistAnalysis::default())
}

fn parse_analysis(raw: &str) -> Option<PlaylistAnalysis> {
    let payload = extract::extract_payload(raw, JsonShape::Object)?;
    let repaired = extract::repair_json(&payload);
    let value: Value = serde_json::from_str(&repaired).ok()?;
    let map = value.as_object()?;
    if normalize::is_error_marker(map) {
        return None;
    }
    Some(normalize::normalize_analysis(map))
}

/// Requests follow-up song recommendations seeded by a reduced projection of
/// the analysis.
///
/// Follows the same retry shape as [`analyze_playlist`]; an empty or
/// non-array reply counts as malformed. After the retry ceiling - or
/// immediately when no model is bound - the result degrades to an offline
/// fallback list chosen by keyword heuristics over the analysis text.
pub async fn get_song_recommendations(
    model: &GeminiModel,
    analysis: &PlaylistAnalysis,
    decade: Option<&DecadeStats>,
) -> Normalized<Vec<Recommendation>> {
    let request = prompt::build_recommendation_prompt(analysis, decade);
    let options = GenerationOptions::recommendations();
    let policy = RetryPolicy::default();

    if model.is_fallback() {
        return Normalized::Fallback(fallback_recommendations(analysis));
    }

    for attempt in 0..policy.max_attempts {
        match model.generate(&request, &options).await {
            Ok(raw) => {
                if let Some(recommendations) = parse_recommendations(&raw) {
                    return Normalized::Parsed(recommendations);
                }
                warning!("Malformed recommendation reply (attempt {})", attempt + 1);
            }
            Err(e) => {
                warning!("Recommendation generation failed: {}", e);
            }
        }

        if policy.attempts_left(attempt) {
            sleep(policy.delay(attempt)).await;
        }
    }

    Normalized::Fallback(fallback_recommendations(analysis))
}

fn parse_recommendations(raw: &str) -> Option<Vec<Recommendation>> {
    let payload = extract::extract_payload(raw, JsonShape::Array)?;
    let repaired = extract::repair_json(&payload);
    let value: Value = serde_json::from_str(&repaired).ok()?;
    let recommendations = normalize::normalize_recommendations(&value)?;
    // An empty list means every element was dropped; try again.
    if recommendations.is_empty() {
        return None;
    }
    Some(recommendations)
}

/// Offline recommendations keyed by keyword matches on the analysis text.
fn fallback_recommendations(analysis: &PlaylistAnalysis) -> Vec<Recommendation> {
    let profile = format!(
        "{} {} {}",
        analysis.general_description, analysis.genre_analysis, analysis.mood_description
    )
    .to_lowercase();

    if profile.contains("bollywood") {
        return stub_list(&[
            ("Tum Hi Ho", "Arijit Singh", "A modern Bollywood ballad staple"),
            ("Kal Ho Naa Ho", "Sonu Nigam", "A classic emotional Bollywood anthem"),
            ("Chaiyya Chaiyya", "Sukhwinder Singh", "An energetic Bollywood favorite"),
        ]);
    }
    if profile.contains("k-pop") || profile.contains("kpop") {
        return stub_list(&[
            ("Dynamite", "BTS", "A bright, chart-topping K-pop single"),
            ("How You Like That", "BLACKPINK", "A high-energy K-pop hit"),
            ("Gangnam Style", "PSY", "The K-pop crossover landmark"),
        ]);
    }
    if profile.contains("latin") || profile.contains("reggaeton") {
        return stub_list(&[
            ("Despacito", "Luis Fonsi", "A defining modern Latin pop hit"),
            ("Vivir Mi Vida", "Marc Anthony", "An uplifting salsa anthem"),
            ("Danza Kuduro", "Don Omar", "A dancefloor Latin staple"),
        ]);
    }

    stub_list(&[
        ("Bohemian Rhapsody", "Queen", "A broadly loved classic that fits most playlists"),
        ("Billie Jean", "Michael Jackson", "A universally popular groove"),
        ("Hotel California", "Eagles", "A timeless rock standard"),
    ])
}

fn stub_list(entries: &[(&str, &str, &str)]) -> Vec<Recommendation> {
    entries
        .iter()
        .map(|(title, artist, reasoning)| Recommendation {
            title: title.to_string(),
            artist: artist.to_string(),
            reasoning: reasoning.to_string(),
            attributes: BTreeMap::new(),
            spotify_url: format!(
                "https://open.spotify.com/search/{}",
                title.replace(' ', "%20")
            ),
        })
        .collect()
}
