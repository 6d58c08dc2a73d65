use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// --- Spotify auth ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub obtained_at: u64,
}

// --- Spotify wire types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistDetailsResponse {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<PlaylistImage>,
    pub owner: PlaylistOwner,
    #[serde(default)]
    pub followers: Option<Followers>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistImage {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistOwner {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Followers {
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTracksResponse {
    pub items: Vec<PlaylistTrackItem>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrackItem {
    #[serde(default)]
    pub track: Option<TrackObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackObject {
    // Local files carry no stable ID and are skipped during pagination.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
    #[serde(default)]
    pub album: Option<TrackAlbum>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub popularity: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackAlbum {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

// --- Gemini wire types ---

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestContent {
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestPart {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationConfig {
    pub temperature: f64,
    #[serde(rename = "topP")]
    pub top_p: f64,
    #[serde(rename = "topK")]
    pub top_k: u32,
    #[serde(rename = "maxOutputTokens")]
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseCandidate {
    #[serde(default)]
    pub content: Option<ResponseContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

// --- Domain records ---

/// A single playlist track as collected during pagination. Immutable after
/// the fetch; multiple artists are joined into one display string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub duration_ms: u64,
    pub popularity: u32,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub owner: String,
    #[serde(default)]
    pub followers: Option<u64>,
    pub track_count: usize,
    pub total_duration_ms: u64,
}

/// Intensity level for an instrument in the analysis. Unknown values
/// normalize to `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intensity::Low => write!(f, "low"),
            Intensity::Medium => write!(f, "medium"),
            Intensity::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BpmRange {
    pub min: f64,
    pub most_common: f64,
    pub max: f64,
}

impl Default for BpmRange {
    fn default() -> Self {
        BpmRange {
            min: 80.0,
            most_common: 120.0,
            max: 160.0,
        }
    }
}

/// The validated analysis record produced from a model reply. Every field is
/// always present; the normalizer fills anything the model omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistAnalysis {
    pub general_description: String,
    pub bpm_range: BpmRange,
    pub instruments: BTreeMap<String, Intensity>,
    pub key_distribution: BTreeMap<String, u64>,
    pub mood_description: String,
    pub genre_analysis: String,
    #[serde(default)]
    pub decade_profile: Option<String>,
}

/// Sentinel used for mandatory text fields the model failed to provide.
pub const INCOMPLETE_FIELD: &str = "Analysis incomplete.";

impl Default for PlaylistAnalysis {
    fn default() -> Self {
        PlaylistAnalysis {
            general_description: INCOMPLETE_FIELD.to_string(),
            bpm_range: BpmRange::default(),
            instruments: BTreeMap::new(),
            key_distribution: BTreeMap::new(),
            mood_description: INCOMPLETE_FIELD.to_string(),
            genre_analysis: INCOMPLETE_FIELD.to_string(),
            decade_profile: None,
        }
    }
}

/// Placeholder for recommendation fields the model failed to provide.
pub const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub artist: String,
    pub reasoning: String,
    pub attributes: BTreeMap<String, String>,
    pub spotify_url: String,
}

/// One full analysis round, replaced wholesale on every new request or reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub playlist: PlaylistSummary,
    pub tracks: Vec<Track>,
    pub analysis: PlaylistAnalysis,
    pub analysis_degraded: bool,
    pub recommendations: Vec<Recommendation>,
    pub recommendations_degraded: bool,
}

// --- Errors ---

#[derive(Debug)]
pub enum SpotifyError {
    Http(reqwest::Error),
    Api { status: u16, message: String },
    NotFound,
    RateLimitExhausted,
}

impl fmt::Display for SpotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpotifyError::Http(e) => write!(f, "Spotify HTTP error: {}", e),
            SpotifyError::Api { status, message } => {
                write!(f, "Spotify API error ({}): {}", status, message)
            }
            SpotifyError::NotFound => write!(f, "Playlist not found"),
            SpotifyError::RateLimitExhausted => {
                write!(f, "Spotify rate limit persisted past the retry ceiling")
            }
        }
    }
}

impl std::error::Error for SpotifyError {}

impl From<reqwest::Error> for SpotifyError {
    fn from(err: reqwest::Error) -> Self {
        SpotifyError::Http(err)
    }
}

#[derive(Debug)]
pub enum GeminiError {
    Http(reqwest::Error),
    Api { status: u16, message: String },
    EmptyReply,
    RetriesExhausted(String),
}

impl fmt::Display for GeminiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeminiError::Http(e) => write!(f, "Gemini HTTP error: {}", e),
            GeminiError::Api { status, message } => {
                write!(f, "Gemini API error ({}): {}", status, message)
            }
            GeminiError::EmptyReply => write!(f, "Gemini returned no candidate text"),
            GeminiError::RetriesExhausted(last) => {
                write!(f, "Gemini retries exhausted, last error: {}", last)
            }
        }
    }
}

impl std::error::Error for GeminiError {}

impl From<reqwest::Error> for GeminiError {
    fn from(err: reqwest::Error) -> Self {
        GeminiError::Http(err)
    }
}
