//! Deterministic prompt construction for both model call sites.

use serde::Serialize;

use crate::{
    types::{PlaylistAnalysis, Track},
    utils::DecadeStats,
};

/// Number of tracks enumerated in the analysis prompt.
pub const TRACK_SAMPLE_LIMIT: usize = 20;

const INSTRUMENT_LIMIT: usize = 5;
const KEY_LIMIT: usize = 3;

/// Builds the playlist-analysis prompt: an enumerated, truncated track list,
/// optional decade statistics, and a fixed instruction block naming the
/// exact required output keys.
pub fn build_analysis_prompt(tracks: &[Track], decade: Option<&DecadeStats>) -> String {
    let track_lines: Vec<String> = tracks
        .iter()
        .take(TRACK_SAMPLE_LIMIT)
        .enumerate()
        .map(|(i, t)| {
            format!(
                "{}. {} by {} ({})",
                i + 1,
                t.name,
                t.artist,
                t.release_date.as_deref().unwrap_or("Unknown")
            )
        })
        .collect();

    let mut prompt = format!(
        "Analyze the following playlist and return musical attributes in JSON:\n\n\
         SONGS:\n{}\n",
        track_lines.join("\n")
    );

    if let Some(stats) = decade {
        prompt.push_str(&format!(
            "\nDECADE CONTEXT:\n{:.0}% of the dated songs were released in the {}s. \
             Take this era into account.\n",
            stats.share * 100.0,
            stats.decade
        ));
    }

    prompt.push_str(
        "\nReturn JSON with:\n\
         - general_description\n\
         - bpm_range (min, max, most_common)\n\
         - instruments (e.g., Guitar: high)\n\
         - key_distribution (e.g., A Minor: 3)\n\
         - mood_description\n\
         - genre_analysis\n",
    );

    if decade.is_some() {
        prompt.push_str("- decade_profile\n");
    }

    prompt
}

/// Reduced projection of an analysis carried into the recommendation prompt.
#[derive(Debug, Serialize)]
struct AnalysisProfile<'a> {
    description: &'a str,
    genres: &'a str,
    mood: &'a str,
    instruments: Vec<&'a str>,
    keys: Vec<&'a str>,
}

/// Builds the recommendation prompt from a reduced projection of the
/// analysis: description, genre text, mood text, up to 5 instrument names
/// and up to 3 key names. When a primary decade was detected, the prompt
/// explicitly constrains recommendations to that decade.
pub fn build_recommendation_prompt(
    analysis: &PlaylistAnalysis,
    decade: Option<&DecadeStats>,
) -> String {
    let profile = AnalysisProfile {
        description: &analysis.general_description,
        genres: &analysis.genre_analysis,
        mood: &analysis.mood_description,
        instruments: analysis
            .instruments
            .keys()
            .take(INSTRUMENT_LIMIT)
            .map(String::as_str)
            .collect(),
        keys: analysis
            .key_distribution
            .keys()
            .take(KEY_LIMIT)
            .map(String::as_str)
            .collect(),
    };

    let profile_json =
        serde_json::to_string_pretty(&profile).unwrap_or_else(|_| "{}".to_string());

    let mut prompt = format!(
        "Recommend 3 songs based on this profile:\n\nPROFILE:\n{}\n",
        profile_json
    );

    if let Some(stats) = decade {
        prompt.push_str(&format!(
            "\nOnly recommend songs released in the {}s.\n",
            stats.decade
        ));
    }

    prompt.push_str(
        "\nReturn ONLY a JSON array of songs with:\n\
         - title\n\
         - artist\n\
         - reasoning\n\
         - attributes (tempo, key, mood, production style, instruments)\n\
         - spotify_url\n",
    );

    prompt
}
