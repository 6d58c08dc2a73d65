use std::collections::HashMap;

use crate::types::Track;

pub const PLAYLIST_URL_PREFIX: &str = "https://open.spotify.com/playlist/";

/// Statistics about the dominant release decade of a track list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecadeStats {
    pub decade: u32,
    /// Share of tracks with a parseable year that fall in this decade, 0..=1.
    pub share: f64,
}

/// Formats a duration in milliseconds as "m:ss" or "h:mm:ss".
pub fn format_duration(duration_ms: u64) -> String {
    if duration_ms == 0 {
        return "0:00".to_string();
    }

    let total_seconds = duration_ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Checks whether the given string looks like a public Spotify playlist URL.
/// Invalid URLs are rejected before any network call is made.
pub fn is_valid_playlist_url(url: &str) -> bool {
    url.starts_with(PLAYLIST_URL_PREFIX)
}

/// Extracts the playlist ID from a Spotify playlist URL.
///
/// Takes the segment after `/playlist/`, strips any query string, and keeps
/// only the leading alphanumeric run, so
/// `https://open.spotify.com/playlist/abc123?si=xyz` resolves to `abc123`.
/// Returns `None` when no ID can be recovered.
pub fn extract_playlist_id_from_url(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("/playlist/")?;
    let id: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    if id.is_empty() { None } else { Some(id) }
}

/// Parses a leading 4-digit year out of a release date string
/// (`YYYY-MM-DD` or bare `YYYY`).
pub fn release_year(release_date: &str) -> Option<u32> {
    let head: String = release_date.chars().take(4).collect();
    if head.len() < 4 {
        return None;
    }
    head.parse::<u32>().ok().filter(|y| (1000..=9999).contains(y))
}

/// Finds the dominant release decade across the given tracks.
///
/// The decade of a track is `year / 10 * 10` over its parseable 4-digit
/// release year; the primary decade is the mode, and the share is computed
/// against the number of tracks that had a parseable year. Returns `None`
/// when no track has a usable release date. Ties resolve to the more recent
/// decade.
pub fn primary_decade(tracks: &[Track]) -> Option<DecadeStats> {
    let mut counts: HashMap<u32, usize> = HashMap::new();
    let mut dated = 0usize;

    for track in tracks {
        if let Some(year) = track.release_date.as_deref().and_then(release_year) {
            *counts.entry(year / 10 * 10).or_insert(0) += 1;
            dated += 1;
        }
    }

    let (decade, count) = counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))?;

    Some(DecadeStats {
        decade,
        share: count as f64 / dated as f64,
    })
}

pub fn total_duration_ms(tracks: &[Track]) -> u64 {
    tracks.iter().map(|t| t.duration_ms).sum()
}
