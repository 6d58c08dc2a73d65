use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use tokio::time::sleep;

use crate::{
    config,
    retry::RetryPolicy,
    spotify::auth::TokenManager,
    types::{PlaylistDetailsResponse, PlaylistTracksResponse, SpotifyError, Track},
    warning,
};

/// Items requested per pagination page; the Spotify API maximum.
const PAGE_LIMIT: u64 = 100;

/// Fallback wait when a 429 response carries no `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Retrieves basic metadata for a public playlist from the Spotify Web API.
///
/// Fetches the playlist's name, description, cover images, owner display name
/// and follower count in a single request.
///
/// # Arguments
///
/// * `playlist_id` - Spotify ID of the playlist, as resolved from its URL
/// * `token_mgr` - Token manager supplying a valid client-credentials token
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(PlaylistDetailsResponse)` - The playlist metadata
/// - `Err(SpotifyError)` - Network error, `NotFound` for unknown or private
///   playlists, or any other API error
///
/// # Error Handling
///
/// A 404 response maps to [`SpotifyError::NotFound`]; private playlists are
/// indistinguishable from missing ones under the client-credentials flow and
/// surface the same way. Other non-success statuses are propagated as
/// [`SpotifyError::Api`] without retry.
///
/// # Example
///
/// ```
/// let mut token_mgr = TokenManager::new();
/// let details = get_playlist_details("37i9dQZF1DXcBWIGoYBM5M", &mut token_mgr).await?;
/// println!("Playlist: {}", details.name);
/// ```
pub async fn get_playlist_details(
    playlist_id: &str,
    token_mgr: &mut TokenManager,
) -> Result<PlaylistDetailsResponse, SpotifyError> {
    let api_url = format!(
        "{uri}/playlists/{id}?fields=name,description,images,owner(display_name),followers(total)",
        uri = &config::spotify_apiurl(),
        id = playlist_id
    );

    let token = token_mgr.get_valid_token().await?;
    let client = super::http_client();
    let response = client.get(&api_url).bearer_auth(token).send().await?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(SpotifyError::NotFound);
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(SpotifyError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json::<PlaylistDetailsResponse>().await?)
}

/// Fetches every track of a playlist, handling pagination and rate limiting.
///
/// Requests pages of up to 100 items and follows the API's `next` cursor
/// until it is absent or a page comes back empty. The result is a finite,
/// re-callable sequence in original playlist order.
///
/// # Arguments
///
/// * `playlist_id` - Spotify ID of the playlist to fetch tracks for
/// * `token_mgr` - Token manager supplying a valid client-credentials token
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(Vec<Track>)` - All resolvable tracks, in playlist order
/// - `Err(SpotifyError)` - Network error, API error, or an exhausted rate
///   limit
///
/// # Rate Limiting
///
/// On a 429 Too Many Requests response the function sleeps for the number of
/// seconds named in the `Retry-After` header (5 seconds when the header is
/// absent) and retries the *same* page rather than advancing. Retries per
/// page are bounded by the shared [`RetryPolicy`] ceiling; exceeding it
/// yields [`SpotifyError::RateLimitExhausted`]. Any other API error is
/// non-retryable and aborts the fetch.
///
/// # Skipped Items
///
/// Entries without a stable track ID (local files, removed tracks) are
/// silently skipped and never counted as playlist tracks.
///
/// # Progress Indication
///
/// Displays a spinner with a running track count while pages are fetched.
/// The spinner is cleared on all exit paths.
///
/// # Example
///
/// ```
/// let mut token_mgr = TokenManager::new();
/// let tracks = get_playlist_tracks("37i9dQZF1DXcBWIGoYBM5M", &mut token_mgr).await?;
/// println!("Collected {} tracks", tracks.len());
/// ```
pub async fn get_playlist_tracks(
    playlist_id: &str,
    token_mgr: &mut TokenManager,
) -> Result<Vec<Track>, SpotifyError> {
    let policy = RetryPolicy::default();
    let client = super::http_client();
    let mut tracks: Vec<Track> = Vec::new();
    let mut offset: u64 = 0;
    let mut page_attempt: u32 = 0;

    let pb = ProgressBar::new_spinner();
    pb.set_message("Fetching playlist tracks...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    loop {
        let api_url = format!(
            "{uri}/playlists/{id}/tracks?offset={offset}&limit={limit}&fields=items(track(id,name,artists(name),album(name,release_date),duration_ms,popularity)),next",
            uri = &config::spotify_apiurl(),
            id = playlist_id,
            offset = offset,
            limit = PAGE_LIMIT
        );

        let token = match token_mgr.get_valid_token().await {
            Ok(token) => token,
            Err(e) => {
                pb.finish_and_clear();
                return Err(e);
            }
        };

        let response = match client.get(&api_url).bearer_auth(token).send().await {
            Ok(resp) => resp,
            Err(e) => {
                pb.finish_and_clear();
                return Err(SpotifyError::Http(e));
            }
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            if page_attempt + 1 >= policy.max_attempts {
                pb.finish_and_clear();
                return Err(SpotifyError::RateLimitExhausted);
            }
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            warning!("Rate limited, retrying page in {} seconds", retry_after);
            sleep(Duration::from_secs(retry_after)).await;
            page_attempt += 1;
            continue; // retry the same page
        }
        if !status.is_success() {
            pb.finish_and_clear();
            let message = response.text().await.unwrap_or_default();
            return Err(SpotifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let page = match response.json::<PlaylistTracksResponse>().await {
            Ok(page) => page,
            Err(e) => {
                pb.finish_and_clear();
                return Err(SpotifyError::Http(e));
            }
        };

        if page.items.is_empty() {
            break;
        }

        for item in &page.items {
            let Some(track) = &item.track else { continue };
            // Local files carry no stable ID and are skipped.
            let Some(id) = &track.id else { continue };

            let artist = track
                .artists
                .iter()
                .filter_map(|a| a.name.clone())
                .collect::<Vec<_>>()
                .join(", ");

            tracks.push(Track {
                id: id.clone(),
                name: track.name.clone().unwrap_or_else(|| "N/A".to_string()),
                artist: if artist.is_empty() {
                    "N/A".to_string()
                } else {
                    artist
                },
                album: track
                    .album
                    .as_ref()
                    .and_then(|a| a.name.clone())
                    .unwrap_or_else(|| "N/A".to_string()),
                duration_ms: track.duration_ms.unwrap_or(0),
                popularity: track.popularity.unwrap_or(0),
                release_date: track.album.as_ref().and_then(|a| a.release_date.clone()),
            });
        }

        pb.set_message(format!("Fetching playlist tracks... {}", tracks.len()));
        page_attempt = 0;

        if page.next.is_some() {
            offset += PAGE_LIMIT;
        } else {
            break;
        }
    }

    pb.finish_and_clear();
    Ok(tracks)
}
