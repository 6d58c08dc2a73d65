//! Configuration management for the playlens dashboard backend.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. It provides a centralized way to
//! manage application configuration including Spotify and Gemini API
//! credentials, server settings, and other runtime parameters.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use dotenv;
use std::{env, path::PathBuf};

/// Default ordered list of Gemini models to try during setup.
pub const DEFAULT_GEMINI_MODELS: [&str; 3] =
    ["gemini-1.5-pro", "gemini-1.5-flash", "gemini-2.0-pro"];

/// Hard wall-clock timeout applied to every outbound HTTP request, in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `playlens/.env`. This allows users to store
/// credentials securely without hardcoding sensitive values.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/playlens/.env`
/// - macOS: `~/Library/Application Support/playlens/.env`
/// - Windows: `%LOCALAPPDATA%/playlens/.env`
///
/// # Returns
///
/// Returns `Ok(())` if the environment file is successfully loaded, or an
/// error string if directory creation or file loading fails.
///
/// # Example
///
/// ```
/// use playlens::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("playlens/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    dotenv::from_path(path).map_err(|e| e.to_string())?;
    Ok(())
}

/// Returns the address the dashboard HTTP server binds to.
///
/// Retrieves the `SERVER_ADDRESS` environment variable, e.g. `127.0.0.1:8080`.
///
/// # Panics
///
/// Panics if the `SERVER_ADDRESS` environment variable is not set.
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").expect("SERVER_ADDRESS must be set")
}

/// Returns the Spotify Web API base URL.
///
/// Retrieves the `SPOTIFY_API_URL` environment variable which contains the
/// base URL for Spotify's Web API endpoints, e.g. `https://api.spotify.com/v1`.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_URL` environment variable is not set.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").expect("SPOTIFY_API_URL must be set")
}

/// Returns the Spotify OAuth token endpoint URL.
///
/// Retrieves the `SPOTIFY_API_TOKEN_URL` environment variable used by the
/// client-credentials flow, e.g. `https://accounts.spotify.com/api/token`.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_TOKEN_URL` environment variable is not set.
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL").expect("SPOTIFY_API_TOKEN_URL must be set")
}

/// Returns the Spotify API client ID.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_CLIENT_ID` environment variable is not set.
pub fn spotify_client_id() -> String {
    env::var("SPOTIFY_API_CLIENT_ID").expect("SPOTIFY_API_CLIENT_ID must be set")
}

/// Returns the Spotify API client secret.
///
/// # Security Note
///
/// The client secret should be kept confidential and never exposed in logs
/// or version control.
///
/// # Panics
///
/// Panics if the `SPOTIFY_API_CLIENT_SECRET` environment variable is not set.
pub fn spotify_client_secret() -> String {
    env::var("SPOTIFY_API_CLIENT_SECRET").expect("SPOTIFY_API_CLIENT_SECRET must be set")
}

/// Returns the Gemini generative-language API base URL.
///
/// Retrieves the `GEMINI_API_URL` environment variable, e.g.
/// `https://generativelanguage.googleapis.com/v1beta`.
///
/// # Panics
///
/// Panics if the `GEMINI_API_URL` environment variable is not set.
pub fn gemini_apiurl() -> String {
    env::var("GEMINI_API_URL").expect("GEMINI_API_URL must be set")
}

/// Returns the Gemini API key.
///
/// # Panics
///
/// Panics if the `GEMINI_API_KEY` environment variable is not set.
pub fn gemini_api_key() -> String {
    env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY must be set")
}

/// Returns the ordered list of candidate Gemini model identifiers.
///
/// Reads the optional `GEMINI_MODELS` environment variable as a
/// comma-separated list; falls back to [`DEFAULT_GEMINI_MODELS`] when the
/// variable is absent or contains no usable entries. The order matters: the
/// first model that answers a probe call is bound for the session.
pub fn gemini_models() -> Vec<String> {
    match env::var("GEMINI_MODELS") {
        Ok(raw) => {
            let models: Vec<String> = raw
                .split(',')
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect();
            if models.is_empty() {
                DEFAULT_GEMINI_MODELS.iter().map(|m| m.to_string()).collect()
            } else {
                models
            }
        }
        Err(_) => DEFAULT_GEMINI_MODELS.iter().map(|m| m.to_string()).collect(),
    }
}
