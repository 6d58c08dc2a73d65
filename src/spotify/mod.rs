//! Spotify Web API client.
//!
//! Implements the catalog side of the dashboard: resolving a public playlist,
//! fetching its metadata, and paginating through its tracks. Authentication
//! uses the client-credentials flow since only public data is read.

pub mod auth;
pub mod playlist;

use std::time::Duration;

use reqwest::Client;

use crate::config;

/// Shared outbound HTTP client with the hard request timeout applied.
pub(crate) fn http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(config::HTTP_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| Client::new())
}
