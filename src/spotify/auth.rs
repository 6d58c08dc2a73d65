use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;

use crate::{
    config,
    types::{SpotifyError, Token},
};

/// Manages the Spotify client-credentials access token for the session.
///
/// Only public playlist data is read, so no user authorization is involved:
/// the manager exchanges the configured client ID/secret for an app token and
/// refreshes it in memory shortly before expiry. Nothing is persisted.
pub struct TokenManager {
    token: Option<Token>,
}

impl TokenManager {
    pub fn new() -> Self {
        TokenManager { token: None }
    }

    /// Returns a currently valid access token, requesting a fresh one from
    /// the token endpoint when none is held or the held one is about to
    /// expire.
    ///
    /// # Errors
    ///
    /// Propagates network errors and non-success responses from the token
    /// endpoint as [`SpotifyError`]. A failure here means the configured
    /// credentials are unusable and is surfaced to the caller directly.
    pub async fn get_valid_token(&mut self) -> Result<String, SpotifyError> {
        if self.is_expired() {
            self.token = Some(Self::request_token().await?);
        }

        Ok(self
            .token
            .as_ref()
            .map(|t| t.access_token.clone())
            .unwrap_or_default())
    }

    fn is_expired(&self) -> bool {
        match &self.token {
            Some(token) => {
                let now = Utc::now().timestamp() as u64;
                // refresh 4 minutes early
                now >= token.obtained_at + token.expires_in.saturating_sub(240)
            }
            None => true,
        }
    }

    async fn request_token() -> Result<Token, SpotifyError> {
        let credentials = STANDARD.encode(format!(
            "{}:{}",
            config::spotify_client_id(),
            config::spotify_client_secret()
        ));

        let client = super::http_client();
        let response = client
            .post(&config::spotify_apitoken_url())
            .header("Authorization", format!("Basic {}", credentials))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SpotifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let mut token = response.json::<Token>().await?;
        token.obtained_at = Utc::now().timestamp() as u64;
        Ok(token)
    }
}

impl Default for TokenManager {
    fn default() -> Self {
        Self::new()
    }
}
