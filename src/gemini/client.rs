use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::time::sleep;

use crate::{
    config,
    retry::RetryPolicy,
    success,
    types::{
        GeminiError, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
        RequestContent, RequestPart,
    },
    warning,
};

/// Fixed error-shaped reply emitted when no Gemini model is available, so
/// the normalization pipeline always receives parseable text.
pub const FALLBACK_REPLY: &str = r#"{"error": "Gemini unavailable. Using fallback response."}"#;

/// Sampling parameters for a generation call.
///
/// Lower `temperature` makes the reply more deterministic; `top_p`/`top_k`
/// bound the sampling breadth; `max_output_tokens` hard-caps reply length.
#[derive(Debug, Clone, Copy)]
pub struct GenerationOptions {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl GenerationOptions {
    /// Conservative settings for the structured analysis reply.
    pub fn analysis() -> Self {
        GenerationOptions {
            temperature: 0.3,
            top_p: 0.9,
            top_k: 40,
            max_output_tokens: 1024,
        }
    }

    /// Slightly looser settings for recommendation variety.
    pub fn recommendations() -> Self {
        GenerationOptions {
            temperature: 0.6,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 2048,
        }
    }
}

/// A Gemini model binding for the session.
///
/// [`GeminiModel::setup`] probes an ordered candidate list and binds the
/// first model that answers; when every candidate fails the binding becomes
/// a fallback stub whose `generate` returns [`FALLBACK_REPLY`] instead of
/// an error, so downstream code never crashes on total API unavailability.
pub struct GeminiModel {
    client: Client,
    model: Option<String>,
}

impl GeminiModel {
    /// Probes the configured candidate models in order and binds the first
    /// one that responds to a trivial `"Hello"` call.
    ///
    /// # Candidate List
    ///
    /// Taken from `GEMINI_MODELS` (comma-separated) or the built-in default
    /// order: `gemini-1.5-pro`, `gemini-1.5-flash`, `gemini-2.0-pro`.
    ///
    /// # Fallback Behavior
    ///
    /// If no candidate answers the probe, the returned binding is a stub:
    /// every `generate` call yields a fixed error-shaped JSON string that the
    /// normalization pipeline recognizes and degrades on. Total model
    /// unavailability therefore never surfaces as a hard failure.
    pub async fn setup() -> GeminiModel {
        let client = Client::builder()
            .timeout(Duration::from_secs(config::HTTP_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        for candidate in config::gemini_models() {
            match Self::probe(&client, &candidate).await {
                Ok(()) => {
                    success!("Using Gemini model: {}", candidate);
                    return GeminiModel {
                        client,
                        model: Some(candidate),
                    };
                }
                Err(e) => {
                    warning!("Model {} failed probe: {}", candidate, e);
                }
            }
        }

        warning!("No Gemini model responded. Falling back to offline responses.");
        GeminiModel {
            client,
            model: None,
        }
    }

    /// True when no model answered the probe and replies are stubbed.
    pub fn is_fallback(&self) -> bool {
        self.model.is_none()
    }

    async fn probe(client: &Client, model: &str) -> Result<(), GeminiError> {
        let options = GenerationOptions {
            temperature: 0.0,
            top_p: 1.0,
            top_k: 1,
            max_output_tokens: 8,
        };
        Self::request(client, model, "Hello", &options).await.map(|_| ())
    }

    /// Sends a prompt to the bound model and returns the raw reply text.
    ///
    /// # Arguments
    ///
    /// * `prompt` - The full prompt text
    /// * `options` - Sampling parameters for this call
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(String)` - The raw text of the first reply candidate (or the
    ///   fixed fallback payload when no model is bound)
    /// - `Err(GeminiError)` - A non-retryable API error, or
    ///   `RetriesExhausted` after the backoff schedule ran out
    ///
    /// # Retry Logic
    ///
    /// Rate-limit (429) and server-side (5xx) responses, network errors, and
    /// empty replies are retried with exponential backoff - base delay
    /// doubling per attempt plus random jitter in [0, 1) seconds - up to the
    /// [`RetryPolicy`] ceiling of 5 attempts. Exhausting the ceiling
    /// surfaces the last error to the caller. Other client errors are
    /// propagated immediately.
    pub async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GeminiError> {
        let Some(model) = &self.model else {
            return Ok(FALLBACK_REPLY.to_string());
        };

        let policy = RetryPolicy::default();
        let mut last_error = String::new();

        for attempt in 0..policy.max_attempts {
            match Self::request(&self.client, model, prompt, options).await {
                Ok(text) => return Ok(text),
                Err(GeminiError::Api { status, message }) if !retryable_status(status) => {
                    return Err(GeminiError::Api { status, message });
                }
                Err(e) => {
                    last_error = e.to_string();
                    if policy.attempts_left(attempt) {
                        let delay = policy.delay(attempt);
                        warning!(
                            "Gemini call failed ({}), retrying in {:.1}s",
                            last_error,
                            delay.as_secs_f64()
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        Err(GeminiError::RetriesExhausted(last_error))
    }

    async fn request(
        client: &Client,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GeminiError> {
        let api_url = format!(
            "{uri}/models/{model}:generateContent?key={key}",
            uri = &config::gemini_apiurl(),
            model = model,
            key = &config::gemini_api_key()
        );

        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: options.temperature,
                top_p: options.top_p,
                top_k: options.top_k,
                max_output_tokens: options.max_output_tokens,
            },
        };

        let response = client.post(&api_url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply = response.json::<GenerateContentResponse>().await?;
        let text = reply
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(GeminiError::EmptyReply);
        }

        Ok(text)
    }
}

fn retryable_status(status: u16) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS.as_u16() || status >= 500
}
