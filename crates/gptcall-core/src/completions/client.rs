//! OpenAI completions client
//!
//! Async HTTP client for the GPT-3 engines completions API:
//! - Parameter validation as an early-return gate (no network I/O on failure)
//! - Bearer-token authenticated POST per engine endpoint
//! - Single-shot callback submission delivering exactly one outcome

use std::time::Duration;

use reqwest::Client as HttpClient;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::types::{
    Completion, CompletionOutcome, CompletionRequest, CompletionResponse, CompletionSettings,
    Engine,
};

/// OpenAI API base URL
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Callback receiving the outcome of a submitted request
pub type OutcomeCallback = Box<dyn FnOnce(CompletionOutcome) + Send + 'static>;

/// GPT-3 completions client
///
/// Thread-safe client for making completion requests. Each invocation is
/// independent: no retries, no shared request state, one outcome per call.
#[derive(Clone)]
pub struct CompletionClient {
    /// HTTP client for making requests
    http_client: HttpClient,
    /// API key for authentication
    api_key: String,
    /// Base URL for the API
    base_url: String,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Builder for creating a CompletionClient
pub struct CompletionClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl Default for CompletionClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout_secs: None,
        }
    }

    /// Set the API key
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL (defaults to the OpenAI API)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Build the CompletionClient
    pub fn build(self) -> Result<CompletionClient> {
        let api_key = self.api_key.ok_or(Error::ApiKeyMissing)?;

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(
                self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(CompletionClient {
            http_client,
            api_key,
            base_url: self
                .base_url
                .unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
        })
    }
}

impl CompletionClient {
    /// Create a new client with the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        CompletionClientBuilder::new().api_key(api_key).build()
    }

    /// Create a new builder for CompletionClient
    pub fn builder() -> CompletionClientBuilder {
        CompletionClientBuilder::new()
    }

    /// Endpoint URL for the given engine
    pub fn endpoint_url(&self, engine: Engine) -> String {
        format!("{}/engines/{}/completions", self.base_url, engine.as_path())
    }

    /// Make a completion request
    ///
    /// Validates the parameters, sends the request, and parses the choices
    /// in API order. Validation failures return before any network I/O.
    pub async fn complete(
        &self,
        engine: Engine,
        prompt: &str,
        settings: &CompletionSettings,
    ) -> Result<Vec<Completion>> {
        validate_parameters(&self.api_key, prompt, settings)?;

        let request = CompletionRequest::from_settings(prompt, settings);
        let url = self.endpoint_url(engine);

        debug!(
            engine = %engine,
            max_tokens = request.max_tokens,
            n = request.n,
            "Sending completion request"
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Error processing request");
                Error::Transport(e.to_string())
            })?;

        let body = response.text().await.map_err(|e| {
            warn!(url = %url, error = %e, "Error reading response body");
            Error::Transport(e.to_string())
        })?;

        parse_completions(&body)
    }

    /// Submit a completion request, delivering the outcome via callback
    ///
    /// Fire-and-forget: returns immediately after spawning the request task.
    /// The callback is invoked exactly once, on the runtime's worker context,
    /// whether the request succeeds, fails validation, or fails in transit.
    pub fn submit(
        &self,
        engine: Engine,
        prompt: impl Into<String>,
        settings: CompletionSettings,
        on_outcome: OutcomeCallback,
    ) -> JoinHandle<()> {
        let client = self.clone();
        let prompt = prompt.into();

        tokio::spawn(async move {
            let result = client.complete(engine, &prompt, &settings).await;
            on_outcome(CompletionOutcome::from(result));
        })
    }
}

/// Validate request parameters before any network I/O
///
/// The checks mirror the API contract: a non-empty key and prompt,
/// `best_of >= n`, and `max_tokens` strictly inside (0, 2048).
fn validate_parameters(api_key: &str, prompt: &str, settings: &CompletionSettings) -> Result<()> {
    if api_key.is_empty() {
        return Err(Error::ApiKeyMissing);
    }
    if prompt.is_empty() {
        return Err(Error::InvalidParameters("Prompt is empty".to_string()));
    }
    if settings.best_of < settings.num_completions {
        return Err(Error::InvalidParameters(
            "BestOf must be greater than numCompletions".to_string(),
        ));
    }
    if settings.max_tokens == 0 || settings.max_tokens >= 2048 {
        return Err(Error::InvalidParameters(
            "maxTokens must be within 0 and 2048".to_string(),
        ));
    }
    Ok(())
}

/// Parse a completions response body into completion records
///
/// A body carrying an `error` field is the API-error path; the raw body is
/// logged for diagnosis and a generic error is returned. Malformed JSON is
/// an explicit parse error rather than a silent drop.
pub fn parse_completions(body: &str) -> Result<Vec<Completion>> {
    let value: serde_json::Value = serde_json::from_str(body)?;

    if value.get("error").is_some() {
        warn!(body = %body, "Api error response");
        return Err(Error::Api);
    }

    let response: CompletionResponse = serde_json::from_value(value)?;
    Ok(response.choices.into_iter().map(Completion::from).collect())
}
