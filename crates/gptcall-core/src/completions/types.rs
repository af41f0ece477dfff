//! Completion types for the OpenAI GPT-3 engines API
//!
//! These types match the `/v1/engines/{engine}/completions` wire format.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// GPT-3 engine selecting which model variant serves the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Most capable engine
    Davinci,
    /// Capable and fast
    Curie,
    /// Suited to straightforward tasks
    Babbage,
    /// Fastest, lowest cost
    Ada,
}

impl Engine {
    /// Endpoint path segment for this engine
    pub fn as_path(&self) -> &'static str {
        match self {
            Engine::Davinci => "davinci",
            Engine::Curie => "curie",
            Engine::Babbage => "babbage",
            Engine::Ada => "ada",
        }
    }

    /// Human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Engine::Davinci => "DAVINCI",
            Engine::Curie => "CURIE",
            Engine::Babbage => "BABBAGE",
            Engine::Ada => "ADA",
        }
    }

    /// All known engines
    pub fn all() -> [Engine; 4] {
        [Engine::Davinci, Engine::Curie, Engine::Babbage, Engine::Ada]
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_path())
    }
}

impl std::str::FromStr for Engine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "davinci" => Ok(Engine::Davinci),
            "curie" => Ok(Engine::Curie),
            "babbage" => Ok(Engine::Babbage),
            "ada" => Ok(Engine::Ada),
            other => Err(Error::InvalidParameters(format!(
                "Unknown engine '{}'. Expected one of: davinci, curie, babbage, ada.",
                other
            ))),
        }
    }
}

/// Typed settings bundle for a completion request
///
/// Serializable so CLI defaults can be persisted in the config file.
/// Clamping and omission rules are applied when the wire request is built,
/// not here, so the stored values round-trip unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    /// Prefix concatenated in front of the prompt
    pub start_sequence: String,
    /// Stop sequence, omitted from the payload when empty
    pub stop_sequence: String,
    /// Maximum tokens to generate (valid range 1..=2047)
    pub max_tokens: u32,
    /// Sampling temperature, clamped to 0..=1 on send
    pub temperature: f32,
    /// Nucleus sampling parameter, clamped to 0..=1 on send
    pub top_p: f32,
    /// Number of completions to return
    pub num_completions: u32,
    /// Server-side candidates generated before selecting the top
    /// `num_completions`; must be >= `num_completions`
    pub best_of: u32,
    /// Presence penalty, omitted when zero, clamped to 0..=1 on send
    pub presence_penalty: f32,
    /// Frequency penalty, omitted when zero, clamped to 0..=1 on send
    pub frequency_penalty: f32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            start_sequence: String::new(),
            stop_sequence: String::new(),
            max_tokens: 100,
            temperature: 0.7,
            top_p: 1.0,
            num_completions: 1,
            best_of: 1,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
        }
    }
}

/// Request body for the completions endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    /// Full prompt (start sequence + caller prompt)
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature (already clamped)
    pub temperature: f32,
    /// Nucleus sampling parameter (already clamped)
    pub top_p: f32,
    /// Number of completions to return
    pub n: u32,
    /// Server-side candidate count
    pub best_of: u32,
    /// Presence penalty, absent when zero in the settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    /// Frequency penalty, absent when zero in the settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    /// Stop sequence, absent when empty in the settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<String>,
}

impl CompletionRequest {
    /// Build the wire request from a prompt and settings, applying the
    /// clamping and omission rules
    pub fn from_settings(prompt: &str, settings: &CompletionSettings) -> Self {
        Self {
            prompt: format!("{}{}", settings.start_sequence, prompt),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature.clamp(0.0, 1.0),
            top_p: settings.top_p.clamp(0.0, 1.0),
            n: settings.num_completions,
            best_of: settings.best_of,
            presence_penalty: (settings.presence_penalty != 0.0)
                .then(|| settings.presence_penalty.clamp(0.0, 1.0)),
            frequency_penalty: (settings.frequency_penalty != 0.0)
                .then(|| settings.frequency_penalty.clamp(0.0, 1.0)),
            stop: (!settings.stop_sequence.is_empty()).then(|| settings.stop_sequence.clone()),
        }
    }
}

/// Reason for completion finishing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop (stop sequence hit or end of response)
    Stop,
    /// Max tokens reached
    Length,
    /// Content filtered by safety system
    ContentFilter,
    /// Unknown reason (catch-all)
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinishReason::Stop => write!(f, "stop"),
            FinishReason::Length => write!(f, "length"),
            FinishReason::ContentFilter => write!(f, "content_filter"),
            FinishReason::Unknown => write!(f, "unknown"),
        }
    }
}

/// A single choice object from the API response
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// The generated text
    #[serde(default)]
    pub text: String,
    /// Index of this choice
    pub index: Option<usize>,
    /// Reason the generation stopped
    pub finish_reason: Option<FinishReason>,
    /// Log-probabilities, present only when requested
    pub logprobs: Option<serde_json::Value>,
}

/// Response envelope from the completions endpoint
///
/// Envelope fields are optional so parsing stays lenient about anything
/// other than the choices array.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    /// Unique identifier for this completion
    pub id: Option<String>,
    /// Model that served the request
    pub model: Option<String>,
    /// Unix timestamp of creation
    pub created: Option<u64>,
    /// List of completion choices
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// A single generated completion
#[derive(Debug, Clone)]
pub struct Completion {
    /// The generated text
    pub text: String,
    /// Position of this completion in the returned array
    pub index: Option<usize>,
    /// Reason the generation stopped
    pub finish_reason: Option<FinishReason>,
    /// Log-probabilities, present only when requested
    pub logprobs: Option<serde_json::Value>,
}

impl From<Choice> for Completion {
    fn from(choice: Choice) -> Self {
        Self {
            text: choice.text,
            index: choice.index,
            finish_reason: choice.finish_reason,
            logprobs: choice.logprobs,
        }
    }
}

/// Outcome delivered exactly once per submitted request
#[derive(Debug, Clone, Default)]
pub struct CompletionOutcome {
    /// Completions in API order, empty on failure
    pub completions: Vec<Completion>,
    /// Error message, empty on success
    pub error: String,
    /// Whether the request produced completions
    pub success: bool,
}

impl CompletionOutcome {
    /// Successful outcome carrying the parsed completions
    pub fn ok(completions: Vec<Completion>) -> Self {
        Self {
            completions,
            error: String::new(),
            success: true,
        }
    }

    /// Failed outcome carrying an error message
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            completions: Vec::new(),
            error: error.into(),
            success: false,
        }
    }
}

impl From<crate::error::Result<Vec<Completion>>> for CompletionOutcome {
    fn from(result: crate::error::Result<Vec<Completion>>) -> Self {
        match result {
            Ok(completions) => Self::ok(completions),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}
