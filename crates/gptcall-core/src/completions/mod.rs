//! Completions - OpenAI GPT-3 engines API
//!
//! This module provides:
//! - HTTP client for the per-engine completions endpoint
//! - Request/response types matching the completions wire format
//! - Typed settings with clamping and field omission rules
//! - Single-shot callback submission (exactly one outcome per request)

mod client;
mod types;

pub use client::{parse_completions, CompletionClient, CompletionClientBuilder, OutcomeCallback};
pub use types::{
    Choice, Completion, CompletionOutcome, CompletionRequest, CompletionResponse,
    CompletionSettings, Engine, FinishReason,
};
