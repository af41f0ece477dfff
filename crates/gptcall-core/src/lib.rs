//! gptcall Core Library
//!
//! This crate provides the core functionality for gptcall, including:
//! - Completions client (OpenAI GPT-3 engines API)
//! - Typed completion settings with clamping and field omission rules
//! - Single-shot callback submission (exactly one outcome per request)
//! - Configuration (persisted TOML + environment API key resolution)

pub mod completions;
pub mod config;
pub mod error;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::completions::{
        Completion, CompletionClient, CompletionOutcome, CompletionSettings, Engine,
    };
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
}

#[cfg(test)]
mod completions_tests;
