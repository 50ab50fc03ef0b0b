//! Advisor LLM: chat completion and embedding collaborators
//!
//! Provider-agnostic traits consumed by prompt operations and the memory
//! store, plus an HTTP client for OpenAI and Azure OpenAI.

pub mod openai;
mod types;

pub use openai::{ModelSettings, OpenAiClient, ServiceType};

use advisor_core::AdvisorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sampling parameters for a single completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSettings {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_top_p() -> f32 {
    1.0
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            top_p: default_top_p(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("invalid model configuration: {0}")]
    Config(String),
    #[error("{provider} request failed ({status}): {message}")]
    RequestFailed {
        provider: &'static str,
        status: u16,
        message: String,
    },
    #[error("{provider} returned an unusable response: {message}")]
    InvalidResponse {
        provider: &'static str,
        message: String,
    },
}

impl From<LlmError> for AdvisorError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Config(msg) => AdvisorError::Config(msg),
            other => AdvisorError::Collaborator(other.to_string()),
        }
    }
}

/// Text generation backend.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, prompt: &str, settings: &CompletionSettings) -> Result<String, LlmError>;
}

/// Embedding backend. Returns one vector per input, in input order.
#[async_trait]
pub trait TextEmbedding: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}
