//! Gemini text generation.
//!
//! The rest of the app talks to the model through [`TextGenerator`], so the
//! session only ever holds an `Arc<dyn TextGenerator>`. [`GeminiClient`] is the
//! real implementation; tests substitute their own.

pub mod client;
pub mod wire;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::secrets::ApiKey;
use crate::Result;

pub use client::{ClientOptions, GeminiClient};

/// Sampling parameters sent as `generationConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GenerationConfig {
    pub temperature: Option<f64>,
}

/// One generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub config: GenerationConfig,
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageInfo {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Text returned by the model for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateResponse {
    pub text: String,
    /// Finish reason normalized to `stop` / `length` / `content_filter`.
    pub finish_reason: Option<String>,
    pub usage: Option<UsageInfo>,
}

/// An authenticated connection to a text generation service.
#[async_trait]
pub trait TextGenerator: Send + Sync + fmt::Debug {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;
}

/// The opaque client handle kept in session state.
pub type ClientHandle = Arc<dyn TextGenerator>;

/// Builds a client handle from an API key.
pub trait ClientFactory: Send + Sync {
    fn connect(&self, key: &ApiKey) -> Result<ClientHandle>;
}

/// Factory producing [`GeminiClient`]s that share the same options.
#[derive(Debug, Clone)]
pub struct GeminiClientFactory {
    options: ClientOptions,
}

impl GeminiClientFactory {
    pub fn new(options: ClientOptions) -> Self {
        Self { options }
    }
}

impl ClientFactory for GeminiClientFactory {
    fn connect(&self, key: &ApiKey) -> Result<ClientHandle> {
        Ok(Arc::new(GeminiClient::new(key, &self.options)?))
    }
}
