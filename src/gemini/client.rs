use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Proxy;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::{AppConfig, DEFAULT_BASE_URL};
use crate::error::{Error, ErrorContext};
use crate::secrets::ApiKey;
use crate::Result;

use super::{wire, GenerateRequest, GenerateResponse, TextGenerator};

/// Header Gemini reads the API key from.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Connection settings shared by every client the app creates.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    pub base_url: String,
    pub timeout: Duration,
    pub proxy_url: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            proxy_url: None,
        }
    }
}

impl From<&AppConfig> for ClientOptions {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            base_url: cfg.base_url.clone(),
            timeout: cfg.request_timeout,
            proxy_url: cfg.proxy_url.clone(),
        }
    }
}

/// HTTP client for the Gemini `generateContent` endpoint.
///
/// Construction does not touch the network; a bad key is only discovered by
/// the first generation call.
#[derive(Debug)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(key: &ApiKey, options: &ClientOptions) -> Result<Self> {
        let raw = key.expose();
        if raw.is_empty() {
            return Err(Error::validation_with_context(
                "API key is empty",
                ErrorContext::new()
                    .with_field_path("api_key")
                    .with_source("gemini_client"),
            ));
        }
        if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(Error::validation_with_context(
                "API key must not contain whitespace or control characters",
                ErrorContext::new()
                    .with_field_path("api_key")
                    .with_source("gemini_client"),
            ));
        }

        let mut value = HeaderValue::from_str(raw).map_err(|e| {
            Error::validation_with_context(
                "API key cannot be sent as an HTTP header",
                ErrorContext::new()
                    .with_field_path("api_key")
                    .with_details(e.to_string())
                    .with_source("gemini_client"),
            )
        })?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, value);

        let mut builder = reqwest::Client::builder()
            .timeout(options.timeout)
            .default_headers(headers);

        if let Some(proxy_url) = &options.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    "invalid proxy URL",
                    ErrorContext::new()
                        .with_field_path("proxy_url")
                        .with_details(e.to_string())
                        .with_source("gemini_client"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| {
            Error::configuration_with_context(
                "failed to build HTTP client",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("gemini_client"),
            )
        })?;

        Ok(Self {
            client,
            base_url: options.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = self.endpoint(&request.model);
        let body = wire::build_body(request);
        let started = Instant::now();

        debug!(model = %request.model, "sending generateContent request");
        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = wire::parse_error(status.as_u16(), &text);
            info!(
                model = %request.model,
                status = status.as_u16(),
                kind = %err.kind(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "generateContent failed"
            );
            return Err(err);
        }

        let json: serde_json::Value = response.json().await?;
        let parsed = wire::parse_response(&json)?;
        info!(
            model = %request.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            finish_reason = parsed.finish_reason.as_deref().unwrap_or("-"),
            total_tokens = parsed.usage.as_ref().map(|u| u.total_tokens).unwrap_or(0),
            "generateContent succeeded"
        );
        Ok(parsed)
    }
}
