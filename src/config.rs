//! Runtime configuration.
//!
//! Defaults are production-friendly and every field can be overridden from the
//! environment (`DAILY_ENGLISH_*`). The binary layers command-line flags on top.

use crate::error::{Error, ErrorContext};
use crate::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Public Gemini API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default location of the deployment secrets file.
pub const DEFAULT_SECRETS_FILE: &str = ".secrets/secrets.yaml";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Interface the web server binds to.
    pub host: String,
    pub port: u16,
    /// Gemini model identifier, e.g. `gemini-2.5-flash`.
    pub model: String,
    /// Scheme + host of the Gemini API. Overridden in tests to point at a mock server.
    pub base_url: String,
    /// Timeout for the single outbound generation call.
    pub request_timeout: Duration,
    /// Upper bound on live sessions; the least recently used one is dropped first.
    pub max_sessions: usize,
    /// YAML file consulted for `GEMINI_API_KEY` after the environment.
    pub secrets_file: PathBuf,
    /// Optional HTTP(S) proxy for outbound calls.
    pub proxy_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(60),
            max_sessions: 1024,
            secrets_file: PathBuf::from(DEFAULT_SECRETS_FILE),
            proxy_url: None,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    ///
    /// Unparseable numbers are rejected instead of silently ignored so that a
    /// typo in a deployment does not go unnoticed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(host) = lookup("DAILY_ENGLISH_HOST") {
            cfg.host = host;
        }
        if let Some(port) = lookup("DAILY_ENGLISH_PORT") {
            cfg.port = parse_var("DAILY_ENGLISH_PORT", &port)?;
        }
        if let Some(model) = lookup("DAILY_ENGLISH_MODEL") {
            cfg.model = model;
        }
        if let Some(base_url) = lookup("DAILY_ENGLISH_BASE_URL") {
            cfg.base_url = base_url;
        }
        if let Some(secs) = lookup("DAILY_ENGLISH_TIMEOUT_SECS") {
            cfg.request_timeout =
                Duration::from_secs(parse_var("DAILY_ENGLISH_TIMEOUT_SECS", &secs)?);
        }
        if let Some(n) = lookup("DAILY_ENGLISH_MAX_SESSIONS") {
            cfg.max_sessions = parse_var("DAILY_ENGLISH_MAX_SESSIONS", &n)?;
        }
        if let Some(path) = lookup("DAILY_ENGLISH_SECRETS_FILE") {
            cfg.secrets_file = PathBuf::from(path);
        }
        cfg.proxy_url = lookup("AI_PROXY_URL").filter(|s| !s.trim().is_empty());

        cfg.validate()?;
        Ok(cfg)
    }

    /// Check invariants that would otherwise only surface at request time.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "model must not be empty",
                ErrorContext::new().with_field_path("model"),
            ));
        }
        let url = url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                "base_url is not a valid URL",
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(e.to_string()),
            )
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                "base_url must use http or https",
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(url.scheme().to_string()),
            ));
        }
        if self.max_sessions == 0 {
            return Err(Error::configuration_with_context(
                "max_sessions must be at least 1",
                ErrorContext::new().with_field_path("max_sessions"),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::configuration_with_context(
                "request timeout must be positive",
                ErrorContext::new().with_field_path("request_timeout"),
            ));
        }
        Ok(())
    }

    /// `host:port` string suitable for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| {
        Error::configuration_with_context(
            format!("invalid value for {}", name),
            ErrorContext::new()
                .with_field_path(name)
                .with_details(e.to_string()),
        )
    })
}
