//! Classification of generation failures.
//!
//! The Gemini API reports failures with an HTTP status and a gRPC-style
//! `error.status` string (e.g. `RESOURCE_EXHAUSTED`). Both are folded into a
//! single [`ErrorKind`] so notices and logs can name the failure consistently.
//!
//! ## Example
//!
//! ```rust
//! use daily_english::error_code::ErrorKind;
//!
//! let kind = ErrorKind::classify(429, Some("RESOURCE_EXHAUSTED"));
//! assert_eq!(kind, ErrorKind::QuotaExhausted);
//! assert_eq!(kind.name(), "quota_exhausted");
//! ```

use std::fmt;

/// Kind of a failed credential or generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed request, invalid parameters, or missing required fields
    InvalidRequest,
    /// Invalid, expired, or missing API key
    Authentication,
    /// Valid credentials but insufficient permissions
    PermissionDenied,
    /// Requested model or endpoint does not exist
    NotFound,
    /// Request rate limit exceeded
    RateLimited,
    /// Account usage quota or billing limit reached
    QuotaExhausted,
    /// Internal server error on provider side
    ServerError,
    /// Provider service temporarily overloaded
    Overloaded,
    /// Request timed out before response received
    Timeout,
    /// Connection could not be established or was dropped
    Network,
    /// Response arrived but did not carry the expected text payload
    MalformedResponse,
    /// Error could not be classified
    Unknown,
}

impl ErrorKind {
    /// Returns the standard name (e.g., `"invalid_request"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Authentication => "authentication",
            Self::PermissionDenied => "permission_denied",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::QuotaExhausted => "quota_exhausted",
            Self::ServerError => "server_error",
            Self::Overloaded => "overloaded",
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::MalformedResponse => "malformed_response",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the user can fix this by entering a different key.
    #[inline]
    pub fn is_credential_problem(&self) -> bool {
        matches!(self, Self::Authentication | Self::PermissionDenied)
    }

    /// Maps a Gemini `error.status` string to the corresponding kind.
    ///
    /// Supports the canonical gRPC status names as well as the `reason` values
    /// Gemini attaches to key failures (e.g. `"API_KEY_INVALID"`).
    pub fn from_provider_status(status: &str) -> Option<Self> {
        let kind = match status {
            "INVALID_ARGUMENT" | "FAILED_PRECONDITION" | "OUT_OF_RANGE" => Self::InvalidRequest,
            "UNAUTHENTICATED" | "API_KEY_INVALID" | "API_KEY_EXPIRED" => Self::Authentication,
            "PERMISSION_DENIED" => Self::PermissionDenied,
            "NOT_FOUND" => Self::NotFound,
            "RESOURCE_EXHAUSTED" => Self::QuotaExhausted,
            "INTERNAL" | "UNKNOWN" | "DATA_LOSS" => Self::ServerError,
            "UNAVAILABLE" => Self::Overloaded,
            "DEADLINE_EXCEEDED" => Self::Timeout,
            _ => return None,
        };
        Some(kind)
    }

    /// Maps an HTTP status code to the most likely kind.
    ///
    /// Status codes without a mapping return `ErrorKind::Unknown`.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidRequest,
            401 => Self::Authentication,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            408 | 504 => Self::Timeout,
            429 => Self::RateLimited,
            500 => Self::ServerError,
            502 | 503 => Self::Overloaded,
            _ => Self::Unknown,
        }
    }

    /// Combines the HTTP status with the provider status; the provider status wins
    /// when it is recognised.
    pub fn classify(http_status: u16, provider_status: Option<&str>) -> Self {
        provider_status
            .and_then(Self::from_provider_status)
            .unwrap_or_else(|| Self::from_http_status(http_status))
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
