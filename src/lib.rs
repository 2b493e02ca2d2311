//! # daily-english
//!
//! A small web app that hands out one everyday English dialogue at a time,
//! with Korean notes on context and key expressions, generated by Google Gemini.
//!
//! ## Overview
//!
//! Two components run against a per-session state object:
//!
//! - **Credential manager** ([`credential`]): takes the Gemini API key from the
//!   deployment secret store or, failing that, from a masked input field, and
//!   stores a client handle in the session.
//! - **Dialogue generator** ([`dialogue`]): on request, sends a fixed prompt
//!   with `temperature = 0.8`, dedents and strips the answer, and renders it.
//!
//! Requests are turned into explicit events ([`app::AppEvent`]) rather than
//! re-running everything on every interaction. Every failure becomes a notice
//! on the page; none of them stops the server.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use daily_english::{AppConfig, WebServer};
//!
//! #[tokio::main]
//! async fn main() -> daily_english::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     WebServer::from_config(config)?.serve().await
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`app`] | Event handling and the page view model |
//! | [`config`] | Runtime configuration and environment overrides |
//! | [`credential`] | API key resolution and client construction |
//! | [`dialogue`] | Prompt, generation call and result tidying |
//! | [`gemini`] | Gemini HTTP client behind the [`gemini::TextGenerator`] trait |
//! | [`render`] | HTML page and Markdown rendering |
//! | [`secrets`] | Environment, file and keyring secret stores |
//! | [`session`] | Per-session state and the session store |
//! | [`text`] | Dedent and strip |
//! | [`web`] | axum routes and server |

pub mod app;
pub mod config;
pub mod credential;
pub mod dialogue;
pub mod error_code;
pub mod gemini;
pub mod render;
pub mod secrets;
pub mod session;
pub mod text;
pub mod web;

// Re-export main types for convenience
pub use app::{App, AppEvent, Notice, NoticeLevel, Page};
pub use config::AppConfig;
pub use credential::{CredentialManager, CredentialOutcome};
pub use dialogue::{DialogueGenerator, GenerationOutcome, Lesson};
pub use gemini::{ClientFactory, ClientHandle, GeminiClient, TextGenerator};
pub use session::{CredentialSource, SessionState, SessionStore};
pub use web::{AppState, WebServer};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
