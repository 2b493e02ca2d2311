//! Web front-end.
//!
//! A handful of server-rendered routes on top of [`App`]:
//!
//! | Route | Event |
//! |-------|-------|
//! | `GET /` | [`AppEvent::PageLoaded`](crate::app::AppEvent::PageLoaded) |
//! | `POST /credential` | [`AppEvent::CredentialChanged`](crate::app::AppEvent::CredentialChanged) |
//! | `POST /generate` | [`AppEvent::GenerateTriggered`](crate::app::AppEvent::GenerateTriggered) |
//! | `GET /health` | JSON status |

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::App;
use crate::config::AppConfig;
use crate::credential::CredentialManager;
use crate::dialogue::DialogueGenerator;
use crate::error::{Error, ErrorContext};
use crate::gemini::{ClientOptions, GeminiClientFactory};
use crate::secrets::{LayeredSecrets, SecretStore};
use crate::session::SessionStore;
use crate::Result;

use handlers::{generate, health_check, index, update_credential};

/// Shared state behind every handler.
#[derive(Debug)]
pub struct AppState {
    pub app: App,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(app: App, max_sessions: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(max_sessions).ok_or_else(|| {
            Error::configuration_with_context(
                "max_sessions must be at least 1",
                ErrorContext::new().with_field_path("max_sessions"),
            )
        })?;
        Ok(Self {
            app,
            sessions: SessionStore::new(capacity),
        })
    }

    /// Wires the real Gemini client factory and the given secret store.
    ///
    /// The secret is read here, once; later changes to the store are not seen.
    /// An entry that exists but is empty still hides the input field.
    pub fn from_config(config: &AppConfig, secrets: &dyn SecretStore) -> Result<Self> {
        let secret = crate::secrets::resolve_api_key(secrets);
        info!(
            secret_store = secret.is_present(),
            model = %config.model,
            "credential mode resolved"
        );
        let factory = Arc::new(GeminiClientFactory::new(ClientOptions::from(config)));
        let app = App::new(
            CredentialManager::new(factory, secret),
            DialogueGenerator::new(config.model.clone()),
        );
        Self::new(app, config.max_sessions)
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/credential", post(update_credential))
        .route("/generate", post(generate))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The HTTP server.
pub struct WebServer {
    config: AppConfig,
    state: Arc<AppState>,
}

impl WebServer {
    pub fn new(config: AppConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// Reads secrets from the standard layered store and builds the server.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let secrets = LayeredSecrets::standard(&config.secrets_file);
        let state = AppState::from_config(&config, &secrets)?;
        Ok(Self::new(config, state))
    }

    /// Serves until Ctrl-C.
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("Daily English listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
