//! Request handlers. Each handler maps one request to an [`AppEvent`] and
//! renders the resulting page.

use axum::{
    extract::{Form, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    response::{Html, IntoResponse, Json, Response},
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::app::AppEvent;
use crate::render::render_page;
use crate::session::SessionId;

use super::AppState;

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "daily_english_session";

#[derive(Debug, Deserialize)]
pub struct CredentialForm {
    #[serde(default)]
    pub api_key: String,
}

/// Extracts the session id from the `Cookie` header, ignoring malformed values.
pub fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.trim().parse().ok())
}

async fn run_event(state: &AppState, headers: &HeaderMap, event: AppEvent) -> Response {
    let (id, session, created) = state.sessions.get_or_create(session_from_headers(headers));
    debug!(session = %id, event = %redacted(&event), "handling event");

    let page = {
        let mut guard = session.lock().await;
        state.app.handle(&mut guard, event).await
    };

    let mut response = Html(render_page(&page)).into_response();
    if created {
        let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().insert(SET_COOKIE, value);
            }
            Err(e) => warn!(error = %e, "could not encode session cookie"),
        }
    }
    response
}

/// Events are logged without the typed key.
fn redacted(event: &AppEvent) -> &'static str {
    match event {
        AppEvent::PageLoaded => "page_loaded",
        AppEvent::CredentialChanged(_) => "credential_changed",
        AppEvent::GenerateTriggered => "generate_triggered",
    }
}

/// `GET /`
pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    run_event(&state, &headers, AppEvent::PageLoaded).await
}

/// `POST /credential`
pub async fn update_credential(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<CredentialForm>,
) -> Response {
    run_event(&state, &headers, AppEvent::CredentialChanged(form.api_key)).await
}

/// `POST /generate`
pub async fn generate(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    run_event(&state, &headers, AppEvent::GenerateTriggered).await
}

/// `GET /health`
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HashMap<String, String>> {
    let mut response = HashMap::new();
    response.insert("status".to_string(), "healthy".to_string());
    response.insert("service".to_string(), env!("CARGO_PKG_NAME").to_string());
    response.insert("model".to_string(), state.app.generator().model().to_string());
    response.insert("sessions".to_string(), state.sessions.len().to_string());
    Json(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_found_among_others() {
        let id = SessionId::generate();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={id}; other=1")).unwrap(),
        );
        assert_eq!(session_from_headers(&headers), Some(id));
    }

    #[test]
    fn malformed_or_missing_cookie_is_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_from_headers(&headers), None);
        headers.insert(
            COOKIE,
            HeaderValue::from_static("daily_english_session=not-a-uuid"),
        );
        assert_eq!(session_from_headers(&headers), None);
    }
}
