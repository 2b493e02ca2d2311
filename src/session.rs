//! Per-session state.
//!
//! Each browser session owns one [`SessionState`]. The only meaningful entry is
//! the client handle: set when a credential resolves, cleared when it fails.
//! Sessions are never torn down explicitly; [`SessionStore`] keeps a bounded
//! number of them and forgets the least recently used first.

use lru::LruCache;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

use crate::gemini::ClientHandle;

/// Where the stored handle's credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Deployment secret store; the input field is hidden.
    SecretStore,
    /// Typed into the masked input field.
    Interactive,
}

#[derive(Debug, Default)]
pub struct SessionState {
    client: Option<ClientHandle>,
    source: Option<CredentialSource>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(&self) -> Option<&ClientHandle> {
        self.client.as_ref()
    }

    pub fn source(&self) -> Option<CredentialSource> {
        self.source
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Stores `handle`, replacing any previous one.
    pub fn set_client(&mut self, handle: ClientHandle, source: CredentialSource) {
        self.client = Some(handle);
        self.source = Some(source);
    }

    pub fn clear_client(&mut self) {
        self.client = None;
        self.source = None;
    }
}

/// Opaque session identifier carried in the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Shared handle to one session's state. Held for a whole render cycle, so a
/// session handles one event at a time.
pub type SharedSession = Arc<tokio::sync::Mutex<SessionState>>;

/// Bounded map from session id to state.
pub struct SessionStore {
    sessions: Mutex<LruCache<SessionId, SharedSession>>,
}

impl SessionStore {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Looks up `id`, or starts a fresh session when it is missing or unknown.
    ///
    /// Returns the id actually in use and whether it was just created.
    pub fn get_or_create(&self, id: Option<SessionId>) -> (SessionId, SharedSession, bool) {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(id) = id {
            if let Some(existing) = sessions.get(&id) {
                return (id, existing.clone(), false);
            }
        }

        let id = SessionId::generate();
        let state: SharedSession = Arc::new(tokio::sync::Mutex::new(SessionState::new()));
        if let Some((evicted, _)) = sessions.push(id, state.clone()) {
            debug!(session = %evicted, "session evicted");
        }
        debug!(session = %id, live = sessions.len(), "session created");
        (id, state, true)
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("live", &self.len())
            .finish()
    }
}
