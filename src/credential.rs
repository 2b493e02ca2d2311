//! Credential resolution.
//!
//! A secret-store entry always wins and hides the input field, even when it
//! is empty. Without one, the value typed into the masked field is used.
//! Either way a non-empty value is turned into a client handle and stored in
//! the session; a failure clears whatever handle was there before.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::gemini::ClientFactory;
use crate::secrets::{ApiKey, SecretEntry};
use crate::session::{CredentialSource, SessionState};

/// Result of one credential evaluation.
#[derive(Debug)]
pub enum CredentialOutcome {
    /// A handle was built and stored.
    Configured { source: CredentialSource },
    /// No value was available; nothing was attempted.
    NotConfigured,
    /// A key was available but no handle could be built from it.
    Failed { error: Error },
}

impl CredentialOutcome {
    pub fn is_configured(&self) -> bool {
        matches!(self, CredentialOutcome::Configured { .. })
    }
}

pub struct CredentialManager {
    factory: Arc<dyn ClientFactory>,
    secret: SecretEntry,
}

impl CredentialManager {
    /// `secret` is the secret-store entry resolved at startup; it is not
    /// looked up again while the process runs.
    pub fn new(factory: Arc<dyn ClientFactory>, secret: SecretEntry) -> Self {
        Self { factory, secret }
    }

    /// Whether the key comes from the secret store. When true the interactive
    /// field is not offered and typed values are ignored.
    pub fn uses_secret_store(&self) -> bool {
        self.secret.is_present()
    }

    /// Evaluates the credential for one event and updates `session`.
    ///
    /// `typed` is the current value of the input field, if the event carried
    /// one. It is ignored in secret-store mode.
    pub fn resolve(&self, session: &mut SessionState, typed: Option<&str>) -> CredentialOutcome {
        let (key, source) = match (&self.secret, typed) {
            (SecretEntry::Present(secret), _) => (secret.clone(), CredentialSource::SecretStore),
            (SecretEntry::Empty, _) => {
                debug!("secret store entry is empty");
                return CredentialOutcome::NotConfigured;
            }
            (SecretEntry::Absent, Some(typed)) => match ApiKey::new(typed) {
                Some(key) => (key, CredentialSource::Interactive),
                None => {
                    if session.is_configured() {
                        // The user emptied the field: withdraw the old key too.
                        info!("credential input cleared");
                        session.clear_client();
                    }
                    return CredentialOutcome::NotConfigured;
                }
            },
            (SecretEntry::Absent, None) => return CredentialOutcome::NotConfigured,
        };

        match self.factory.connect(&key) {
            Ok(handle) => {
                session.set_client(handle, source);
                info!(source = ?source, "client configured");
                CredentialOutcome::Configured { source }
            }
            Err(error) => {
                session.clear_client();
                warn!(source = ?source, error = %error, "client configuration failed");
                CredentialOutcome::Failed { error }
            }
        }
    }
}

impl std::fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager")
            .field("uses_secret_store", &self.uses_secret_store())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorContext;
    use crate::gemini::{ClientHandle, GenerateRequest, GenerateResponse, TextGenerator};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Echo(String);

    #[async_trait]
    impl TextGenerator for Echo {
        async fn generate(&self, _request: &GenerateRequest) -> crate::Result<GenerateResponse> {
            Ok(GenerateResponse {
                text: self.0.clone(),
                finish_reason: None,
                usage: None,
            })
        }
    }

    /// Accepts every non-empty key except "bad" and records what it saw.
    #[derive(Default)]
    struct RecordingFactory {
        seen: Mutex<Vec<String>>,
    }

    impl ClientFactory for RecordingFactory {
        fn connect(&self, key: &ApiKey) -> crate::Result<ClientHandle> {
            self.seen.lock().unwrap().push(key.expose().to_string());
            if key.expose().is_empty() || key.expose() == "bad" {
                return Err(Error::validation_with_context(
                    "rejected",
                    ErrorContext::new().with_field_path("api_key"),
                ));
            }
            Ok(Arc::new(Echo(key.expose().to_string())))
        }
    }

    fn manager(secret: Option<&str>) -> (CredentialManager, Arc<RecordingFactory>) {
        let factory = Arc::new(RecordingFactory::default());
        let secret = secret.map_or(SecretEntry::Absent, SecretEntry::from_value);
        let mgr = CredentialManager::new(factory.clone(), secret);
        (mgr, factory)
    }

    #[test]
    fn interactive_key_configures_session() {
        let (mgr, factory) = manager(None);
        let mut session = SessionState::new();

        let outcome = mgr.resolve(&mut session, Some("good"));
        assert!(matches!(
            outcome,
            CredentialOutcome::Configured {
                source: CredentialSource::Interactive
            }
        ));
        assert!(session.is_configured());
        assert_eq!(*factory.seen.lock().unwrap(), vec!["good".to_string()]);
    }

    #[test]
    fn failure_clears_previous_handle() {
        let (mgr, _) = manager(None);
        let mut session = SessionState::new();
        assert!(mgr.resolve(&mut session, Some("good")).is_configured());

        let outcome = mgr.resolve(&mut session, Some("bad"));
        assert!(matches!(outcome, CredentialOutcome::Failed { .. }));
        assert!(session.client().is_none());
    }

    #[test]
    fn missing_key_does_not_attempt_construction() {
        let (mgr, factory) = manager(None);
        let mut session = SessionState::new();

        assert!(matches!(
            mgr.resolve(&mut session, None),
            CredentialOutcome::NotConfigured
        ));
        assert!(matches!(
            mgr.resolve(&mut session, Some("")),
            CredentialOutcome::NotConfigured
        ));
        assert!(factory.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn whitespace_only_key_is_attempted_and_fails() {
        let (mgr, factory) = manager(None);
        let mut session = SessionState::new();

        let outcome = mgr.resolve(&mut session, Some("   "));
        assert!(matches!(outcome, CredentialOutcome::Failed { .. }));
        assert!(!session.is_configured());
        assert_eq!(factory.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn empty_secret_entry_blocks_typed_keys() {
        let (mgr, factory) = manager(Some(""));
        let mut session = SessionState::new();
        assert!(mgr.uses_secret_store());

        assert!(matches!(
            mgr.resolve(&mut session, Some("typed")),
            CredentialOutcome::NotConfigured
        ));
        assert!(!session.is_configured());
        assert!(factory.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn emptying_the_field_withdraws_the_key() {
        let (mgr, _) = manager(None);
        let mut session = SessionState::new();
        mgr.resolve(&mut session, Some("good"));

        mgr.resolve(&mut session, Some(""));
        assert!(!session.is_configured());
    }

    #[test]
    fn secret_store_wins_over_typed_value() {
        let (mgr, factory) = manager(Some("from-secrets"));
        let mut session = SessionState::new();
        assert!(mgr.uses_secret_store());

        let outcome = mgr.resolve(&mut session, Some("typed"));
        assert!(matches!(
            outcome,
            CredentialOutcome::Configured {
                source: CredentialSource::SecretStore
            }
        ));
        assert_eq!(*factory.seen.lock().unwrap(), vec!["from-secrets".to_string()]);
    }
}
