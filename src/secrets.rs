//! Deployment-managed secrets.
//!
//! The app looks for a single entry, [`API_KEY_NAME`]. It may come from the
//! process environment, a YAML secrets file or the OS keyring; the first store
//! that has a non-blank value wins. A missing entry is a normal state: the UI
//! then asks the user for a key instead. An entry that exists but is empty
//! still counts as present.

use crate::error::{Error, ErrorContext};
use crate::Result;
use keyring::Entry;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Name of the secret holding the Gemini API key.
pub const API_KEY_NAME: &str = "GEMINI_API_KEY";

/// Keyring service the key is stored under.
pub const KEYRING_SERVICE: &str = "daily-english";

/// An API key. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a raw value with surrounding whitespace removed. Returns `None`
    /// only for the empty string; a whitespace-only value becomes an empty key,
    /// which client construction rejects.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw.trim().to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// What the secret stores hold under [`API_KEY_NAME`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SecretEntry {
    /// No entry anywhere; the key is asked for interactively.
    #[default]
    Absent,
    /// The entry exists but is empty. Interactive input stays disabled.
    Empty,
    Present(ApiKey),
}

impl SecretEntry {
    pub fn from_value(value: impl Into<String>) -> Self {
        match ApiKey::new(value) {
            Some(key) => Self::Present(key),
            None => Self::Empty,
        }
    }

    /// Whether the secret store owns the credential.
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    pub fn key(&self) -> Option<&ApiKey> {
        match self {
            Self::Present(key) => Some(key),
            _ => None,
        }
    }
}

/// A read-only source of named secrets.
pub trait SecretStore: Send + Sync + fmt::Debug {
    /// Raw value for `name`, or `None` when the store has no such entry.
    fn get(&self, name: &str) -> Result<Option<String>>;

    /// Short label for logs.
    fn label(&self) -> &'static str;
}

/// Secrets from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecrets;

impl SecretStore for EnvSecrets {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(std::env::var(name).ok())
    }

    fn label(&self) -> &'static str {
        "env"
    }
}

/// Secrets from a flat YAML map (`GEMINI_API_KEY: "..."`).
#[derive(Debug, Default, Clone)]
pub struct FileSecrets {
    values: HashMap<String, String>,
}

impl FileSecrets {
    /// Loads `path`. A missing file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "secrets file not found");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let values = if text.trim().is_empty() {
            HashMap::new()
        } else {
            serde_yaml::from_str::<HashMap<String, String>>(&text).map_err(|e| {
                Error::configuration_with_context(
                    "secrets file must be a map of string keys to string values",
                    ErrorContext::new()
                        .with_field_path(path.display().to_string())
                        .with_details(e.to_string())
                        .with_source("file_secrets"),
                )
            })?
        };

        Ok(Self { values })
    }

    /// In-memory store, mostly for tests.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl SecretStore for FileSecrets {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.values.get(name).cloned())
    }

    fn label(&self) -> &'static str {
        "file"
    }
}

/// Secrets from the OS keyring.
#[derive(Debug, Clone)]
pub struct KeyringSecrets {
    service: String,
}

impl KeyringSecrets {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

impl Default for KeyringSecrets {
    fn default() -> Self {
        Self::new(KEYRING_SERVICE)
    }
}

impl SecretStore for KeyringSecrets {
    fn get(&self, name: &str) -> Result<Option<String>> {
        let entry = Entry::new(&self.service, name)?;
        match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn label(&self) -> &'static str {
        "keyring"
    }
}

/// Consults several stores in order.
///
/// A store that fails is logged and skipped: an unavailable keyring or a broken
/// secrets file must not keep the app from falling back to the interactive
/// field. A blank value defers to later stores but is returned when no store
/// has anything better, so the entry still counts as present.
#[derive(Debug, Default)]
pub struct LayeredSecrets {
    stores: Vec<Box<dyn SecretStore>>,
}

impl LayeredSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(mut self, store: impl SecretStore + 'static) -> Self {
        self.stores.push(Box::new(store));
        self
    }

    /// Environment, then the YAML file at `secrets_file`, then the keyring.
    pub fn standard(secrets_file: impl AsRef<Path>) -> Self {
        let path = secrets_file.as_ref();
        let file = FileSecrets::load(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "ignoring unreadable secrets file");
            FileSecrets::default()
        });
        Self::new()
            .with_store(EnvSecrets)
            .with_store(file)
            .with_store(KeyringSecrets::default())
    }

    pub fn api_key(&self) -> SecretEntry {
        resolve_api_key(self)
    }
}

impl SecretStore for LayeredSecrets {
    fn get(&self, name: &str) -> Result<Option<String>> {
        let mut blank = None;
        for store in &self.stores {
            match store.get(name) {
                Ok(Some(value)) if !value.trim().is_empty() => {
                    debug!(store = store.label(), secret = name, "secret found");
                    return Ok(Some(value));
                }
                Ok(Some(value)) => {
                    debug!(store = store.label(), secret = name, "secret is blank");
                    blank.get_or_insert(value);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(store = store.label(), secret = name, error = %e, "secret store unavailable");
                }
            }
        }
        Ok(blank)
    }

    fn label(&self) -> &'static str {
        "layered"
    }
}

/// Reads [`API_KEY_NAME`] from `store`. A store failure counts as absent.
pub fn resolve_api_key(store: &dyn SecretStore) -> SecretEntry {
    match store.get(API_KEY_NAME) {
        Ok(Some(value)) => SecretEntry::from_value(value),
        Ok(None) => SecretEntry::Absent,
        Err(e) => {
            warn!(store = store.label(), error = %e, "could not read API key from secret store");
            SecretEntry::Absent
        }
    }
}
