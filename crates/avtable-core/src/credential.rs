//! API key accessors.
//!
//! The client asks its [`CredentialSource`] for a key once per call and never
//! caches the answer, so a key set or cleared between calls takes effect on
//! the next call.
//!
//! | Source | Backing |
//! |--------|---------|
//! | [`EnvCredentials`] | `AVTABLE_ALPHAVANTAGE_API_KEY`, then `ALPHAVANTAGE_API_KEY` |
//! | [`CredentialStore`] | In-memory value, settable at runtime |
//! | [`StaticCredentials`] | Fixed value chosen at construction |

use std::env;
use std::sync::{Arc, RwLock};

pub const API_KEY_ENV: &str = "AVTABLE_ALPHAVANTAGE_API_KEY";
pub const API_KEY_FALLBACK_ENV: &str = "ALPHAVANTAGE_API_KEY";

/// Accessor for the Alpha Vantage API key.
pub trait CredentialSource: Send + Sync {
    /// Returns the configured key, or `None` when no usable key is set.
    fn api_key(&self) -> Option<String>;
}

/// Reads the key from the environment on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn api_key(&self) -> Option<String> {
        env::var(API_KEY_ENV)
            .or_else(|_| env::var(API_KEY_FALLBACK_ENV))
            .ok()
            .and_then(non_blank)
    }
}

/// Fixed key, mostly useful for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct StaticCredentials(Option<String>);

impl StaticCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self(Some(api_key.into()))
    }

    pub const fn none() -> Self {
        Self(None)
    }
}

impl CredentialSource for StaticCredentials {
    fn api_key(&self) -> Option<String> {
        self.0.clone().and_then(non_blank)
    }
}

/// Process-wide settable key.
///
/// Readers take an immutable snapshot; concurrent writers resolve as last
/// writer wins.
#[derive(Debug, Default)]
pub struct CredentialStore {
    current: RwLock<Option<Arc<str>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(api_key: impl AsRef<str>) -> Self {
        let store = Self::new();
        store.set(api_key);
        store
    }

    pub fn set(&self, api_key: impl AsRef<str>) {
        let mut current = self
            .current
            .write()
            .expect("credential store lock is not poisoned");
        *current = Some(Arc::from(api_key.as_ref()));
    }

    pub fn clear(&self) {
        let mut current = self
            .current
            .write()
            .expect("credential store lock is not poisoned");
        *current = None;
    }

    pub fn snapshot(&self) -> Option<Arc<str>> {
        self.current
            .read()
            .expect("credential store lock is not poisoned")
            .clone()
    }
}

impl CredentialSource for CredentialStore {
    fn api_key(&self) -> Option<String> {
        self.snapshot()
            .map(|key| key.to_string())
            .and_then(non_blank)
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_owned())
    }
}
