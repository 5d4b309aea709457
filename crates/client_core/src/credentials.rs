//! Bearer token lookup. Tokens are acquired and refreshed elsewhere; this
//! module only answers "what is the token right now".

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

/// Key the web front end stores its token under.
pub const DEFAULT_TOKEN_KEY: &str = "accessToken";

pub trait CredentialAccessor: Send + Sync {
    fn get_token(&self) -> Option<String>;
}

/// Always anonymous.
pub struct NoCredential;

impl CredentialAccessor for NoCredential {
    fn get_token(&self) -> Option<String> {
        None
    }
}

/// Reads the token from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialAccessor for EnvCredential {
    fn get_token(&self) -> Option<String> {
        std::env::var(&self.var).ok().filter(|token| !token.is_empty())
    }
}

/// Keyed token storage shared by everything that issues requests.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    tokens: Arc<RwLock<HashMap<String, String>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, token: impl Into<String>) {
        let mut guard = self
            .tokens
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.insert(key.into(), token.into());
    }

    pub fn clear(&self, key: &str) {
        let mut guard = self
            .tokens
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.remove(key);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let guard = self
            .tokens
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.get(key).filter(|token| !token.is_empty()).cloned()
    }

    /// Accessor bound to `key`; lookups happen per request so a refreshed
    /// token is picked up without rebuilding the gateway.
    pub fn accessor(&self, key: impl Into<String>) -> StoredCredential {
        StoredCredential {
            store: self.clone(),
            key: key.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredCredential {
    store: TokenStore,
    key: String,
}

impl CredentialAccessor for StoredCredential {
    fn get_token(&self) -> Option<String> {
        self.store.get(&self.key)
    }
}

#[cfg(test)]
#[path = "tests/credentials_tests.rs"]
mod tests;
