//! Process-wide credential cache, keyed by (host, port, user) — never
//! by the full resource path. Internally synchronized; shared via
//! `Arc` between all contents targeting the same process.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Cache key. The path is deliberately not part of the key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct CredentialKey {
    pub host: String,
    pub port: u16,
    pub username: String,
}

impl CredentialKey {
    pub fn new(host: impl Into<String>, port: u16, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
        }
    }
}

/// Cached secret material for one key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialEntry {
    pub password: String,
    pub account: Option<String>,
}

/// Thread-safe credential store. Explicitly constructed and passed in;
/// the core reads and updates entries but does not own their lifetime.
#[derive(Default)]
pub struct CredentialStore {
    entries: Mutex<HashMap<CredentialKey, CredentialEntry>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached entry for the key, if any.
    pub fn lookup(&self, key: &CredentialKey) -> Option<CredentialEntry> {
        self.entries
            .lock()
            .ok()
            .and_then(|map| map.get(key).cloned())
    }

    /// Insert or replace the entry for the key.
    pub fn store(&self, key: CredentialKey, entry: CredentialEntry) {
        debug!("credential store update for {}@{}:{}", key.username, key.host, key.port);
        if let Ok(mut map) = self.entries.lock() {
            map.insert(key, entry);
        }
    }

    pub fn remove(&self, key: &CredentialKey) -> Option<CredentialEntry> {
        self.entries.lock().ok().and_then(|mut map| map.remove(key))
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
