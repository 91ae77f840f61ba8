//! Bearer token persistence.
//!
//! DESIGN
//! ======
//! At most one token exists per profile, stored under a single key. Writes are
//! synchronous and last-write-wins. Stores never fail toward the caller: any
//! storage problem is logged and reads as "not authenticated".

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

/// Storage key for the bearer token (also the routing-gate cookie name).
pub const TOKEN_KEY: &str = "auth_token";

pub trait TokenStore: Send + Sync {
    /// Current token, if a non-blank one is stored.
    fn token(&self) -> Option<String>;

    fn set_token(&self, token: &str);

    fn remove_token(&self);

    fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

/// Blank tokens count as absent.
pub(crate) fn normalize_token(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

// =============================================================================
// MEMORY STORE
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self { slot: Mutex::new(normalize_token(token)) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set_token(&self, token: &str) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = normalize_token(token);
    }

    fn remove_token(&self) {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct TokenDocument {
    #[serde(rename = "auth_token", default, skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
}

/// Token persisted as a small JSON document on disk.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    io: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), io: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Option<TokenDocument> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "token storage unreadable");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "token storage corrupt; ignoring");
                None
            }
        }
    }

    fn write_document(&self, doc: &TokenDocument) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_vec_pretty(doc).map_err(std::io::Error::other)?;
        std::fs::write(&self.path, body)
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        let _io = self.io.lock().unwrap_or_else(PoisonError::into_inner);
        self.read_document()?.auth_token.as_deref().and_then(normalize_token)
    }

    fn set_token(&self, token: &str) {
        let _io = self.io.lock().unwrap_or_else(PoisonError::into_inner);
        let doc = TokenDocument { auth_token: normalize_token(token) };
        if let Err(e) = self.write_document(&doc) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to persist token");
        }
    }

    fn remove_token(&self) {
        let _io = self.io.lock().unwrap_or_else(PoisonError::into_inner);
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %self.path.display(), error = %e, "failed to remove token"),
        }
    }
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
