//! Durable persistence for the bearer credential and the cached identity.
//!
//! SYSTEM CONTEXT
//! ==============
//! The gateway writes here after every credential change and the request
//! authenticator reads from here when the in-memory session has no token
//! yet. Browser builds back onto `localStorage`; native hosts use a JSON
//! file; server-side rendering has no durable store at all.
//!
//! TRADE-OFFS
//! ==========
//! Persistence is best-effort. Missing stores behave as silent no-ops and
//! write failures are logged and dropped, so callers never carry
//! environment-detection or storage-error handling of their own.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::SessionConfig;
use crate::error::StorageError;
use crate::net::types::Identity;

// =============================================================================
// BACKENDS
// =============================================================================

/// Minimal string key/value store.
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns [`StorageError`] if the store rejected the write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns [`StorageError`] if the store rejected the removal.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// `false` for stores that forget everything (SSR placeholder).
    fn is_durable(&self) -> bool {
        true
    }
}

/// Placeholder for environments without a durable store.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoStorage;

impl StorageBackend for NoStorage {
    fn get_item(&self, _key: &str) -> Option<String> {
        None
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }
}

/// Process-local map; survives as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Browser `localStorage`.
#[cfg(feature = "hydrate")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(feature = "hydrate")]
impl LocalStorage {
    /// `None` when there is no window or storage is disabled.
    #[must_use]
    pub fn open() -> Option<Self> {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten())?;
        Some(Self { storage })
    }
}

#[cfg(feature = "hydrate")]
impl StorageBackend for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Write { key: key.to_owned(), reason: format!("{e:?}") })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.storage
            .remove_item(key)
            .map_err(|e| StorageError::Write { key: key.to_owned(), reason: format!("{e:?}") })
    }
}

/// JSON object on disk, one entry per key. Used by native hosts and the CLI.
#[cfg(feature = "native")]
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: std::path::PathBuf,
}

#[cfg(feature = "native")]
impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_all(&self) -> HashMap<String, String> {
        let Ok(raw) = std::fs::read_to_string(&self.path) else {
            return HashMap::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("ignoring unreadable state file {}: {e}", self.path.display());
            HashMap::new()
        })
    }

    fn write_all(&self, key: &str, items: &HashMap<String, String>) -> Result<(), StorageError> {
        let fail = |reason: String| StorageError::Write { key: key.to_owned(), reason };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| fail(e.to_string()))?;
        }
        let raw = serde_json::to_string_pretty(items).map_err(|e| fail(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| fail(e.to_string()))
    }
}

#[cfg(feature = "native")]
impl StorageBackend for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.read_all();
        items.insert(key.to_owned(), value.to_owned());
        self.write_all(key, &items)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.read_all();
        if items.remove(key).is_none() {
            return Ok(());
        }
        self.write_all(key, &items)
    }
}

/// Pick the durable store available in this environment.
///
/// Browser builds get `localStorage` when a window exists; everything else
/// gets [`NoStorage`]. Native hosts that want a file pass a [`FileStorage`]
/// explicitly.
#[must_use]
pub fn detect_backend() -> Rc<dyn StorageBackend> {
    #[cfg(feature = "hydrate")]
    {
        if let Some(storage) = LocalStorage::open() {
            return Rc::new(storage);
        }
    }
    Rc::new(NoStorage)
}

// =============================================================================
// TOKEN PERSISTENCE
// =============================================================================

/// Credential and identity-cache accessors over a [`StorageBackend`].
pub struct TokenPersistence {
    backend: Rc<dyn StorageBackend>,
    token_key: String,
    identity_key: String,
}

impl TokenPersistence {
    #[must_use]
    pub fn new(backend: Rc<dyn StorageBackend>, config: &SessionConfig) -> Self {
        Self { backend, token_key: config.token_key.clone(), identity_key: config.identity_key.clone() }
    }

    #[must_use]
    pub fn is_durable(&self) -> bool {
        self.backend.is_durable()
    }

    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.backend.get_item(&self.token_key).filter(|t| !t.is_empty())
    }

    pub fn set(&self, token: &str) {
        self.write(&self.token_key, token);
    }

    pub fn remove(&self) {
        self.erase(&self.token_key);
    }

    /// The last identity written by a successful fetch, if it still parses.
    #[must_use]
    pub fn cached_identity(&self) -> Option<Identity> {
        let raw = self.backend.get_item(&self.identity_key)?;
        match serde_json::from_str(&raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                log::warn!("discarding unparseable cached identity: {e}");
                None
            }
        }
    }

    pub fn set_cached_identity(&self, identity: &Identity) {
        match serde_json::to_string(identity) {
            Ok(raw) => self.write(&self.identity_key, &raw),
            Err(e) => log::warn!("identity cache encode failed: {e}"),
        }
    }

    pub fn remove_cached_identity(&self) {
        self.erase(&self.identity_key);
    }

    /// Remove the credential and the cached identity together.
    pub fn clear(&self) {
        self.remove();
        self.remove_cached_identity();
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.backend.set_item(key, value) {
            log::warn!("{e}");
        }
    }

    fn erase(&self, key: &str) {
        if let Err(e) = self.backend.remove_item(key) {
            log::warn!("{e}");
        }
    }
}
