//! Durable slot holding the raw bearer token.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session store mirrors its token into exactly one key of client-side
//! storage. Absence of the key means "no session". Browser builds use
//! `localStorage`; native builds and tests use an in-memory slot.
//!
//! TRADE-OFFS
//! ==========
//! Browser storage is best-effort: quota or privacy-mode failures are logged
//! and otherwise ignored, leaving the in-memory session authoritative for the
//! lifetime of the tab.

#[cfg(test)]
#[path = "token_storage_test.rs"]
mod token_storage_test;

use std::sync::{Arc, Mutex, PoisonError};

/// Storage key for the persisted bearer token.
pub const TOKEN_STORAGE_KEY: &str = "token";

/// One persisted key-value slot for the session token.
pub trait TokenStorage: std::fmt::Debug + Send + Sync {
    /// Read the persisted token, if any.
    fn load(&self) -> Option<String>;

    /// Persist `token`, replacing any previous value.
    fn store(&self, token: &str);

    /// Delete the persisted token. Removing an absent key is a no-op.
    fn remove(&self);
}

/// `window.localStorage` under [`TOKEN_STORAGE_KEY`].
///
/// Holds no handle so it stays `Send + Sync`; the storage object is looked up
/// on every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

impl TokenStorage for BrowserStorage {
    fn load(&self) -> Option<String> {
        #[cfg(feature = "csr")]
        {
            let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten())?;
            storage.get_item(TOKEN_STORAGE_KEY).ok().flatten()
        }
        #[cfg(not(feature = "csr"))]
        {
            None
        }
    }

    fn store(&self, token: &str) {
        #[cfg(feature = "csr")]
        {
            let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) else {
                log::warn!("localStorage unavailable; token kept in memory only");
                return;
            };
            check_write("persist", storage.set_item(TOKEN_STORAGE_KEY, token));
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = token;
        }
    }

    fn remove(&self) {
        #[cfg(feature = "csr")]
        {
            let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) else {
                log::warn!("localStorage unavailable; persisted token not removed");
                return;
            };
            check_write("remove", storage.remove_item(TOKEN_STORAGE_KEY));
        }
    }
}

/// Warn when a localStorage write fails; the slot and the in-memory token
/// disagree until the next successful write. Returns whether it succeeded.
#[cfg_attr(not(feature = "csr"), allow(dead_code))]
fn check_write<E: std::fmt::Debug>(action: &str, result: Result<(), E>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("failed to {action} token in localStorage: {e:?}");
            false
        }
    }
}

/// Process-local slot. Clones share the same underlying value, so a test can
/// keep a handle and observe what the session persisted.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    /// Slot pre-seeded with `token`, as if persisted by an earlier visit.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { slot: Arc::new(Mutex::new(Some(token.into()))) }
    }
}

impl TokenStorage for MemoryStorage {
    fn load(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn store(&self, token: &str) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
    }

    fn remove(&self) {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}

/// Storage backend for the current platform.
pub fn platform_storage() -> Arc<dyn TokenStorage> {
    #[cfg(feature = "csr")]
    {
        Arc::new(BrowserStorage)
    }
    #[cfg(not(feature = "csr"))]
    {
        Arc::new(MemoryStorage::default())
    }
}
