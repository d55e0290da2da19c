//! Client-side session store: the current bearer token, its decoded claims,
//! and optional display profile.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `Session` is created empty by the app root and shared through context.
//! The navigation guard hydrates it from persisted storage on first need and
//! the API client reads its token before each request.
//!
//! INVARIANTS
//! ==========
//! - `claims` is `Some` iff `token` is `Some` and decodes.
//! - After `set_token`/`clear_token` return, persisted storage equals `token`.
//! - `profile` is only set by `set_profile` and is dropped by `clear_token`.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::claims::{self, Claims, TokenStatus};
use crate::util::clock;
use crate::util::token_storage::{TokenStorage, platform_storage};

/// Display fields supplied by application code after login.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Authentication state for the current tab.
#[derive(Clone, Debug)]
pub struct Session {
    token: Option<String>,
    claims: Option<Claims>,
    profile: Option<Profile>,
    storage: Arc<dyn TokenStorage>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(platform_storage())
    }
}

impl Session {
    /// Empty session mirroring its token into `storage`. Nothing is read from
    /// storage until [`Session::hydrate`].
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self { token: None, claims: None, profile: None, storage }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Subject identifier from the decoded claims.
    pub fn subject(&self) -> Option<String> {
        self.claims.as_ref().and_then(Claims::subject)
    }

    /// Store and persist `token`, then decode its claims.
    ///
    /// A token that fails to decode is still kept; only `claims` is cleared.
    pub fn set_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.storage.store(&token);
        self.claims = match claims::decode(&token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                log::debug!("session token did not decode: {e}");
                None
            }
        };
        self.token = Some(token);
    }

    /// Drop token, claims and profile, and remove the persisted copy.
    pub fn clear_token(&mut self) {
        if self.token.is_some() {
            log::info!("session cleared");
        }
        self.token = None;
        self.claims = None;
        self.profile = None;
        self.storage.remove();
    }

    /// Copy display fields into the session.
    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = Some(profile);
    }

    /// Load the persisted token when none is in memory.
    ///
    /// Returns whether a token is in memory afterwards.
    pub fn hydrate(&mut self) -> bool {
        if self.token.is_some() {
            return true;
        }
        match self.storage.load() {
            Some(token) => {
                log::debug!("session hydrated from storage");
                self.set_token(token);
                true
            }
            None => false,
        }
    }

    /// Token validity at `now_ms`, re-decoding the stored token.
    pub fn status_at(&self, now_ms: i64) -> TokenStatus {
        TokenStatus::evaluate(self.token.as_deref(), now_ms)
    }

    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        self.status_at(now_ms).is_valid()
    }

    /// Whether the token exists, decodes, and expires strictly in the future.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(clock::now_ms())
    }
}
