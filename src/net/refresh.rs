//! Single-flight gate for token refreshes.
//!
//! Several requests can hit 401 while one refresh is already running; they
//! all await the same in-flight future instead of issuing their own call.

#[cfg(test)]
#[path = "refresh_test.rs"]
mod refresh_test;

use std::cell::RefCell;
use std::future::Future;

use futures::future::{FutureExt, LocalBoxFuture, Shared};

use super::error::ApiError;

type RefreshFuture = Shared<LocalBoxFuture<'static, Result<String, ApiError>>>;

#[derive(Default)]
pub struct RefreshGate {
    in_flight: RefCell<Option<RefreshFuture>>,
}

impl std::fmt::Debug for RefreshGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshGate").field("refreshing", &self.is_refreshing()).finish()
    }
}

impl RefreshGate {
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.borrow().is_some()
    }

    /// Await the in-flight refresh, or start one with `start` if none is
    /// running. The slot is released once the refresh settles.
    pub async fn run<F, Fut>(&self, start: F) -> Result<String, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, ApiError>> + 'static,
    {
        let shared = {
            let mut slot = self.in_flight.borrow_mut();
            if let Some(existing) = slot.as_ref() {
                log::debug!("joining in-flight token refresh");
                existing.clone()
            } else {
                let fut = start().boxed_local().shared();
                *slot = Some(fut.clone());
                fut
            }
        };

        let result = shared.clone().await;

        let mut slot = self.in_flight.borrow_mut();
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&shared)) {
            *slot = None;
        }
        result
    }
}
