//! Navigation guard run before every in-app route change.
//!
//! A protected destination proceeds only with a valid session; anything else
//! (absent, malformed, expired, or expiry-less token) clears the session and
//! redirects to login. Expiry is only noticed here, never on a timer.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use super::{Access, Destination};
use crate::state::claims::TokenStatus;
use crate::state::session::Session;
use crate::util::clock;

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(Destination),
}

/// Where unauthenticated visitors of protected destinations are sent.
pub const LOGIN_DESTINATION: Destination = Destination::Login;

/// Decide whether navigation to `to` may proceed, at the current time.
pub fn before_each(session: &mut Session, to: Destination) -> Navigation {
    before_each_at(session, to, clock::now_ms())
}

/// [`before_each`] evaluated at `now_ms`.
pub fn before_each_at(session: &mut Session, to: Destination, now_ms: i64) -> Navigation {
    let access = to.access();
    session.hydrate();

    if access == Access::Public {
        return Navigation::Proceed;
    }

    match session.status_at(now_ms) {
        TokenStatus::Valid => Navigation::Proceed,
        status => {
            log::info!("navigation to {} denied ({status:?}); redirecting to {}", to.name(), LOGIN_DESTINATION.name());
            session.clear_token();
            Navigation::Redirect(LOGIN_DESTINATION)
        }
    }
}
