//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every route view is wrapped in [`Guarded`] so the navigation guard runs
//! once per navigation, before the destination renders.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::router::Destination;
use crate::router::guard::{self, LOGIN_DESTINATION, Navigation};
use crate::state::session::Session;

/// Guard redirects replace the denied entry so "back" does not loop.
pub fn redirect_options() -> NavigateOptions {
    NavigateOptions { replace: true, ..NavigateOptions::default() }
}

/// Render `children` only if the guard lets navigation to `to` proceed;
/// otherwise navigate to the redirect target.
#[component]
pub fn Guarded(to: Destination, children: Children) -> impl IntoView {
    let session = expect_context::<RwSignal<Session>>();
    let verdict = session
        .try_update(|s| guard::before_each(s, to))
        .unwrap_or(Navigation::Redirect(LOGIN_DESTINATION));

    match verdict {
        Navigation::Proceed => Some(children()),
        Navigation::Redirect(target) => {
            let navigate = use_navigate();
            Effect::new(move || navigate(target.path(), redirect_options()));
            None
        }
    }
}

/// Log out. Navigation to the login destination is left to the caller.
pub fn sign_out(session: RwSignal<Session>) {
    session.update(Session::clear_token);
}
