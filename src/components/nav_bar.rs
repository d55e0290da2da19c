//! Top navigation bar with route links and the logout action.

use leptos::prelude::*;
use leptos_router::components::A;

use crate::router::Destination;
use crate::state::session::Session;
use crate::util::auth::sign_out;

#[component]
pub fn NavBar() -> impl IntoView {
    let session = expect_context::<RwSignal<Session>>();

    let signed_in = move || session.with(|s| s.token().is_some());
    let user_label = move || session.with(user_label);

    view! {
        <nav class="nav-bar">
            <A href=Destination::First.path()>"First"</A>
            <A href=Destination::Second.path()>"Second"</A>
            <A href=Destination::Profile.path()>"Profile"</A>
            <Show
                when=signed_in
                fallback=|| view! {
                    <A href=Destination::Login.path()>"Login"</A>
                    <A href=Destination::Register.path()>"Register"</A>
                }
            >
                <span class="nav-bar__user">{user_label}</span>
                // The router intercepts the anchor; the handler only clears state.
                <a class="nav-bar__logout" href=Destination::Login.path() on:click=move |_| sign_out(session)>
                    "Logout"
                </a>
            </Show>
        </nav>
    }
}

/// Profile username, falling back to the token subject.
fn user_label(session: &Session) -> String {
    session
        .profile()
        .and_then(|p| p.username.clone())
        .or_else(|| session.subject())
        .unwrap_or_default()
}
