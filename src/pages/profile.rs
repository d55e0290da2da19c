//! Profile page: account details, password change, and logout.
//!
//! SYSTEM CONTEXT
//! ==============
//! Display fields come from the session profile set at login; the numeric id
//! and canonical username are fetched from `GET /profile` on mount.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::net::types::UserProfile;
use crate::router::Destination;
use crate::state::session::Session;
use crate::util::auth::sign_out;

/// Shortest password the backend accepts.
const MIN_PASSWORD_LEN: usize = 8;

#[component]
pub fn ProfilePage() -> impl IntoView {
    let session = expect_context::<RwSignal<Session>>();
    let remote = RwSignal::new(None::<UserProfile>);
    let load_error = RwSignal::new(None::<String>);
    let old_password = RwSignal::new(String::new());
    let new_password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);
    let signed_out = RwSignal::new(false);

    let navigate = use_navigate();
    Effect::new(move || {
        if signed_out.get() {
            navigate(Destination::Login.path(), NavigateOptions::default());
        }
    });

    #[cfg(feature = "csr")]
    let client = expect_context::<crate::app::ClientHandle>();

    #[cfg(feature = "csr")]
    {
        let client = client.get_value();
        leptos::task::spawn_local(async move {
            match client.fetch_profile().await {
                Ok(profile) => remote.set(Some(profile)),
                Err(e) => {
                    log::warn!("profile fetch failed: {e}");
                    load_error.set(Some(e.to_string()));
                }
            }
        });
    }

    let on_change_password = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let old_value = old_password.get();
        let new_value = new_password.get();
        if new_value.chars().count() < MIN_PASSWORD_LEN {
            info.set(format!("New password must be at least {MIN_PASSWORD_LEN} characters."));
            return;
        }
        busy.set(true);
        info.set("Updating password...".to_owned());

        #[cfg(feature = "csr")]
        {
            let client = client.get_value();
            leptos::task::spawn_local(async move {
                match client.change_password(&old_value, &new_value).await {
                    Ok(()) => {
                        old_password.set(String::new());
                        new_password.set(String::new());
                        info.set("Password updated.".to_owned());
                    }
                    Err(e) => info.set(format!("Password change failed: {e}")),
                }
                busy.set(false);
            });
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = old_value;
        }
    };

    let on_logout = move |_| {
        sign_out(session);
        signed_out.set(true);
    };

    let username = move || {
        remote
            .get()
            .map(|p| p.username)
            .or_else(|| session.with(|s| s.profile().and_then(|p| p.username.clone())))
            .unwrap_or_default()
    };
    let email = move || session.with(|s| s.profile().and_then(|p| p.email.clone())).unwrap_or_default();
    let user_id = move || remote.get().map(|p| p.id.to_string()).unwrap_or_else(|| "…".to_owned());

    view! {
        <section class="profile-page">
            <h1>"Profile"</h1>
            <dl class="profile-fields">
                <dt>"Id"</dt>
                <dd>{user_id}</dd>
                <dt>"Username"</dt>
                <dd>{username}</dd>
                <dt>"Email"</dt>
                <dd>{email}</dd>
            </dl>
            <Show when=move || load_error.get().is_some()>
                <p class="profile-error">{move || load_error.get().unwrap_or_default()}</p>
            </Show>

            <h2>"Change password"</h2>
            <form class="login-form" on:submit=on_change_password>
                <input
                    class="login-input"
                    type="password"
                    placeholder="Current password"
                    prop:value=move || old_password.get()
                    on:input=move |ev| old_password.set(event_target_value(&ev))
                />
                <input
                    class="login-input"
                    type="password"
                    placeholder="New password"
                    prop:value=move || new_password.get()
                    on:input=move |ev| new_password.set(event_target_value(&ev))
                />
                <button class="login-button" type="submit" disabled=move || busy.get()>
                    "Update password"
                </button>
            </form>
            <Show when=move || !info.get().is_empty()>
                <p class="login-message">{move || info.get()}</p>
            </Show>

            <button class="logout-button" on:click=on_logout>"Logout"</button>
        </section>
    }
}
