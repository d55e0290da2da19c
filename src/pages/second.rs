//! Second protected page.

use leptos::prelude::*;

use crate::state::session::Session;

#[component]
pub fn SecondPage() -> impl IntoView {
    let session = expect_context::<RwSignal<Session>>();
    let subject = move || session.with(Session::subject).unwrap_or_else(|| "unknown".to_owned());

    view! {
        <section class="content-page">
            <h1>"Second"</h1>
            <p>"Signed in as user " {subject}</p>
        </section>
    }
}
