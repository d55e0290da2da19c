//! First protected page.

use leptos::prelude::*;

#[component]
pub fn FirstPage() -> impl IntoView {
    view! {
        <section class="content-page">
            <h1>"First"</h1>
            <p>"Only visible with a valid session."</p>
        </section>
    }
}
