//! Root application component with routing and context providers.

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::components::nav_bar::NavBar;
use crate::config::ApiConfig;
use crate::net::api::ApiClient;
use crate::net::transport::BrowserTransport;
use crate::pages::{
    first::FirstPage, login::LoginPage, profile::ProfilePage, register::RegisterPage, second::SecondPage,
};
use crate::router::Destination;
use crate::state::session::Session;
use crate::util::auth::Guarded;

/// API client bound to the browser transport and the shared session signal.
pub type AppClient = ApiClient<BrowserTransport, RwSignal<Session>>;

/// Context handle for [`AppClient`]; the client is not `Send`, so it lives in
/// local storage.
pub type ClientHandle = StoredValue<AppClient, LocalStorage>;

/// Root application component.
///
/// Owns the single session instance and the API client, and mounts one route
/// per [`Destination`], each behind the navigation guard.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let session = RwSignal::new(Session::default());
    let config = ApiConfig::from_build_env();
    log::info!("api base url: {}", config.base_url);
    let client: ClientHandle = StoredValue::new_local(ApiClient::new(config, BrowserTransport, session));

    provide_context(session);
    provide_context(client);

    view! {
        <Title text="Portal"/>

        <Router>
            <NavBar/>
            <main class="page">
                <Routes fallback=|| "Page not found.".into_view()>
                    <Route path=StaticSegment("") view=|| view! { <Guarded to=Destination::Home><LoginPage/></Guarded> }/>
                    <Route path=StaticSegment("login") view=|| view! { <Guarded to=Destination::Login><LoginPage/></Guarded> }/>
                    <Route path=StaticSegment("register") view=|| view! { <Guarded to=Destination::Register><RegisterPage/></Guarded> }/>
                    <Route path=StaticSegment("first") view=|| view! { <Guarded to=Destination::First><FirstPage/></Guarded> }/>
                    <Route path=StaticSegment("second") view=|| view! { <Guarded to=Destination::Second><SecondPage/></Guarded> }/>
                    <Route path=StaticSegment("profile") view=|| view! { <Guarded to=Destination::Profile><ProfilePage/></Guarded> }/>
                </Routes>
            </main>
        </Router>
    }
}
