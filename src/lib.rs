//! # portal
//!
//! Leptos + WASM single-page client: a session store holding the decoded
//! bearer token, a navigation guard over a static route table, and a
//! token-bearing REST client.
//!
//! The session, guard and client logic are plain Rust and run natively under
//! `cargo test`; the `csr` feature adds the browser bindings (localStorage,
//! `fetch`, console logging) and mounts [`app::App`].

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod router;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_support;

/// Browser entry point: install logging and mount the app.
#[cfg(feature = "csr")]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::mount_to_body(app::App);
}
