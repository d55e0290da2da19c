//! Networking modules for the backend REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` is the token-bearing client, `transport` the dispatch seam it sends
//! through, `refresh` the single-flight gate for token refreshes, and `types`
//! the request/response bodies.

pub mod api;
pub mod error;
pub mod refresh;
pub mod transport;
pub mod types;
