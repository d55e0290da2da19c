//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! `session` owns the authentication record; `claims` is the pure decoding
//! and validity layer beneath it.

pub mod claims;
pub mod session;
