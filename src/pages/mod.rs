//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration; access control happens before
//! a page renders, in `util::auth::Guarded`.

pub mod first;
pub mod login;
pub mod profile;
pub mod register;
pub mod second;
