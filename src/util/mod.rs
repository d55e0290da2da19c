//! Utility helpers shared across client UI modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns (storage, clock,
//! navigation glue) from page and state logic to improve testability.

pub mod auth;
pub mod clock;
pub mod token_storage;
