//! Core infrastructure for pwa-push.
//!
//! Shared by the HTTP crate and the feature crates: application state,
//! authentication middleware, extractors and the settings subsystem.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod extensions;
pub mod extract;
pub mod middleware;
pub mod prelude;
pub mod settings;
pub mod token;

// Re-export commonly used types
pub use app::{App, AppBuilderOpts, AppState};
pub use extract::Auth;

// vim: ts=4
