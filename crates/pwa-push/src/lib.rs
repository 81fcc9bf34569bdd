//! Push notifications for a web forum.
//!
//! # Features
//!
//! - Browser push subscriptions stored per user
//!     - Web Push (VAPID, aes128gcm payload encryption)
//!     - Firebase Cloud Messaging tokens of the native app wrapper
//! - Fan-out of one notification to every subscription of a set of users
//!     - subscriptions the provider no longer knows are removed
//! - Admin upload of the Firebase service account file
//!
//! The [`AppBuilder`] wires a store adapter into the HTTP API and runs it.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub use pwa_push_core::settings;
pub use pwa_push_sender as sender;
pub use pwa_push_types::{error, store_adapter, types};

pub mod app;
pub mod prelude;
pub mod routes;

pub use crate::app::{App, AppBuilder};

// vim: ts=4
