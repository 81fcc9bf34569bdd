//! Client side push subscription manager.
//!
//! Decides when the forum page subscribes to Web Push, saves subscriptions
//! through the forum API, refreshes them once per session and picks the
//! push related alerts of the UI. The browser APIs are reached through the
//! [`PushManager`], [`PermissionPrompt`] and [`LocalStore`] traits so the
//! logic runs (and is tested) outside a browser.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod alerts;
pub mod api;
pub mod browser;
pub mod session;
pub mod store;

mod prelude;

#[cfg(test)]
mod testing;

pub use alerts::{
	dismiss_optin_alert, notification_methods, optin_alert, settings_alerts, Alert, AlertAction,
};
pub use api::{ForumApi, HttpForumApi};
pub use browser::{ClientEnv, FirebasePushState, Permission, PermissionPrompt, PushManager};
pub use session::{refresh_subscription, request_permission, subscribe_user, ClientSession, RefreshOutcome};
pub use store::{LocalStore, MemoryStore};

// vim: ts=4
