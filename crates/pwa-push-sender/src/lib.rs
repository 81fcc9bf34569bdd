//! Push notification delivery
//!
//! Fans a notification blueprint out to the stored subscriptions of a set of
//! users, over two providers:
//!
//! - Firebase Cloud Messaging for embedded/webview clients (`firebase`, `fcm`)
//! - Web Push with VAPID authentication and RFC 8291 encryption (`webpush`)
//!
//! # Settings
//!
//! - `pwa.firebase_config` - Firebase service account JSON, uploaded by an admin
//! - `pwa.vapid.public` / `pwa.vapid.private` - VAPID key pair, generated on demand
//! - `pwa.push_ttl` - Web Push message TTL in seconds

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod fcm;
pub mod firebase;
pub mod handler;
pub mod http;
pub mod message;
pub mod messaging;
pub mod notifier;
pub mod settings;
pub mod webpush;

mod prelude;

pub use firebase::FirebasePushSender;
pub use message::{strip_tags, DefaultMessageBuilder};
pub use messaging::{CloudMessage, Messaging, MessagingError, MessagingProvider};
pub use notifier::{PushNotifier, SendReport};
pub use webpush::WebPushSender;

use crate::prelude::*;

pub fn register_settings(
	registry: &mut pwa_push_core::settings::SettingsRegistry,
) -> ClResult<()> {
	settings::register_settings(registry)
}

// vim: ts=4
