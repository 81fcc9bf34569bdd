//! The browser facing side: Push API, permission prompt and page environment

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::prelude::*;
use pwa_push_types::preferences::Preferences;

/// `Notification.permission`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
	/// Not decided yet
	Default,
	Granted,
	Denied,
}

/// Push permission state reported by the native (Apple webview) wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FirebasePushState {
	Authorized,
	Denied,
	NotDetermined,
	Provisional,
	Ephemeral,
}

/// `PushSubscription.toJSON()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscriptionJson {
	pub endpoint: String,
	/// Unix milliseconds (the server stores seconds)
	pub expiration_time: Option<i64>,
	pub keys: PushSubscriptionJsonKeys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscriptionJsonKeys {
	pub p256dh: String,
	pub auth: String,
}

/// `PushSubscriptionOptionsInit`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeOptions {
	pub user_visible_only: bool,
	/// VAPID public key, base64url
	pub application_server_key: String,
}

/// The service worker registration's `pushManager`
#[async_trait]
pub trait PushManager: Send + Sync {
	async fn subscribe(&self, options: &SubscribeOptions) -> ClResult<PushSubscriptionJson>;
	async fn get_subscription(&self) -> ClResult<Option<PushSubscriptionJson>>;
	/// Returns whether the subscription was removed
	async fn unsubscribe(&self, subscription: &PushSubscriptionJson) -> ClResult<bool>;
}

/// `Notification.requestPermission()`
#[async_trait]
pub trait PermissionPrompt: Send + Sync {
	async fn request_permission(&self) -> ClResult<Permission>;
}

/// What the page knows when the subscription manager runs
#[derive(Debug, Clone)]
pub struct ClientEnv {
	/// `None` when the browser has no Notification API
	pub permission: Option<Permission>,
	/// Preferences of the logged in user, `None` for guests
	pub preferences: Option<Preferences>,
	/// Forum attribute `vapidPublicKey`, set when push is configured
	pub vapid_public_key: Option<String>,
	/// Forum attribute `apiUrl`
	pub api_url: String,
	/// Running inside the native Apple wrapper (Firebase push instead of Web Push)
	pub apple_webview: bool,
	pub firebase_push_state: Option<FirebasePushState>,
}

impl ClientEnv {
	pub fn supports_notifications(&self) -> bool {
		self.permission.is_some()
	}

	pub fn push_configured(&self) -> bool {
		self.vapid_public_key.as_deref().is_some_and(|key| !key.is_empty())
	}

	/// Whether the logged in user enabled push for at least one notification type
	pub fn push_enabled(&self) -> bool {
		self.preferences.as_ref().is_some_and(Preferences::push_enabled)
	}

	pub fn vapid_key(&self) -> ClResult<&str> {
		self.vapid_public_key
			.as_deref()
			.filter(|key| !key.is_empty())
			.ok_or_else(|| Error::ConfigError("Push is not configured".into()))
	}
}

// vim: ts=4
