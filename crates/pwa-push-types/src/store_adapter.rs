//! Adapter that stores push subscriptions and site settings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::prelude::*;

/// Keys of a browser (Web Push) subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscriptionKeys {
	/// P-256 public key (base64url encoded)
	pub p256dh: String,
	/// Auth secret (base64url encoded)
	pub auth: String,
}

/// Provider specific subscription data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PushSubscriptionData {
	/// Browser Push API subscription
	#[serde(rename_all = "camelCase")]
	WebPush {
		endpoint: String,
		/// Expiration time in Unix seconds.
		///
		/// Browsers report milliseconds, the API handler divides by 1000 before storing.
		expiration_time: Option<i64>,
		keys: PushSubscriptionKeys,
	},
	/// Firebase Cloud Messaging registration token
	Firebase { token: String },
}

impl PushSubscriptionData {
	pub fn kind(&self) -> SubscriptionKind {
		match self {
			PushSubscriptionData::WebPush { .. } => SubscriptionKind::WebPush,
			PushSubscriptionData::Firebase { .. } => SubscriptionKind::Firebase,
		}
	}

	/// The opaque address of the subscriber: endpoint URL or FCM token
	pub fn endpoint(&self) -> &str {
		match self {
			PushSubscriptionData::WebPush { endpoint, .. } => endpoint,
			PushSubscriptionData::Firebase { token } => token,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionKind {
	WebPush,
	Firebase,
}

impl SubscriptionKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			SubscriptionKind::WebPush => "W",
			SubscriptionKind::Firebase => "F",
		}
	}

	pub fn from_code(code: &str) -> ClResult<Self> {
		match code {
			"W" => Ok(SubscriptionKind::WebPush),
			"F" => Ok(SubscriptionKind::Firebase),
			_ => Err(Error::Internal(format!("Unknown subscription kind: {}", code))),
		}
	}
}

/// A stored push subscription. Always belongs to exactly one user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
	pub subs_id: SubsId,
	pub user_id: UserId,
	pub data: PushSubscriptionData,
	pub created_at: Timestamp,
}

#[async_trait]
pub trait StoreAdapter: Debug + Send + Sync {
	// Push subscriptions
	//********************

	/// List the subscriptions of the given users, optionally of one kind only
	async fn list_push_subscriptions(
		&self,
		user_ids: &[UserId],
		kind: Option<SubscriptionKind>,
	) -> ClResult<Vec<PushSubscription>>;

	/// Store a subscription for a user.
	///
	/// An already known endpoint/token replaces the old row, whichever user owned it.
	async fn create_push_subscription(
		&self,
		user_id: UserId,
		data: &PushSubscriptionData,
	) -> ClResult<SubsId>;

	/// Delete a subscription. Returns `Error::NotFound` if it does not exist
	/// (or does not belong to `user_id` when one is given).
	async fn delete_push_subscription(
		&self,
		user_id: Option<UserId>,
		subs_id: SubsId,
	) -> ClResult<()>;

	// Settings
	//**********
	async fn read_setting(&self, name: &str) -> ClResult<Option<serde_json::Value>>;
	async fn update_setting(&self, name: &str, value: Option<serde_json::Value>) -> ClResult<()>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_subscription_data_json() {
		let data: PushSubscriptionData = serde_json::from_value(serde_json::json!({
			"type": "webPush",
			"endpoint": "https://push.example.com/abc",
			"expirationTime": null,
			"keys": { "p256dh": "BPk", "auth": "c2VjcmV0" }
		}))
		.unwrap();
		assert_eq!(data.kind(), SubscriptionKind::WebPush);
		assert_eq!(data.endpoint(), "https://push.example.com/abc");

		let data: PushSubscriptionData =
			serde_json::from_value(serde_json::json!({ "type": "firebase", "token": "tok-1" }))
				.unwrap();
		assert_eq!(data.kind(), SubscriptionKind::Firebase);
		assert_eq!(data.endpoint(), "tok-1");
	}

	#[test]
	fn test_kind_codes() {
		for kind in [SubscriptionKind::WebPush, SubscriptionKind::Firebase] {
			assert_eq!(SubscriptionKind::from_code(kind.as_str()).unwrap(), kind);
		}
		assert!(SubscriptionKind::from_code("X").is_err());
	}
}

// vim: ts=4
