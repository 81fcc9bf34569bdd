//! Push notification HTTP handlers

use axum::{
	extract::{Multipart, Path, State},
	http::StatusCode,
	Json,
};
use serde::{Deserialize, Serialize};

use crate::firebase::has_valid_firebase_settings;
use crate::notifier::{NotifyReport, PushNotifierExt};
use crate::prelude::*;
use crate::settings::FIREBASE_CONFIG;
use crate::webpush::read_vapid_keys;
use pwa_push_core::extract::Auth;
use pwa_push_core::settings::SettingValue;
use pwa_push_types::message::NotificationBlueprint;
use pwa_push_types::store_adapter::{PushSubscriptionData, PushSubscriptionKeys};

/// Request body for creating a push subscription
#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionRequest {
	/// The push subscription from the browser's Push API
	pub subscription: BrowserSubscription,
}

/// Browser's PushSubscription format
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserSubscription {
	pub endpoint: String,
	/// Expiration time in Unix milliseconds, as `PushSubscription.expirationTime` reports it
	pub expiration_time: Option<i64>,
	pub keys: BrowserSubscriptionKeys,
}

/// Browser subscription keys format
#[derive(Debug, Deserialize)]
pub struct BrowserSubscriptionKeys {
	/// P-256 public key (base64url encoded)
	pub p256dh: String,
	/// Auth secret (base64url encoded)
	pub auth: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateFirebaseSubscriptionRequest {
	pub token: String,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
	pub id: SubsId,
}

/// POST /api/pwa/push
///
/// Stores the browser push subscription of the authenticated user.
pub async fn post_subscription(
	State(app): State<App>,
	Auth(auth): Auth,
	Json(body): Json<CreateSubscriptionRequest>,
) -> ClResult<(StatusCode, Json<SubscriptionResponse>)> {
	let subscription = body.subscription;
	let endpoint = url::Url::parse(&subscription.endpoint)
		.map_err(|e| Error::ValidationError(format!("Invalid endpoint: {}", e)))?;
	if endpoint.scheme() != "https" {
		return Err(Error::ValidationError("Push endpoint must use https".into()));
	}
	if subscription.keys.p256dh.is_empty() || subscription.keys.auth.is_empty() {
		return Err(Error::ValidationError("Missing subscription keys".into()));
	}

	info!(user_id = %auth.user_id, endpoint = %subscription.endpoint, "Registering push subscription");

	let data = PushSubscriptionData::WebPush {
		endpoint: subscription.endpoint,
		// Milliseconds from the browser, seconds in the store
		expiration_time: subscription.expiration_time.map(|ms| ms / 1000),
		keys: PushSubscriptionKeys {
			p256dh: subscription.keys.p256dh,
			auth: subscription.keys.auth,
		},
	};
	let id = app.store_adapter.create_push_subscription(auth.user_id, &data).await?;
	debug!(user_id = %auth.user_id, subs_id = %id, "Push subscription stored");

	Ok((StatusCode::CREATED, Json(SubscriptionResponse { id })))
}

/// POST /api/pwa/firebase-push-subscriptions
pub async fn post_firebase_subscription(
	State(app): State<App>,
	Auth(auth): Auth,
	Json(body): Json<CreateFirebaseSubscriptionRequest>,
) -> ClResult<(StatusCode, Json<SubscriptionResponse>)> {
	let token = body.token.trim();
	if token.is_empty() {
		return Err(Error::ValidationError("Missing token".into()));
	}

	info!(user_id = %auth.user_id, "Registering Firebase push subscription");
	let data = PushSubscriptionData::Firebase { token: token.to_string() };
	let id = app.store_adapter.create_push_subscription(auth.user_id, &data).await?;

	Ok((StatusCode::CREATED, Json(SubscriptionResponse { id })))
}

/// DELETE /api/pwa/push/{id}
///
/// Removes one of the authenticated user's subscriptions.
pub async fn delete_subscription(
	State(app): State<App>,
	Auth(auth): Auth,
	Path(subs_id): Path<SubsId>,
) -> ClResult<StatusCode> {
	info!(user_id = %auth.user_id, subs_id = %subs_id, "Deleting push subscription");
	app.store_adapter.delete_push_subscription(Some(auth.user_id), subs_id).await?;
	Ok(StatusCode::NO_CONTENT)
}

/// GET /api/pwa/vapid-public-key
///
/// Clients need this to subscribe. Keys are generated on first request.
pub async fn get_vapid_public_key(State(app): State<App>) -> ClResult<Json<serde_json::Value>> {
	let notifier = app.ext::<PushNotifierExt>()?;
	let public_key = notifier.web_push.vapid_public_key(&app).await?;

	Ok(Json(serde_json::json!({ "vapidPublicKey": public_key })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumAttributes {
	pub vapid_public_key: Option<String>,
	pub api_url: String,
	pub push_configured: bool,
	pub firebase_configured: bool,
}

/// GET /api/pwa/forum-attributes
///
/// The values the client subscription manager reads from the forum payload.
pub async fn get_forum_attributes(State(app): State<App>) -> ClResult<Json<ForumAttributes>> {
	let vapid_public_key = read_vapid_keys(&app).await?.map(|keys| keys.public_key);

	Ok(Json(ForumAttributes {
		push_configured: vapid_public_key.is_some(),
		vapid_public_key,
		api_url: app.opts.api_url.to_string(),
		firebase_configured: has_valid_firebase_settings(&app).await?,
	}))
}

/// POST /api/pwa/firebase-config
///
/// Admin upload of the Firebase service account file (multipart field `file`).
/// The content is stored verbatim.
pub async fn post_firebase_config(
	State(app): State<App>,
	Auth(auth): Auth,
	mut multipart: Multipart,
) -> ClResult<StatusCode> {
	while let Some(field) = multipart
		.next_field()
		.await
		.map_err(|e| Error::ValidationError(format!("Invalid multipart body: {}", e)))?
	{
		if field.name() != Some("file") {
			continue;
		}

		let bytes = field
			.bytes()
			.await
			.map_err(|e| Error::ValidationError(format!("Failed to read upload: {}", e)))?;
		let config = String::from_utf8(bytes.to_vec())
			.map_err(|_| Error::ValidationError("Firebase config must be UTF-8 text".into()))?;

		app.settings.set(FIREBASE_CONFIG, SettingValue::String(config), &auth.roles[..]).await?;
		info!(user_id = %auth.user_id, "Firebase config updated");
		return Ok(StatusCode::NO_CONTENT);
	}

	Err(Error::ValidationError("Missing 'file' field".into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
	pub blueprint: NotificationBlueprint,
	pub user_ids: Vec<UserId>,
}

/// POST /api/pwa/notify
///
/// Entry point for the forum's notification pipeline: delivers one blueprint
/// to the push subscriptions of the given users.
pub async fn post_notify(
	State(app): State<App>,
	Json(body): Json<NotifyRequest>,
) -> ClResult<Json<NotifyReport>> {
	let notifier = app.ext::<PushNotifierExt>()?.clone();
	let report = notifier.notify(&app, &body.blueprint, &body.user_ids).await;
	Ok(Json(report))
}

// vim: ts=4
