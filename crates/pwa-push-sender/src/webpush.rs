//! Web Push notification sending
//!
//! Implements RFC 8030 (HTTP Push), RFC 8188 (Encrypted Content-Encoding),
//! RFC 8291 (Message Encryption for Web Push), and RFC 8292 (VAPID).

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use http_body_util::Full;
use hyper::body::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::http::{self, HttpClient, LazyClient};
use crate::message::strip_tags;
use crate::notifier::SendReport;
use crate::prelude::*;
use crate::settings::{PUSH_TTL, VAPID_PRIVATE, VAPID_PUBLIC};
use pwa_push_core::settings::SettingValue;
use pwa_push_types::message::{MessageBuilder, NotificationBlueprint};
use pwa_push_types::store_adapter::{PushSubscriptionData, PushSubscriptionKeys, SubscriptionKind};

/// VAPID JWT lifetime (seconds), RFC 8292 allows at most 24 hours
const VAPID_JWT_LIFETIME: i64 = 12 * 3600;

/// Notification payload read by the service worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
	pub title: String,
	/// Plain text body
	pub body: String,
	/// URL to open when clicked
	#[serde(skip_serializing_if = "Option::is_none")]
	pub link: Option<String>,
}

/// Result of sending a push notification
#[derive(Debug)]
pub enum PushResult {
	/// Successfully sent
	Success,
	/// Subscription is no longer valid (should be deleted)
	SubscriptionGone,
	/// Temporary error (can retry)
	TemporaryError(String),
	/// Permanent error (don't retry)
	PermanentError(String),
}

/// VAPID key pair, base64url encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VapidKeys {
	/// Uncompressed P-256 point (65 bytes)
	pub public_key: String,
	/// Raw P-256 scalar (32 bytes)
	pub private_key: String,
}

/// Generate a new VAPID key pair
pub fn generate_vapid_keys() -> ClResult<VapidKeys> {
	use p256::elliptic_curve::sec1::ToEncodedPoint;
	use rand::RngExt;

	let mut rng = rand::rng();
	// A random 32 byte string is a valid scalar with overwhelming probability
	for _ in 0..4 {
		let bytes: [u8; 32] = rng.random();
		if let Ok(secret) = p256::SecretKey::from_slice(&bytes) {
			let public = secret.public_key().to_encoded_point(false);
			return Ok(VapidKeys {
				public_key: URL_SAFE_NO_PAD.encode(public.as_bytes()),
				private_key: URL_SAFE_NO_PAD.encode(secret.to_bytes()),
			});
		}
	}
	Err(Error::Internal("Failed to generate VAPID key".into()))
}

/// Read the stored VAPID keys
pub async fn read_vapid_keys(app: &App) -> ClResult<Option<VapidKeys>> {
	let public_key = app.settings.get_string(VAPID_PUBLIC).await?;
	let private_key = app.settings.get_string(VAPID_PRIVATE).await?;

	match (public_key, private_key) {
		(Some(public_key), Some(private_key)) => Ok(Some(VapidKeys { public_key, private_key })),
		_ => Ok(None),
	}
}

/// Decode a base64url value, tolerating padding
fn decode_b64(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
	URL_SAFE_NO_PAD.decode(value.trim_end_matches('='))
}

/// Encrypt payload using ECE (RFC 8188, 8291), aes128gcm scheme
///
/// The result carries salt, record size and our ephemeral public key in its header.
fn encrypt_payload(payload: &str, keys: &PushSubscriptionKeys) -> Result<Vec<u8>, String> {
	let p256dh = decode_b64(&keys.p256dh).map_err(|e| format!("Invalid p256dh: {}", e))?;
	let auth = decode_b64(&keys.auth).map_err(|e| format!("Invalid auth: {}", e))?;

	ece::encrypt(&p256dh, &auth, payload.as_bytes())
		.map_err(|e| format!("ECE encryption failed: {:?}", e))
}

#[derive(Serialize)]
struct VapidClaims<'a> {
	aud: String,
	exp: i64,
	sub: &'a str,
}

/// Create VAPID JWT (RFC 8292)
///
/// `private_key_raw` is the raw 32-byte P-256 scalar, base64url encoded
fn create_vapid_jwt(endpoint: &str, subject: &str, private_key_raw: &str) -> Result<String, String> {
	use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
	use p256::pkcs8::{EncodePrivateKey, LineEnding};

	let private_key_bytes =
		decode_b64(private_key_raw).map_err(|e| format!("Invalid base64url private key: {}", e))?;
	let secret_key = p256::SecretKey::from_slice(&private_key_bytes)
		.map_err(|e| format!("Invalid P-256 private key: {:?}", e))?;

	// jsonwebtoken wants PKCS#8 PEM
	let pem = secret_key
		.to_pkcs8_pem(LineEnding::LF)
		.map_err(|e| format!("Failed to encode private key: {:?}", e))?;

	// The audience is the origin of the push service
	let url = url::Url::parse(endpoint).map_err(|e| format!("Invalid endpoint URL: {}", e))?;
	let origin = url.origin();
	if !origin.is_tuple() {
		return Err(format!("Endpoint has no origin: {}", endpoint));
	}

	let claims = VapidClaims {
		aud: origin.ascii_serialization(),
		exp: Timestamp::now().0 + VAPID_JWT_LIFETIME,
		sub: subject,
	};

	let encoding_key = EncodingKey::from_ec_pem(pem.as_bytes())
		.map_err(|e| format!("Invalid VAPID private key: {}", e))?;
	encode(&Header::new(Algorithm::ES256), &claims, &encoding_key)
		.map_err(|e| format!("JWT encoding failed: {}", e))
}

/// Everything needed to deliver to one endpoint
struct Delivery<'a> {
	client: &'a HttpClient,
	keys: &'a VapidKeys,
	subject: &'a str,
	ttl: i64,
}

/// Send a push notification to a subscription
async fn send_notification(
	delivery: &Delivery<'_>,
	endpoint: &str,
	keys: &PushSubscriptionKeys,
	payload_json: &str,
) -> PushResult {
	let body = match encrypt_payload(payload_json, keys) {
		Ok(body) => body,
		Err(e) => return PushResult::PermanentError(format!("Encryption error: {}", e)),
	};

	let vapid_jwt = match create_vapid_jwt(endpoint, delivery.subject, &delivery.keys.private_key) {
		Ok(jwt) => jwt,
		Err(e) => return PushResult::PermanentError(format!("VAPID JWT error: {}", e)),
	};

	let request = match hyper::Request::builder()
		.method(hyper::Method::POST)
		.uri(endpoint)
		.header(hyper::header::CONTENT_TYPE, "application/octet-stream")
		.header(hyper::header::CONTENT_ENCODING, "aes128gcm")
		.header("TTL", delivery.ttl.to_string())
		.header(
			hyper::header::AUTHORIZATION,
			format!("vapid t={},k={}", vapid_jwt, delivery.keys.public_key),
		)
		.body(Full::new(Bytes::from(body)))
	{
		Ok(req) => req,
		Err(e) => return PushResult::PermanentError(format!("Request build error: {}", e)),
	};

	match delivery.client.request(request).await {
		Ok(response) => {
			let status = response.status();
			if status.is_success() {
				PushResult::Success
			} else if status == hyper::StatusCode::GONE || status == hyper::StatusCode::NOT_FOUND {
				// 404/410 = subscription no longer valid
				PushResult::SubscriptionGone
			} else if status.is_client_error() {
				let body = http::read_body(response.into_body()).await;
				PushResult::PermanentError(format!("HTTP {}: {}", status, body))
			} else {
				PushResult::TemporaryError(format!("HTTP {}", status))
			}
		}
		Err(e) => PushResult::TemporaryError(format!("Network error: {}", e)),
	}
}

pub struct WebPushSender {
	client: Arc<LazyClient>,
	builder: Arc<dyn MessageBuilder>,
	key_lock: tokio::sync::Mutex<()>,
}

impl WebPushSender {
	pub fn new(client: Arc<LazyClient>, builder: Arc<dyn MessageBuilder>) -> Self {
		Self { client, builder, key_lock: tokio::sync::Mutex::new(()) }
	}

	/// Return the VAPID public key, generating the key pair if there is none yet
	pub async fn vapid_public_key(&self, app: &App) -> ClResult<String> {
		let _guard = self.key_lock.lock().await;

		if let Some(keys) = read_vapid_keys(app).await? {
			return Ok(keys.public_key);
		}

		info!("Creating VAPID key on demand");
		let keys = generate_vapid_keys()?;
		app.settings.set_system(VAPID_PRIVATE, SettingValue::String(keys.private_key)).await?;
		app.settings.set_system(VAPID_PUBLIC, SettingValue::String(keys.public_key.clone())).await?;
		Ok(keys.public_key)
	}

	/// Send `blueprint` to the Web Push subscriptions of `user_ids`.
	///
	/// Gone endpoints (404/410) are deleted, other failures are logged.
	pub async fn notify(
		&self,
		app: &App,
		blueprint: &NotificationBlueprint,
		user_ids: &[UserId],
	) -> ClResult<SendReport> {
		let mut report = SendReport::default();

		// Without keys nobody can have subscribed
		let Some(vapid_keys) = read_vapid_keys(app).await? else {
			return Ok(report);
		};

		let subscriptions = app
			.store_adapter
			.list_push_subscriptions(user_ids, Some(SubscriptionKind::WebPush))
			.await?;
		if subscriptions.is_empty() {
			return Ok(report);
		}

		let rendered = self.builder.build(blueprint)?;
		let payload = NotificationPayload {
			title: rendered.title,
			body: strip_tags(&rendered.body)?,
			link: rendered.url,
		};
		let payload_json = serde_json::to_string(&payload)?;

		let client = self.client.get()?;
		let delivery = Delivery {
			client: &client,
			keys: &vapid_keys,
			subject: &app.opts.vapid_subject,
			ttl: app.settings.get_int(PUSH_TTL).await?,
		};

		for subscription in subscriptions {
			let PushSubscriptionData::WebPush { endpoint, keys, .. } = &subscription.data else {
				continue;
			};

			match send_notification(&delivery, endpoint, keys, &payload_json).await {
				PushResult::Success => {
					report.sent += 1;
					debug!(subs_id = %subscription.subs_id, "Push notification sent successfully");
				}
				PushResult::SubscriptionGone => {
					info!(
						subs_id = %subscription.subs_id,
						user_id = %subscription.user_id,
						"Deleting invalid push subscription"
					);
					match app.store_adapter.delete_push_subscription(None, subscription.subs_id).await
					{
						Ok(()) => report.removed += 1,
						Err(e) => {
							report.failed += 1;
							warn!(subs_id = %subscription.subs_id, error = %e, "Failed to delete subscription");
						}
					}
				}
				PushResult::TemporaryError(e) => {
					report.failed += 1;
					warn!(subs_id = %subscription.subs_id, error = %e, "Temporary push notification error");
				}
				PushResult::PermanentError(e) => {
					report.failed += 1;
					error!(subs_id = %subscription.subs_id, error = %e, "Permanent push notification error");
				}
			}
		}

		Ok(report)
	}
}


// vim: ts=4
