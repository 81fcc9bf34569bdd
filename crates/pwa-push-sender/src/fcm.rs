//! Firebase Cloud Messaging HTTP v1 client
//!
//! Authenticates with a Google service account: a self-signed RS256 JWT is
//! exchanged for an OAuth2 access token at the account's token URI, and the
//! token is cached until shortly before it expires.

use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::http::{self, HttpClient, LazyClient};
use crate::messaging::{CloudMessage, Messaging, MessagingError, MessagingProvider};
use crate::prelude::*;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const FCM_SEND_URL: &str = "https://fcm.googleapis.com/v1/projects";
const ASSERTION_LIFETIME: i64 = 3600;
/// Refresh the access token this long before it expires
const TOKEN_EXPIRY_MARGIN: i64 = 60;

/// The fields of a Google service account key file we need
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
	pub project_id: String,
	pub client_email: String,
	pub private_key: String,
	#[serde(default)]
	pub token_uri: Option<String>,
}

impl std::fmt::Debug for ServiceAccountKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ServiceAccountKey")
			.field("project_id", &self.project_id)
			.field("client_email", &self.client_email)
			.finish_non_exhaustive()
	}
}

impl ServiceAccountKey {
	pub fn from_json(config: &str) -> ClResult<Self> {
		let key: ServiceAccountKey = serde_json::from_str(config)
			.map_err(|e| Error::ConfigError(format!("Invalid service account key: {}", e)))?;

		if key.project_id.is_empty() || key.client_email.is_empty() {
			return Err(Error::ConfigError(
				"Service account key lacks project_id or client_email".into(),
			));
		}
		Ok(key)
	}

	pub fn token_uri(&self) -> &str {
		self.token_uri.as_deref().filter(|uri| !uri.is_empty()).unwrap_or(DEFAULT_TOKEN_URI)
	}

	fn signing_key(&self) -> ClResult<EncodingKey> {
		EncodingKey::from_rsa_pem(self.private_key.as_bytes())
			.map_err(|e| Error::ConfigError(format!("Invalid service account private key: {}", e)))
	}
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
	iss: &'a str,
	scope: &'a str,
	aud: &'a str,
	iat: i64,
	exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
	access_token: String,
	#[serde(default)]
	expires_in: Option<i64>,
}

struct CachedToken {
	value: String,
	expires_at: Timestamp,
}

/// FCM client for one service account
pub struct FcmMessaging {
	key: ServiceAccountKey,
	signing_key: EncodingKey,
	client: HttpClient,
	token: tokio::sync::Mutex<Option<CachedToken>>,
}

impl FcmMessaging {
	pub fn new(key: ServiceAccountKey, client: HttpClient) -> ClResult<Self> {
		let signing_key = key.signing_key()?;
		Ok(Self { key, signing_key, client, token: tokio::sync::Mutex::new(None) })
	}

	pub fn project_id(&self) -> &str {
		&self.key.project_id
	}

	fn create_assertion(&self) -> Result<String, MessagingError> {
		let iat = Timestamp::now().0;
		let claims = AssertionClaims {
			iss: &self.key.client_email,
			scope: FCM_SCOPE,
			aud: self.key.token_uri(),
			iat,
			exp: iat + ASSERTION_LIFETIME,
		};

		encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
			.map_err(|e| MessagingError::Authentication(format!("Failed to sign assertion: {}", e)))
	}

	async fn access_token(&self) -> Result<String, MessagingError> {
		let mut cached = self.token.lock().await;
		let now = Timestamp::now();

		if let Some(token) = cached.as_ref() {
			if token.expires_at > now.add_seconds(TOKEN_EXPIRY_MARGIN) {
				return Ok(token.value.clone());
			}
		}

		let assertion = self.create_assertion()?;
		let form = url::form_urlencoded::Serializer::new(String::new())
			.append_pair("grant_type", GRANT_TYPE)
			.append_pair("assertion", &assertion)
			.finish();

		let request = hyper::Request::builder()
			.method(hyper::Method::POST)
			.uri(self.key.token_uri())
			.header(hyper::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
			.body(Full::new(Bytes::from(form)))
			.map_err(|e| MessagingError::Authentication(format!("Invalid token URI: {}", e)))?;

		let response = self
			.client
			.request(request)
			.await
			.map_err(|e| MessagingError::Network(format!("Token request failed: {}", e)))?;
		let status = response.status();
		let body = http::read_body(response.into_body()).await;

		if status.is_client_error() {
			return Err(MessagingError::Authentication(format!("HTTP {}: {}", status, body)));
		}
		if !status.is_success() {
			return Err(MessagingError::Server(format!("Token endpoint HTTP {}", status)));
		}

		let token: TokenResponse = serde_json::from_str(&body)
			.map_err(|e| MessagingError::Authentication(format!("Invalid token response: {}", e)))?;
		debug!(client_email = %self.key.client_email, "Obtained FCM access token");

		let value = token.access_token;
		*cached = Some(CachedToken {
			value: value.clone(),
			expires_at: now.add_seconds(token.expires_in.unwrap_or(ASSERTION_LIFETIME)),
		});
		Ok(value)
	}
}

/// Build the FCM v1 `messages:send` request body
fn message_body(message: &CloudMessage) -> serde_json::Value {
	let mut msg = serde_json::json!({
		"token": message.token,
		"notification": {
			"title": message.title,
			"body": message.body,
		},
	});
	if let Some(link) = &message.link {
		msg["webpush"] = serde_json::json!({ "fcm_options": { "link": link } });
	}
	serde_json::json!({ "message": msg })
}

/// Map a failed `messages:send` response to a messaging error
fn classify_error(status: hyper::StatusCode, body: &str) -> MessagingError {
	let details: serde_json::Value = serde_json::from_str(body).unwrap_or_default();
	let error_status = details["error"]["status"].as_str().unwrap_or_default();
	let unregistered = details["error"]["details"]
		.as_array()
		.is_some_and(|d| d.iter().any(|item| item["errorCode"] == "UNREGISTERED"));
	let message = details["error"]["message"].as_str().map_or_else(|| body.to_string(), str::to_string);

	match status {
		hyper::StatusCode::UNAUTHORIZED | hyper::StatusCode::FORBIDDEN => {
			MessagingError::Authentication(message)
		}
		_ if unregistered || error_status == "NOT_FOUND" => MessagingError::NotFound(message),
		hyper::StatusCode::NOT_FOUND => MessagingError::NotFound(message),
		hyper::StatusCode::BAD_REQUEST => MessagingError::InvalidMessage(message),
		_ => MessagingError::Server(format!("HTTP {}: {}", status, message)),
	}
}

#[async_trait]
impl Messaging for FcmMessaging {
	async fn send(&self, message: &CloudMessage) -> Result<(), MessagingError> {
		let access_token = self.access_token().await?;
		let body = serde_json::to_vec(&message_body(message))
			.map_err(|e| MessagingError::InvalidMessage(e.to_string()))?;

		let request = hyper::Request::builder()
			.method(hyper::Method::POST)
			.uri(format!("{}/{}/messages:send", FCM_SEND_URL, self.key.project_id))
			.header(hyper::header::CONTENT_TYPE, "application/json")
			.header(hyper::header::AUTHORIZATION, format!("Bearer {}", access_token))
			.body(Full::new(Bytes::from(body)))
			.map_err(|e| MessagingError::InvalidMessage(format!("Request build error: {}", e)))?;

		let response = self
			.client
			.request(request)
			.await
			.map_err(|e| MessagingError::Network(e.to_string()))?;
		let status = response.status();
		if status.is_success() {
			return Ok(());
		}

		let body = http::read_body(response.into_body()).await;
		let err = classify_error(status, &body);
		if matches!(err, MessagingError::Authentication(_)) {
			// Token may have been revoked, fetch a new one next time
			*self.token.lock().await = None;
		}
		Err(err)
	}
}

/// Resolves `FcmMessaging` clients, reusing the one built for an unchanged config
pub struct FcmProvider {
	client: Arc<LazyClient>,
	current: parking_lot::Mutex<Option<(String, Arc<FcmMessaging>)>>,
}

impl FcmProvider {
	pub fn new(client: Arc<LazyClient>) -> Self {
		Self { client, current: parking_lot::Mutex::new(None) }
	}
}

impl MessagingProvider for FcmProvider {
	fn resolve(&self, config: &str) -> ClResult<Arc<dyn Messaging>> {
		let mut current = self.current.lock();
		if let Some((cached_config, messaging)) = current.as_ref() {
			if cached_config == config {
				return Ok(messaging.clone());
			}
		}

		let key = ServiceAccountKey::from_json(config)?;
		let messaging = Arc::new(FcmMessaging::new(key, self.client.get()?)?);
		info!(project_id = %messaging.project_id(), "FCM client configured");
		*current = Some((config.to_string(), messaging.clone()));
		Ok(messaging)
	}
}


// vim: ts=4
