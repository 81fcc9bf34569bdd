//! Forum REST API used by the subscription manager

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::browser::PushSubscriptionJson;
use crate::prelude::*;

#[async_trait]
pub trait ForumApi: Send + Sync {
	/// POST `{apiUrl}/pwa/push` with `{ subscription }`
	async fn save_subscription(&self, subscription: &PushSubscriptionJson) -> ClResult<()>;

	/// POST `{apiUrl}/pwa/firebase-push-subscriptions` with `{ token }`
	async fn save_firebase_token(&self, token: &str) -> ClResult<()>;
}

/// `ForumApi` over HTTP, authenticated with the user's access token
pub struct HttpForumApi {
	api_url: Box<str>,
	access_token: Option<Box<str>>,
	client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl HttpForumApi {
	pub fn new(api_url: impl Into<Box<str>>, access_token: Option<Box<str>>) -> ClResult<Self> {
		let connector = HttpsConnectorBuilder::new()
			.with_native_roots()
			.map_err(|e| Error::ConfigError(format!("TLS error: {}", e)))?
			.https_or_http()
			.enable_all_versions()
			.build();
		let client = Client::builder(TokioExecutor::new()).build(connector);

		let api_url: Box<str> = api_url.into();
		Ok(Self { api_url: api_url.trim_end_matches('/').into(), access_token, client })
	}

	async fn post_json(&self, path: &str, body: &serde_json::Value) -> ClResult<()> {
		let mut request = hyper::Request::builder()
			.method(hyper::Method::POST)
			.uri(format!("{}{}", self.api_url, path))
			.header(hyper::header::CONTENT_TYPE, "application/json");
		if let Some(token) = &self.access_token {
			request = request.header(hyper::header::AUTHORIZATION, format!("Bearer {}", token));
		}
		let request = request.body(Full::new(Bytes::from(serde_json::to_vec(body)?)))?;

		let response = self
			.client
			.request(request)
			.await
			.map_err(|e| Error::NetworkError(format!("POST {} failed: {}", path, e)))?;
		let status = response.status();
		if status.is_success() {
			return Ok(());
		}

		let body = response.into_body().collect().await.map(|b| b.to_bytes()).unwrap_or_default();
		let body = String::from_utf8_lossy(&body);
		debug!(path = %path, status = %status, body = %body, "Forum API request rejected");
		Err(match status {
			hyper::StatusCode::UNAUTHORIZED => Error::Unauthorized,
			hyper::StatusCode::FORBIDDEN => Error::PermissionDenied,
			hyper::StatusCode::NOT_FOUND => Error::NotFound,
			s if s.is_client_error() => Error::ValidationError(format!("HTTP {}", s)),
			s => Error::ServiceUnavailable(format!("HTTP {}", s)),
		})
	}
}

#[async_trait]
impl ForumApi for HttpForumApi {
	async fn save_subscription(&self, subscription: &PushSubscriptionJson) -> ClResult<()> {
		self.post_json("/pwa/push", &serde_json::json!({ "subscription": subscription })).await
	}

	async fn save_firebase_token(&self, token: &str) -> ClResult<()> {
		self.post_json("/pwa/firebase-push-subscriptions", &serde_json::json!({ "token": token }))
			.await
	}
}

// vim: ts=4
