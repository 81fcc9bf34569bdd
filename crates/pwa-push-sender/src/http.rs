//! HTTP client shared by the push providers

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::prelude::*;

pub type HttpClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Create a client speaking HTTP/1.1 and HTTP/2 (negotiated by ALPN).
///
/// Plain `http://` URIs are refused unless `allow_http` is set.
pub fn new_client(allow_http: bool) -> ClResult<HttpClient> {
	let builder = HttpsConnectorBuilder::new()
		.with_native_roots()
		.map_err(|e| Error::ConfigError(format!("TLS error: {}", e)))?;
	let builder = if allow_http { builder.https_or_http() } else { builder.https_only() };
	let connector = builder.enable_all_versions().build();

	Ok(Client::builder(TokioExecutor::new()).build(connector))
}

/// Client built on first use
#[derive(Default)]
pub struct LazyClient {
	client: parking_lot::Mutex<Option<HttpClient>>,
	allow_http: bool,
}

impl LazyClient {
	/// HTTPS only
	pub fn new() -> Self {
		Self::default()
	}

	/// Also accepts plain HTTP endpoints, e.g. a push service on a private network
	pub fn allow_http() -> Self {
		Self { allow_http: true, ..Self::default() }
	}

	pub fn get(&self) -> ClResult<HttpClient> {
		let mut client = self.client.lock();
		if let Some(client) = client.as_ref() {
			return Ok(client.clone());
		}

		let new_client = new_client(self.allow_http)?;
		*client = Some(new_client.clone());
		Ok(new_client)
	}
}

/// Collect a response body as a (lossy) UTF-8 string
pub async fn read_body(body: Incoming) -> String {
	match body.collect().await {
		Ok(collected) => String::from_utf8_lossy(&collected.to_bytes()).into_owned(),
		Err(e) => {
			debug!("Failed to read response body: {}", e);
			String::new()
		}
	}
}

// vim: ts=4
