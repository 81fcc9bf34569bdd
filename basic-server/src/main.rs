use std::{env, path, sync::Arc};

use pwa_push::error::ClResult;
use pwa_push_store_adapter_sqlite::StoreAdapterSqlite;

pub struct Config {
	pub listen: String,
	pub db_dir: path::PathBuf,
	pub jwt_secret: String,
	pub api_url: Option<String>,
	pub vapid_subject: Option<String>,
}

impl Config {
	fn from_env() -> Self {
		Config {
			listen: env::var("LISTEN").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
			db_dir: path::PathBuf::from(env::var("DB_DIR").unwrap_or_else(|_| "./data".to_string())),
			jwt_secret: env::var("JWT_SECRET").unwrap_or_default(),
			api_url: env::var("API_URL").ok(),
			vapid_subject: env::var("VAPID_SUBJECT").ok(),
		}
	}
}

#[tokio::main]
async fn main() -> ClResult<()> {
	let config = Config::from_env();

	let mut builder = pwa_push::AppBuilder::new();
	let store_adapter = Arc::new(StoreAdapterSqlite::new(&config.db_dir).await?);

	builder.listen(config.listen).jwt_secret(config.jwt_secret).store_adapter(store_adapter);
	if let Some(api_url) = config.api_url {
		builder.api_url(api_url);
	}
	if let Some(vapid_subject) = config.vapid_subject {
		builder.vapid_subject(vapid_subject);
	}

	builder.run().await
}

// vim: ts=4
