//! SQLite implementation of the pwa-push store adapter

#![forbid(unsafe_code)]

mod push;
mod schema;
mod setting;
mod utils;

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};

use pwa_push_types::{
	prelude::*,
	store_adapter::{PushSubscription, PushSubscriptionData, StoreAdapter, SubscriptionKind},
};

pub const DB_FILE_NAME: &str = "push.db";

#[derive(Debug)]
pub struct StoreAdapterSqlite {
	db: SqlitePool,
}

impl StoreAdapterSqlite {
	/// Open (or create) the database in the `dir` directory
	pub async fn new(dir: impl AsRef<Path>) -> ClResult<Self> {
		tokio::fs::create_dir_all(dir.as_ref()).await?;

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(dir.as_ref().join(DB_FILE_NAME))
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		schema::init_db(&db)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		info!("Store adapter opened: {}", dir.as_ref().join(DB_FILE_NAME).display());
		Ok(Self { db })
	}
}

#[async_trait]
impl StoreAdapter for StoreAdapterSqlite {
	// Push subscriptions
	//********************
	async fn list_push_subscriptions(
		&self,
		user_ids: &[UserId],
		kind: Option<SubscriptionKind>,
	) -> ClResult<Vec<PushSubscription>> {
		push::list(&self.db, user_ids, kind).await
	}

	async fn create_push_subscription(
		&self,
		user_id: UserId,
		data: &PushSubscriptionData,
	) -> ClResult<SubsId> {
		push::create(&self.db, user_id, data).await
	}

	async fn delete_push_subscription(
		&self,
		user_id: Option<UserId>,
		subs_id: SubsId,
	) -> ClResult<()> {
		push::delete(&self.db, user_id, subs_id).await
	}

	// Settings
	//**********
	async fn read_setting(&self, name: &str) -> ClResult<Option<serde_json::Value>> {
		setting::read(&self.db, name).await
	}

	async fn update_setting(&self, name: &str, value: Option<serde_json::Value>) -> ClResult<()> {
		setting::update(&self.db, name, value).await
	}
}

// vim: ts=4
