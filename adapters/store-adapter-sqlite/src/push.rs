//! Push subscription database operations

use pwa_push_types::{
	prelude::*,
	store_adapter::{PushSubscription, PushSubscriptionData, SubscriptionKind},
};
use sqlx::{Row, SqlitePool};

use crate::utils::map_err;

/// Bound variables per `IN (...)` query, well below SQLite's limit
const LIST_CHUNK_SIZE: usize = 1000;

/// List the push subscriptions of the given users
pub async fn list(
	db: &SqlitePool,
	user_ids: &[UserId],
	kind: Option<SubscriptionKind>,
) -> ClResult<Vec<PushSubscription>> {
	let mut subscriptions = Vec::new();
	for chunk in user_ids.chunks(LIST_CHUNK_SIZE) {
		subscriptions.extend(list_chunk(db, chunk, kind).await?);
	}
	subscriptions.sort_unstable_by_key(|s: &PushSubscription| s.subs_id.0);

	Ok(subscriptions)
}

async fn list_chunk(
	db: &SqlitePool,
	user_ids: &[UserId],
	kind: Option<SubscriptionKind>,
) -> ClResult<Vec<PushSubscription>> {
	let mut query = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
		"SELECT subs_id, user_id, kind, data, created_at FROM subscriptions WHERE user_id IN (",
	);
	let mut ids = query.separated(", ");
	for user_id in user_ids {
		ids.push_bind(user_id.0.cast_signed());
	}
	query.push(")");
	if let Some(kind) = kind {
		query.push(" AND kind = ").push_bind(kind.as_str());
	}

	let rows = query.build().fetch_all(db).await.map_err(map_err)?;

	let mut subscriptions = Vec::with_capacity(rows.len());
	for row in rows {
		let data_json: String = row.try_get("data").map_err(map_err)?;
		let data: PushSubscriptionData = serde_json::from_str(&data_json)
			.map_err(|e| Error::Internal(format!("Invalid subscription JSON: {}", e)))?;
		let kind: String = row.try_get("kind").map_err(map_err)?;
		if SubscriptionKind::from_code(&kind)? != data.kind() {
			return Err(Error::Internal(format!("Subscription kind mismatch: {}", kind)));
		}

		subscriptions.push(PushSubscription {
			subs_id: SubsId(row.try_get::<i64, _>("subs_id").map_err(map_err)?.cast_unsigned()),
			user_id: UserId(row.try_get::<i64, _>("user_id").map_err(map_err)?.cast_unsigned()),
			data,
			created_at: Timestamp(row.try_get::<i64, _>("created_at").map_err(map_err)?),
		});
	}

	Ok(subscriptions)
}

/// Store a push subscription.
///
/// Endpoints are unique per provider: a known endpoint is moved to `user_id`
/// and its data replaced instead of inserting a second row.
pub async fn create(
	db: &SqlitePool,
	user_id: UserId,
	data: &PushSubscriptionData,
) -> ClResult<SubsId> {
	let data_json = serde_json::to_string(data)
		.map_err(|e| Error::Internal(format!("Failed to serialize subscription: {}", e)))?;

	let row = sqlx::query(
		"INSERT INTO subscriptions (user_id, kind, endpoint, data)
		 VALUES (?, ?, ?, ?)
		 ON CONFLICT(kind, endpoint) DO UPDATE SET user_id = excluded.user_id, data = excluded.data
		 RETURNING subs_id",
	)
	.bind(user_id.0.cast_signed())
	.bind(data.kind().as_str())
	.bind(data.endpoint())
	.bind(&data_json)
	.fetch_one(db)
	.await
	.map_err(map_err)?;

	Ok(SubsId(row.try_get::<i64, _>("subs_id").map_err(map_err)?.cast_unsigned()))
}

/// Delete a push subscription by ID, optionally restricted to its owner
pub async fn delete(db: &SqlitePool, user_id: Option<UserId>, subs_id: SubsId) -> ClResult<()> {
	let subs_id = subs_id.0.cast_signed();
	let res = if let Some(user_id) = user_id {
		sqlx::query("DELETE FROM subscriptions WHERE subs_id = ? AND user_id = ?")
			.bind(subs_id)
			.bind(user_id.0.cast_signed())
			.execute(db)
			.await
	} else {
		sqlx::query("DELETE FROM subscriptions WHERE subs_id = ?").bind(subs_id).execute(db).await
	}
	.map_err(map_err)?;

	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}

// vim: ts=4
