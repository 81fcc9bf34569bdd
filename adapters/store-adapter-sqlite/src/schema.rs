//! Database schema initialization
//!
//! Creates tables and indexes. Every statement is idempotent so the
//! initialization runs on each start.

use sqlx::SqlitePool;

/// Initialize the database schema with all required tables and indexes
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Site settings
	//***************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS settings (
		name text NOT NULL,
		value text,
		updated_at integer DEFAULT (unixepoch()),
		PRIMARY KEY(name)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Push subscriptions
	//********************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS subscriptions (
		subs_id integer NOT NULL,
		user_id integer NOT NULL,
		kind char(1) NOT NULL,
		endpoint text NOT NULL,
		data json NOT NULL,
		created_at integer DEFAULT (unixepoch()),
		PRIMARY KEY(subs_id)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE UNIQUE INDEX IF NOT EXISTS idx_subscriptions_endpoint ON subscriptions(kind, endpoint)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_subscriptions_user ON subscriptions(user_id)")
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;
	Ok(())
}

// vim: ts=4
