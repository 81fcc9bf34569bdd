//! Settings key-value store
//!
//! Values are stored as JSON text.

use sqlx::{Row, SqlitePool};

use crate::utils::map_err;
use pwa_push_types::prelude::*;

/// Read a single setting by name
pub(crate) async fn read(db: &SqlitePool, name: &str) -> ClResult<Option<serde_json::Value>> {
	let row = sqlx::query("SELECT value FROM settings WHERE name = ?")
		.bind(name)
		.fetch_optional(db)
		.await
		.map_err(map_err)?;

	let Some(row) = row else {
		return Ok(None);
	};
	let value: Option<String> = row.try_get("value").or(Err(Error::DbError))?;

	Ok(value.and_then(|v| {
		serde_json::from_str(&v)
			.inspect_err(|err| warn!("Ignoring malformed setting '{}': {}", name, err))
			.ok()
	}))
}

/// Update or create a setting, deleting it if `value` is None
pub(crate) async fn update(
	db: &SqlitePool,
	name: &str,
	value: Option<serde_json::Value>,
) -> ClResult<()> {
	if let Some(val) = value {
		sqlx::query(
			"INSERT INTO settings (name, value) VALUES (?, ?)
			 ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = unixepoch()",
		)
		.bind(name)
		.bind(val.to_string())
		.execute(db)
		.await
		.map_err(map_err)?;
	} else {
		sqlx::query("DELETE FROM settings WHERE name = ?")
			.bind(name)
			.execute(db)
			.await
			.map_err(map_err)?;
	}

	Ok(())
}

// vim: ts=4
