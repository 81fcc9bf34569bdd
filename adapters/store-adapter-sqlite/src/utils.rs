//! Shared utilities for the SQLite adapter

use pwa_push_types::prelude::*;

/// Log database error for debugging
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Map an sqlx error, translating a missing row to `Error::NotFound`
pub(crate) fn map_err(err: sqlx::Error) -> Error {
	match err {
		sqlx::Error::RowNotFound => Error::NotFound,
		err => {
			inspect(&err);
			Error::DbError
		}
	}
}

// vim: ts=4
