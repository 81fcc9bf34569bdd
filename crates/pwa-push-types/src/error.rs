//! Error type shared by all pwa-push crates

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	PermissionDenied,
	Unauthorized,
	DbError,
	Parse,
	ValidationError(String),
	ConfigError(String),
	NetworkError(String),
	ServiceUnavailable(String),
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl Error {
	/// Stable error code sent to API clients
	pub fn code(&self) -> &'static str {
		match self {
			Error::NotFound => "E-CORE-NOTFOUND",
			Error::PermissionDenied => "E-AUTH-NOPERM",
			Error::Unauthorized => "E-AUTH-UNAUTH",
			Error::Parse | Error::ValidationError(_) => "E-VAL-INVALID",
			Error::ServiceUnavailable(_) => "E-SYS-UNAVAIL",
			Error::NetworkError(_) => "E-NET-ERROR",
			Error::DbError
			| Error::ConfigError(_)
			| Error::Internal(_)
			| Error::Io(_) => "E-INTERNAL",
		}
	}

	fn status(&self) -> StatusCode {
		match self {
			Error::NotFound => StatusCode::NOT_FOUND,
			Error::PermissionDenied => StatusCode::FORBIDDEN,
			Error::Unauthorized => StatusCode::UNAUTHORIZED,
			Error::Parse | Error::ValidationError(_) => StatusCode::BAD_REQUEST,
			Error::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
			Error::NetworkError(_) => StatusCode::BAD_GATEWAY,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::Unauthorized => write!(f, "unauthorized"),
			Error::DbError => write!(f, "database error"),
			Error::Parse => write!(f, "parse error"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::NetworkError(msg) => write!(f, "network error: {}", msg),
			Error::ServiceUnavailable(msg) => write!(f, "service unavailable: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "I/O error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		tracing::debug!("JSON error: {}", err);
		Self::Parse
	}
}

#[cfg(feature = "server")]
impl From<jsonwebtoken::errors::Error> for Error {
	fn from(err: jsonwebtoken::errors::Error) -> Self {
		tracing::debug!("JWT error: {}", err);
		Self::Unauthorized
	}
}

#[cfg(feature = "server")]
impl From<hyper::http::Error> for Error {
	fn from(err: hyper::http::Error) -> Self {
		Self::Internal(format!("HTTP request build error: {}", err))
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status();
		// Internal details stay in the log
		let message = if status.is_server_error() {
			tracing::error!(error = %self, "Request failed");
			"Internal server error".to_string()
		} else {
			self.to_string()
		};
		let body = serde_json::json!({
			"error": {
				"code": self.code(),
				"message": message,
			}
		});
		(status, Json(body)).into_response()
	}
}


// vim: ts=4
