//! Authentication and permission middlewares

use axum::{
	body::Body,
	extract::{Request, State},
	http::{header, response::Response},
	middleware::Next,
};

use crate::extract::Auth;
use crate::prelude::*;
use crate::token::validate_access_token;

fn bearer_token(req: &Request<Body>) -> Option<&str> {
	req.headers()
		.get(header::AUTHORIZATION)
		.and_then(|h| h.to_str().ok())
		.and_then(|h| h.strip_prefix("Bearer "))
		.map(str::trim)
}

/// Rejects requests without a valid access token
pub async fn require_auth(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> ClResult<Response<Body>> {
	let token = bearer_token(&req).ok_or(Error::Unauthorized)?;
	let auth = validate_access_token(&app.opts.jwt_secret, token)?;

	req.extensions_mut().insert(Auth(auth));

	Ok(next.run(req).await)
}

/// Middleware that checks if the current user has the admin role
///
/// Must be layered inside `require_auth`.
pub async fn require_admin(
	Auth(auth): Auth,
	req: Request<Body>,
	next: Next,
) -> ClResult<Response<Body>> {
	if !auth.is_admin() {
		warn!(
			user_id = %auth.user_id,
			roles = ?auth.roles,
			"Admin permission denied - admin role required"
		);
		return Err(Error::PermissionDenied);
	}

	Ok(next.run(req).await)
}

// vim: ts=4
