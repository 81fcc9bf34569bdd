//! Access tokens issued by the forum
//!
//! HS256 JWTs signed with the shared secret configured in
//! `AppBuilderOpts::jwt_secret`. Roles travel as a comma separated list.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::prelude::*;
use pwa_push_types::auth::AuthCtx;

pub const ACCESS_TOKEN_EXPIRY: i64 = 3600;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AccessToken<S> {
	pub sub: u64,
	pub exp: i64,
	pub r: Option<S>,
}

pub fn generate_access_token(secret: &str, auth: &AuthCtx, expires_in: i64) -> ClResult<Box<str>> {
	if secret.is_empty() {
		return Err(Error::ConfigError("JWT secret is not configured".into()));
	}
	let roles = auth.roles.join(",");
	let claims = AccessToken::<&str> {
		sub: auth.user_id.0,
		exp: Timestamp::now().add_seconds(expires_in).0,
		r: if roles.is_empty() { None } else { Some(roles.as_str()) },
	};

	let token = encode(
		&Header::new(Algorithm::HS256),
		&claims,
		&EncodingKey::from_secret(secret.as_bytes()),
	)?;

	Ok(token.into())
}

pub fn validate_access_token(secret: &str, token: &str) -> ClResult<AuthCtx> {
	if secret.is_empty() {
		warn!("Rejecting access token: JWT secret is not configured");
		return Err(Error::Unauthorized);
	}

	let token_data = decode::<AccessToken<Box<str>>>(
		token,
		&DecodingKey::from_secret(secret.as_bytes()),
		&Validation::new(Algorithm::HS256),
	)?;

	let roles = token_data
		.claims
		.r
		.as_deref()
		.unwrap_or("")
		.split(',')
		.map(str::trim)
		.filter(|r| !r.is_empty())
		.map(Box::from)
		.collect();

	Ok(AuthCtx { user_id: UserId(token_data.claims.sub), roles })
}


// vim: ts=4
