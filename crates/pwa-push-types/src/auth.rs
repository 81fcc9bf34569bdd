//! Authentication context of a forum user

use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Role name granting access to site administration endpoints
pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCtx {
	pub user_id: UserId,
	pub roles: Box<[Box<str>]>,
}

impl AuthCtx {
	pub fn new(user_id: UserId, roles: &[&str]) -> Self {
		Self { user_id, roles: roles.iter().map(|r| Box::from(*r)).collect() }
	}

	pub fn has_role(&self, role: &str) -> bool {
		self.roles.iter().any(|r| r.as_ref() == role)
	}

	pub fn is_admin(&self) -> bool {
		self.has_role(ADMIN_ROLE)
	}
}

// vim: ts=4
