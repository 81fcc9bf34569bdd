//! Push notification settings

use pwa_push_core::settings::{PermissionLevel, SettingDefinition, SettingValue, SettingsRegistry};

use crate::prelude::*;

pub const FIREBASE_CONFIG: &str = "pwa.firebase_config";
pub const VAPID_PUBLIC: &str = "pwa.vapid.public";
pub const VAPID_PRIVATE: &str = "pwa.vapid.private";
pub const PUSH_TTL: &str = "pwa.push_ttl";

const DEFAULT_PUSH_TTL: i64 = 86400;

pub fn register_settings(registry: &mut SettingsRegistry) -> ClResult<()> {
	// Stored verbatim, validity is checked when sending
	registry.register(
		SettingDefinition::builder(FIREBASE_CONFIG)
			.description("Firebase service account key (JSON) used to deliver FCM messages")
			.permission(PermissionLevel::Admin)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(VAPID_PUBLIC)
			.description("VAPID public key (base64url, uncompressed P-256 point)")
			.permission(PermissionLevel::System)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(VAPID_PRIVATE)
			.description("VAPID private key (base64url, raw P-256 scalar)")
			.permission(PermissionLevel::System)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(PUSH_TTL)
			.description("How long push services keep an undelivered Web Push message (seconds)")
			.default(SettingValue::Int(DEFAULT_PUSH_TTL))
			.permission(PermissionLevel::Admin)
			.validator(|value| match value {
				SettingValue::Int(ttl) if *ttl >= 0 => Ok(()),
				_ => Err(Error::ValidationError("TTL must be a non-negative integer".into())),
			})
			.build()?,
	)?;

	Ok(())
}

// vim: ts=4
