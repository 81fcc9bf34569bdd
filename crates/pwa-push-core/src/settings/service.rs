//! Settings service with caching, validation, and permission checks

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::prelude::*;
use pwa_push_types::store_adapter::StoreAdapter;

use super::types::{FrozenSettingsRegistry, SettingValue};

/// LRU cache for settings values
pub struct SettingsCache {
	cache: parking_lot::RwLock<LruCache<String, Option<SettingValue>>>,
}

impl SettingsCache {
	pub fn new(capacity: usize) -> Self {
		let capacity = NonZeroUsize::new(capacity)
			.or(NonZeroUsize::new(100))
			.unwrap_or(NonZeroUsize::MIN);
		Self { cache: parking_lot::RwLock::new(LruCache::new(capacity)) }
	}

	pub fn get(&self, key: &str) -> Option<Option<SettingValue>> {
		let mut cache = self.cache.write();
		cache.get(key).cloned()
	}

	pub fn put(&self, key: String, value: Option<SettingValue>) {
		let mut cache = self.cache.write();
		cache.put(key, value);
	}

	pub fn invalidate(&self, key: &str) {
		let mut cache = self.cache.write();
		cache.pop(key);
	}
}

/// Settings service - main interface for accessing and managing settings
pub struct SettingsService {
	registry: Arc<FrozenSettingsRegistry>,
	cache: SettingsCache,
	store: Arc<dyn StoreAdapter>,
}

impl SettingsService {
	pub fn new(
		registry: Arc<FrozenSettingsRegistry>,
		store: Arc<dyn StoreAdapter>,
		cache_size: usize,
	) -> Self {
		Self { registry, cache: SettingsCache::new(cache_size), store }
	}

	/// Get a setting value (stored -> default). `None` if neither exists.
	pub async fn get_opt(&self, key: &str) -> ClResult<Option<SettingValue>> {
		if let Some(value) = self.cache.get(key) {
			debug!("Setting cache hit: {}", key);
			return Ok(value);
		}

		let def = self
			.registry
			.get(key)
			.ok_or_else(|| Error::ValidationError(format!("Unknown setting: {}", key)))?;

		let value = match self.store.read_setting(key).await? {
			Some(json_value) => Some(
				serde_json::from_value::<SettingValue>(json_value)
					.map_err(|e| Error::ValidationError(format!("Invalid setting value: {}", e)))?,
			),
			None => def.default.clone(),
		};

		self.cache.put(key.to_string(), value.clone());
		Ok(value)
	}

	/// Get a setting value, failing if it is unset and has no default
	pub async fn get(&self, key: &str) -> ClResult<SettingValue> {
		self.get_opt(key).await?.ok_or_else(|| {
			Error::ValidationError(format!("Setting '{}' has no default and must be configured", key))
		})
	}

	/// Get a string setting. Unset or empty values read as `None`.
	pub async fn get_string(&self, key: &str) -> ClResult<Option<String>> {
		match self.get_opt(key).await? {
			Some(SettingValue::String(s)) if !s.is_empty() => Ok(Some(s)),
			Some(SettingValue::String(_)) | None => Ok(None),
			Some(other) => Err(Error::ValidationError(format!(
				"Setting '{}' is not a string, got {}",
				key,
				other.type_name()
			))),
		}
	}

	pub async fn get_int(&self, key: &str) -> ClResult<i64> {
		match self.get(key).await? {
			SettingValue::Int(i) => Ok(i),
			other => Err(Error::ValidationError(format!(
				"Setting '{}' is not an int, got {}",
				key,
				other.type_name()
			))),
		}
	}

	/// Set setting value with validation and permission checks
	/// The `roles` parameter should be the authenticated user's roles
	pub async fn set<S: AsRef<str>>(
		&self,
		key: &str,
		value: SettingValue,
		roles: &[S],
	) -> ClResult<()> {
		let def = self
			.registry
			.get(key)
			.ok_or_else(|| Error::ValidationError(format!("Unknown setting: {}", key)))?;

		if !def.permission.check(roles) {
			warn!("Permission denied for setting '{}': requires {:?}", key, def.permission);
			return Err(Error::PermissionDenied);
		}

		self.store_value(key, value).await
	}

	/// Set a setting on behalf of the service itself, bypassing permissions
	pub async fn set_system(&self, key: &str, value: SettingValue) -> ClResult<()> {
		self.store_value(key, value).await
	}

	async fn store_value(&self, key: &str, value: SettingValue) -> ClResult<()> {
		let def = self
			.registry
			.get(key)
			.ok_or_else(|| Error::ValidationError(format!("Unknown setting: {}", key)))?;

		// Validate type matches definition (if default exists)
		if let Some(default) = &def.default {
			if !value.matches_type(default) {
				return Err(Error::ValidationError(format!(
					"Type mismatch for setting '{}': expected {}, got {}",
					key,
					default.type_name(),
					value.type_name()
				)));
			}
		}

		if let Some(validator) = &def.validator {
			validator(&value)?;
		}

		let json_value = serde_json::to_value(&value)
			.map_err(|e| Error::ValidationError(format!("Failed to serialize setting: {}", e)))?;
		self.store.update_setting(key, Some(json_value)).await?;
		self.cache.invalidate(key);

		info!("Setting '{}' updated", key);
		Ok(())
	}
}

// vim: ts=4
