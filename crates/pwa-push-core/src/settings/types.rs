//! Settings types and definitions
//!
//! Site-wide settings with a permission level per definition. Values live in
//! the store adapter; definitions are registered by the feature crates at
//! startup and then frozen.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;

use crate::prelude::*;

/// Type alias for setting validator function
pub type SettingValidator = Box<dyn Fn(&SettingValue) -> ClResult<()> + Send + Sync>;

/// Setting permission level defines who can modify a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionLevel {
	/// System: only the service itself writes it (generated keys, etc.)
	#[serde(rename = "system")]
	System,
	/// Admin: Only users with admin role can change
	#[serde(rename = "admin")]
	Admin,
}

impl PermissionLevel {
	/// Check if the given roles satisfy this permission level
	pub fn check<S: AsRef<str>>(&self, roles: &[S]) -> bool {
		match self {
			PermissionLevel::System => false,
			PermissionLevel::Admin => {
				roles.iter().any(|r| r.as_ref() == pwa_push_types::auth::ADMIN_ROLE)
			}
		}
	}
}

/// Setting value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)] // No type tag - type inferred from SettingDefinition
pub enum SettingValue {
	Bool(bool), // Must be before Int to avoid bool -> int coercion
	Int(i64),
	String(String),
	Json(serde_json::Value),
}

impl SettingValue {
	/// Check if this value matches the type of another value
	pub fn matches_type(&self, other: &SettingValue) -> bool {
		matches!(
			(self, other),
			(SettingValue::String(_), SettingValue::String(_))
				| (SettingValue::Int(_), SettingValue::Int(_))
				| (SettingValue::Bool(_), SettingValue::Bool(_))
				| (SettingValue::Json(_), SettingValue::Json(_))
		)
	}

	/// Get the type name for error messages
	pub fn type_name(&self) -> &'static str {
		match self {
			SettingValue::String(_) => "string",
			SettingValue::Int(_) => "int",
			SettingValue::Bool(_) => "bool",
			SettingValue::Json(_) => "json",
		}
	}
}

/// Setting definition - defines metadata for each setting
pub struct SettingDefinition {
	/// Dot-separated key (e.g., "pwa.firebase_config")
	pub key: String,

	/// Human-readable description
	pub description: String,

	/// Optional default value
	pub default: Option<SettingValue>,

	/// Permission level required to modify this setting
	pub permission: PermissionLevel,

	/// Optional validation function
	pub validator: Option<SettingValidator>,
}

impl Debug for SettingDefinition {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SettingDefinition")
			.field("key", &self.key)
			.field("description", &self.description)
			.field("default", &self.default)
			.field("permission", &self.permission)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl SettingDefinition {
	/// Create a builder for constructing a SettingDefinition
	pub fn builder(key: impl Into<String>) -> SettingDefinitionBuilder {
		SettingDefinitionBuilder::new(key)
	}
}

/// Builder for SettingDefinition with fluent API
pub struct SettingDefinitionBuilder {
	key: String,
	description: Option<String>,
	default: Option<SettingValue>,
	permission: PermissionLevel,
	validator: Option<SettingValidator>,
}

impl SettingDefinitionBuilder {
	pub fn new(key: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			description: None,
			default: None,
			permission: PermissionLevel::Admin,
			validator: None,
		}
	}

	/// Set the description (required)
	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	/// Set the default value. Settings without one read as unset.
	pub fn default(mut self, value: SettingValue) -> Self {
		self.default = Some(value);
		self
	}

	/// Set the permission level (defaults to Admin)
	pub fn permission(mut self, permission: PermissionLevel) -> Self {
		self.permission = permission;
		self
	}

	/// Set a validation function
	pub fn validator<F>(mut self, f: F) -> Self
	where
		F: Fn(&SettingValue) -> ClResult<()> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(f));
		self
	}

	/// Build the SettingDefinition
	pub fn build(self) -> ClResult<SettingDefinition> {
		let description = self
			.description
			.ok_or_else(|| Error::ConfigError("Setting description is required".into()))?;

		if self.key.is_empty() || self.key.starts_with('.') || self.key.ends_with('.') {
			return Err(Error::ConfigError(format!("Invalid setting key '{}'", self.key)));
		}

		Ok(SettingDefinition {
			key: self.key,
			description,
			default: self.default,
			permission: self.permission,
			validator: self.validator,
		})
	}
}

/// Mutable registry used during app initialization
#[derive(Default)]
pub struct SettingsRegistry {
	definitions: HashMap<String, SettingDefinition>,
}

impl SettingsRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a new setting definition
	pub fn register(&mut self, def: SettingDefinition) -> ClResult<()> {
		if self.definitions.contains_key(&def.key) {
			return Err(Error::ConfigError(format!("Setting '{}' is already registered", def.key)));
		}

		debug!("Registering setting: {}", def.key);
		self.definitions.insert(def.key.clone(), def);
		Ok(())
	}

	/// Freeze the registry (make it immutable)
	pub fn freeze(self) -> FrozenSettingsRegistry {
		info!("Freezing settings registry with {} definitions", self.definitions.len());
		FrozenSettingsRegistry { definitions: self.definitions }
	}

	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}
}

/// Immutable registry stored in AppState
pub struct FrozenSettingsRegistry {
	definitions: HashMap<String, SettingDefinition>,
}

impl FrozenSettingsRegistry {
	/// Get a setting definition by key
	/// First tries exact match, then tries wildcard pattern "<first_element>.*"
	pub fn get(&self, key: &str) -> Option<&SettingDefinition> {
		if let Some(def) = self.definitions.get(key) {
			return Some(def);
		}

		if let Some(dot_pos) = key.find('.') {
			let wildcard_key = format!("{}.*", &key[..dot_pos]);
			if let Some(def) = self.definitions.get(&wildcard_key) {
				return Some(def);
			}
		}

		None
	}

	/// List all registered settings
	pub fn list(&self) -> impl Iterator<Item = &SettingDefinition> {
		self.definitions.values()
	}

	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_builder_requires_description() {
		assert!(SettingDefinition::builder("pwa.x").build().is_err());
		assert!(SettingDefinition::builder("").description("d").build().is_err());
		let def = SettingDefinition::builder("pwa.x").description("d").build().unwrap();
		assert_eq!(def.permission, PermissionLevel::Admin);
		assert!(def.default.is_none());
	}

	#[test]
	fn test_duplicate_registration() {
		let mut registry = SettingsRegistry::new();
		registry
			.register(SettingDefinition::builder("pwa.x").description("d").build().unwrap())
			.unwrap();
		let res =
			registry.register(SettingDefinition::builder("pwa.x").description("d").build().unwrap());
		assert!(res.is_err());
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn test_wildcard_lookup() {
		let mut registry = SettingsRegistry::new();
		registry
			.register(SettingDefinition::builder("ui.*").description("ui").build().unwrap())
			.unwrap();
		let frozen = registry.freeze();
		assert!(frozen.get("ui.theme").is_some());
		assert!(frozen.get("pwa.theme").is_none());
	}

	#[test]
	fn test_permission_check() {
		assert!(PermissionLevel::Admin.check(&["admin"]));
		assert!(!PermissionLevel::Admin.check(&["member"]));
		assert!(!PermissionLevel::System.check(&["admin"]));
	}

	#[test]
	fn test_untagged_values() {
		let v: SettingValue = serde_json::from_value(serde_json::json!(true)).unwrap();
		assert_eq!(v, SettingValue::Bool(true));
		let v: SettingValue = serde_json::from_value(serde_json::json!("{\"a\":1}")).unwrap();
		assert_eq!(v, SettingValue::String("{\"a\":1}".into()));
		assert!(v.matches_type(&SettingValue::String(String::new())));
		assert!(!v.matches_type(&SettingValue::Int(0)));
	}
}

// vim: ts=4
