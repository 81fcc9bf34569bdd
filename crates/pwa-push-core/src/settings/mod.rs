//! Settings subsystem types and service

pub mod service;
pub mod types;

pub use types::{
	FrozenSettingsRegistry, PermissionLevel, SettingDefinition, SettingDefinitionBuilder,
	SettingValue, SettingsRegistry,
};

// vim: ts=4
