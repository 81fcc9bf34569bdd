//! Typed per-user notification preferences
//!
//! The forum stores preferences as a flat map of `notify_<type>_<method>`
//! keys. They are parsed once into [`Preferences`], keyed by notification
//! type and [`NotificationMethod`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Channels a notification can be delivered through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationMethod {
	Alert,
	Email,
	Push,
}

impl NotificationMethod {
	pub const ALL: [NotificationMethod; 3] =
		[NotificationMethod::Alert, NotificationMethod::Email, NotificationMethod::Push];

	pub fn as_str(&self) -> &'static str {
		match self {
			NotificationMethod::Alert => "alert",
			NotificationMethod::Email => "email",
			NotificationMethod::Push => "push",
		}
	}

	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|m| m.as_str() == name)
	}
}

/// Preferences of one user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
	map: HashMap<(Box<str>, NotificationMethod), bool>,
}

impl Preferences {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder style setter
	pub fn with(mut self, typ: &str, method: NotificationMethod, enabled: bool) -> Self {
		self.set(typ, method, enabled);
		self
	}

	pub fn set(&mut self, typ: &str, method: NotificationMethod, enabled: bool) {
		self.map.insert((Box::from(typ), method), enabled);
	}

	pub fn is_enabled(&self, typ: &str, method: NotificationMethod) -> bool {
		self.map.get(&(Box::from(typ), method)).copied().unwrap_or(false)
	}

	/// Whether at least one notification type is enabled for `method`
	pub fn any_enabled(&self, method: NotificationMethod) -> bool {
		self.map.iter().any(|((_, m), enabled)| *m == method && *enabled)
	}

	/// Whether the user wants at least one kind of push notification
	pub fn push_enabled(&self) -> bool {
		self.any_enabled(NotificationMethod::Push)
	}

	/// Notification types enabled for `method`, sorted
	pub fn enabled_types(&self, method: NotificationMethod) -> Vec<&str> {
		let mut types: Vec<&str> = self
			.map
			.iter()
			.filter(|((_, m), enabled)| *m == method && **enabled)
			.map(|((typ, _), _)| typ.as_ref())
			.collect();
		types.sort_unstable();
		types
	}

	/// Parse the forum's flat preference object.
	///
	/// Keys that are not `notify_<type>_<method>` with a known method are
	/// ignored, as are non-boolean values.
	pub fn from_forum(prefs: &serde_json::Map<String, serde_json::Value>) -> Self {
		let mut res = Self::new();
		for (key, value) in prefs {
			let Some(rest) = key.strip_prefix("notify_") else { continue };
			let Some((typ, method)) = rest.rsplit_once('_') else { continue };
			let Some(method) = NotificationMethod::from_name(method) else { continue };
			if typ.is_empty() {
				continue;
			}
			if let Some(enabled) = value.as_bool() {
				res.set(typ, method, enabled);
			}
		}
		res
	}
}


// vim: ts=4
