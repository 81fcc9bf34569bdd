//! `localStorage` abstraction

use std::collections::HashMap;

/// Key/value storage persisted across page loads
pub trait LocalStore: Send + Sync {
	fn get_item(&self, key: &str) -> Option<String>;
	fn set_item(&self, key: &str, value: &str);
}

/// In-memory store for hosts without persistent storage
#[derive(Debug, Default)]
pub struct MemoryStore {
	items: parking_lot::RwLock<HashMap<String, String>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

impl LocalStore for MemoryStore {
	fn get_item(&self, key: &str) -> Option<String> {
		self.items.read().get(key).cloned()
	}

	fn set_item(&self, key: &str, value: &str) {
		self.items.write().insert(key.to_string(), value.to_string());
	}
}

// vim: ts=4
