//! Type-erased state registry
//!
//! Feature crates (the push senders, the message builder) park their state
//! here so `AppState` does not need to know their types.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::prelude::*;

#[derive(Default)]
pub struct Extensions {
	map: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Extensions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a value, replacing any earlier value of the same type
	pub fn insert<T: Send + Sync + 'static>(&mut self, val: T) -> bool {
		self.map.insert(TypeId::of::<T>(), Box::new(val)).is_some()
	}

	pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
		self.map.get(&TypeId::of::<T>())?.downcast_ref::<T>()
	}

	/// Like `get`, but a missing value is an internal error
	pub fn require<T: Send + Sync + 'static>(&self) -> ClResult<&T> {
		self.get::<T>().ok_or_else(|| {
			Error::Internal(format!("Extension {} not registered", std::any::type_name::<T>()))
		})
	}

	pub fn len(&self) -> usize {
		self.map.len()
	}

	pub fn is_empty(&self) -> bool {
		self.map.is_empty()
	}
}

impl std::fmt::Debug for Extensions {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Extensions").field("len", &self.map.len()).finish()
	}
}


// vim: ts=4
