//! App state type

use std::sync::Arc;

use crate::extensions::Extensions;
use crate::prelude::*;
use crate::settings::service::SettingsService;
use crate::settings::types::FrozenSettingsRegistry;

use pwa_push_types::store_adapter::StoreAdapter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub opts: AppBuilderOpts,
	pub store_adapter: Arc<dyn StoreAdapter>,

	// Settings subsystem
	pub settings: Arc<SettingsService>,
	pub settings_registry: Arc<FrozenSettingsRegistry>,

	// Type-erased extension map for feature-specific state
	pub extensions: Extensions,
}

impl AppState {
	/// Get a registered extension by type. Returns error if not found.
	pub fn ext<T: Send + Sync + 'static>(&self) -> ClResult<&T> {
		self.extensions.require::<T>()
	}
}

pub type App = Arc<AppState>;

#[derive(Debug, Clone)]
pub struct AppBuilderOpts {
	/// Address to listen on
	pub listen: Box<str>,
	/// Shared secret of the HS256 access tokens issued by the forum
	pub jwt_secret: Box<str>,
	/// Public URL of the forum API, sent to clients as `apiUrl`
	pub api_url: Box<str>,
	/// Contact for the VAPID `sub` claim (`mailto:` or `https:` URL)
	pub vapid_subject: Box<str>,
	/// Capacity of the settings LRU cache
	pub settings_cache_size: usize,
}

impl Default for AppBuilderOpts {
	fn default() -> Self {
		Self {
			listen: "127.0.0.1:8080".into(),
			jwt_secret: "".into(),
			api_url: "http://localhost:8080/api".into(),
			vapid_subject: "mailto:admin@localhost".into(),
			settings_cache_size: 100,
		}
	}
}

// vim: ts=4
