//! App builder - constructs and runs the push notification service

use axum::Router;
use std::sync::Arc;

use crate::prelude::*;
use crate::routes;
pub use pwa_push_core::app::{App, AppBuilderOpts, AppState, VERSION};
use pwa_push_core::extensions::Extensions;
use pwa_push_core::settings::service::SettingsService;
use pwa_push_core::settings::SettingsRegistry;
use pwa_push_sender::fcm::FcmProvider;
use pwa_push_sender::http::LazyClient;
use pwa_push_sender::notifier::PushNotifierExt;
use pwa_push_sender::{
	DefaultMessageBuilder, FirebasePushSender, MessagingProvider, PushNotifier, WebPushSender,
};
use pwa_push_types::message::MessageBuilder;
use pwa_push_types::store_adapter::StoreAdapter;

pub struct AppBuilder {
	opts: AppBuilderOpts,
	store_adapter: Option<Arc<dyn StoreAdapter>>,
	message_builder: Option<Arc<dyn MessageBuilder>>,
	messaging_provider: Option<Arc<dyn MessagingProvider>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		// Tests build several apps in one process, only the first one installs the subscriber
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder {
			opts: AppBuilderOpts::default(),
			store_adapter: None,
			message_builder: None,
			messaging_provider: None,
		}
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn jwt_secret(&mut self, jwt_secret: impl Into<Box<str>>) -> &mut Self {
		self.opts.jwt_secret = jwt_secret.into();
		self
	}
	pub fn api_url(&mut self, api_url: impl Into<Box<str>>) -> &mut Self {
		self.opts.api_url = api_url.into();
		self
	}
	pub fn vapid_subject(&mut self, vapid_subject: impl Into<Box<str>>) -> &mut Self {
		self.opts.vapid_subject = vapid_subject.into();
		self
	}
	pub fn settings_cache_size(&mut self, size: usize) -> &mut Self {
		self.opts.settings_cache_size = size;
		self
	}

	// Adapters
	pub fn store_adapter(&mut self, store_adapter: Arc<dyn StoreAdapter>) -> &mut Self {
		self.store_adapter = Some(store_adapter);
		self
	}

	/// Replace the built-in notification templates
	pub fn message_builder(&mut self, message_builder: Arc<dyn MessageBuilder>) -> &mut Self {
		self.message_builder = Some(message_builder);
		self
	}

	/// Replace the Firebase Cloud Messaging client factory
	pub fn messaging_provider(&mut self, provider: Arc<dyn MessagingProvider>) -> &mut Self {
		self.messaging_provider = Some(provider);
		self
	}

	/// Assemble the app state and its API router without binding a socket
	pub fn build(self) -> ClResult<(App, Router)> {
		let Some(store_adapter) = self.store_adapter else {
			error!("FATAL: No store adapter configured");
			return Err(Error::Internal("No store adapter configured".to_string()));
		};
		if self.opts.jwt_secret.is_empty() {
			warn!("No JWT secret configured, every authenticated request will be rejected");
		}

		// Initialize settings registry and service
		let mut settings_registry = SettingsRegistry::new();
		pwa_push_sender::register_settings(&mut settings_registry)?;
		info!("Registered {} settings", settings_registry.len());

		let frozen_registry = Arc::new(settings_registry.freeze());
		let settings_service = Arc::new(SettingsService::new(
			frozen_registry.clone(),
			store_adapter.clone(),
			self.opts.settings_cache_size,
		));

		let message_builder = match self.message_builder {
			Some(builder) => builder,
			None => Arc::new(DefaultMessageBuilder::new()?),
		};
		let http_client = Arc::new(LazyClient::new());
		let messaging_provider = self
			.messaging_provider
			.unwrap_or_else(|| Arc::new(FcmProvider::new(http_client.clone())));

		let notifier = PushNotifier::new(
			FirebasePushSender::new(message_builder.clone(), messaging_provider),
			WebPushSender::new(http_client, message_builder),
		);

		// Build extensions map for feature-specific state
		let mut extensions = Extensions::new();
		extensions.insert::<PushNotifierExt>(Arc::new(notifier));

		let app: App = Arc::new(AppState {
			opts: self.opts,
			store_adapter,
			settings: settings_service,
			settings_registry: frozen_registry,
			extensions,
		});
		let router = routes::init(app.clone());

		Ok((app, router))
	}

	pub async fn run(self) -> ClResult<()> {
		info!("pwa-push V{}", VERSION);

		let (app, router) = self.build()?;

		let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await.map_err(|e| {
			error!("FATAL: Cannot listen on {}: {}", app.opts.listen, e);
			Error::Io(e)
		})?;
		info!("Listening on HTTP {}", app.opts.listen);

		axum::serve(listener, router).await?;

		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
