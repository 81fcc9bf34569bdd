//! Fan-out tests with a scripted messaging client
//!
//! Tokens encode the scripted outcome: `gone-*` is unregistered, `auth-*`
//! fails authentication, `down-*` hits a server error, anything else succeeds.
//! Web Push goes to a local endpoint that answers by path the same way.

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pwa_push_core::app::{App, AppBuilderOpts, AppState};
use pwa_push_core::extensions::Extensions;
use pwa_push_core::settings::service::SettingsService;
use pwa_push_core::settings::{SettingValue, SettingsRegistry};
use pwa_push_sender::http::LazyClient;
use pwa_push_sender::notifier::PushNotifierExt;
use pwa_push_sender::settings::FIREBASE_CONFIG;
use pwa_push_sender::webpush::generate_vapid_keys;
use pwa_push_sender::{
	CloudMessage, DefaultMessageBuilder, FirebasePushSender, Messaging, MessagingError,
	MessagingProvider, PushNotifier, SendReport, WebPushSender,
};
use pwa_push_store_adapter_sqlite::StoreAdapterSqlite;
use pwa_push_types::error::{ClResult, Error};
use pwa_push_types::message::{MessageBuilder, NotificationBlueprint, RenderedMessage};
use pwa_push_types::store_adapter::{
	PushSubscriptionData, PushSubscriptionKeys, StoreAdapter, SubscriptionKind,
};
use pwa_push_types::types::UserId;
use tempfile::TempDir;

const SERVICE_ACCOUNT: &str = r#"{"type":"service_account","project_id":"demo"}"#;

#[derive(Default)]
struct ScriptedMessaging {
	sent: parking_lot::Mutex<Vec<CloudMessage>>,
}

#[async_trait]
impl Messaging for ScriptedMessaging {
	async fn send(&self, message: &CloudMessage) -> Result<(), MessagingError> {
		self.sent.lock().push(message.clone());
		if message.token.starts_with("gone-") {
			Err(MessagingError::NotFound("Requested entity was not found.".into()))
		} else if message.token.starts_with("auth-") {
			Err(MessagingError::Authentication("invalid_grant".into()))
		} else if message.token.starts_with("down-") {
			Err(MessagingError::Server("HTTP 503".into()))
		} else {
			Ok(())
		}
	}
}

#[derive(Default)]
struct ScriptedProvider {
	messaging: Arc<ScriptedMessaging>,
	resolved: AtomicUsize,
	reject: bool,
}

impl MessagingProvider for ScriptedProvider {
	fn resolve(&self, _config: &str) -> ClResult<Arc<dyn Messaging>> {
		self.resolved.fetch_add(1, Ordering::SeqCst);
		if self.reject {
			return Err(Error::ConfigError("missing private_key".into()));
		}
		Ok(self.messaging.clone())
	}
}

struct FixedBuilder;

impl MessageBuilder for FixedBuilder {
	fn build(&self, _blueprint: &NotificationBlueprint) -> ClResult<RenderedMessage> {
		Ok(RenderedMessage {
			title: "<i>Release</i> notes".into(),
			body: "<p>Hello <b>world</b></p>".into(),
			url: Some("https://forum.example.com/d/1".into()),
		})
	}
}

struct TestEnv {
	app: App,
	provider: Arc<ScriptedProvider>,
	_temp: TempDir,
}

async fn create_env_with(provider: ScriptedProvider, builder: Arc<dyn MessageBuilder>) -> TestEnv {
	let temp = TempDir::new().expect("Failed to create temp directory");
	let store: Arc<dyn StoreAdapter> =
		Arc::new(StoreAdapterSqlite::new(temp.path()).await.expect("Failed to create adapter"));

	let mut registry = SettingsRegistry::new();
	pwa_push_sender::register_settings(&mut registry).unwrap();
	let registry = Arc::new(registry.freeze());
	let settings = Arc::new(SettingsService::new(registry.clone(), store.clone(), 10));

	let provider = Arc::new(provider);
	let notifier = PushNotifier::new(
		FirebasePushSender::new(builder.clone(), provider.clone()),
		WebPushSender::new(Arc::new(LazyClient::allow_http()), builder),
	);
	let mut extensions = Extensions::new();
	extensions.insert::<PushNotifierExt>(Arc::new(notifier));

	let app = Arc::new(AppState {
		opts: AppBuilderOpts::default(),
		store_adapter: store,
		settings,
		settings_registry: registry,
		extensions,
	});
	TestEnv { app, provider, _temp: temp }
}

async fn create_env() -> TestEnv {
	create_env_with(ScriptedProvider::default(), Arc::new(FixedBuilder)).await
}

async fn set_firebase_config(app: &App, config: &str) {
	app.settings
		.set_system(FIREBASE_CONFIG, SettingValue::String(config.into()))
		.await
		.unwrap();
}

async fn add_token(app: &App, user_id: u64, token: &str) {
	app.store_adapter
		.create_push_subscription(UserId(user_id), &PushSubscriptionData::Firebase {
			token: token.into(),
		})
		.await
		.unwrap();
}

async fn tokens_of(app: &App, user_ids: &[UserId]) -> Vec<String> {
	app.store_adapter
		.list_push_subscriptions(user_ids, Some(SubscriptionKind::Firebase))
		.await
		.unwrap()
		.into_iter()
		.map(|s| s.data.endpoint().to_string())
		.collect()
}

fn firebase_sender(app: &App) -> &FirebasePushSender {
	&app.ext::<PushNotifierExt>().unwrap().firebase
}

#[tokio::test]
async fn test_invalid_config_sends_nothing() {
	let env = create_env().await;
	add_token(&env.app, 1, "tok-a").await;
	let blueprint = NotificationBlueprint::new("newPost");

	// Unset
	let report = firebase_sender(&env.app).notify(&env.app, &blueprint, &[UserId(1)]).await.unwrap();
	assert_eq!(report, SendReport::default());

	// Not JSON
	set_firebase_config(&env.app, "{ this is not json").await;
	let report = firebase_sender(&env.app).notify(&env.app, &blueprint, &[UserId(1)]).await.unwrap();
	assert_eq!(report, SendReport::default());

	assert_eq!(env.provider.resolved.load(Ordering::SeqCst), 0);
	assert!(env.provider.messaging.sent.lock().is_empty());
	assert_eq!(tokens_of(&env.app, &[UserId(1)]).await, vec!["tok-a"]);
}

#[tokio::test]
async fn test_unresolvable_config_is_noop() {
	let provider = ScriptedProvider { reject: true, ..Default::default() };
	let env = create_env_with(provider, Arc::new(FixedBuilder)).await;
	add_token(&env.app, 1, "tok-a").await;
	set_firebase_config(&env.app, SERVICE_ACCOUNT).await;

	let report = firebase_sender(&env.app)
		.notify(&env.app, &NotificationBlueprint::new("newPost"), &[UserId(1)])
		.await
		.unwrap();

	assert_eq!(report.total(), 0);
	assert_eq!(env.provider.resolved.load(Ordering::SeqCst), 1);
	assert!(env.provider.messaging.sent.lock().is_empty());
}

#[tokio::test]
async fn test_not_found_deletes_only_that_subscription() {
	let env = create_env().await;
	set_firebase_config(&env.app, SERVICE_ACCOUNT).await;
	add_token(&env.app, 1, "tok-a").await;
	add_token(&env.app, 1, "gone-b").await;
	add_token(&env.app, 2, "tok-c").await;

	let report = firebase_sender(&env.app)
		.notify(&env.app, &NotificationBlueprint::new("newPost"), &[UserId(1), UserId(2)])
		.await
		.unwrap();

	assert_eq!(report, SendReport { sent: 2, removed: 1, failed: 0 });
	assert_eq!(env.provider.messaging.sent.lock().len(), 3);
	assert_eq!(tokens_of(&env.app, &[UserId(1), UserId(2)]).await, vec!["tok-a", "tok-c"]);
}

#[tokio::test]
async fn test_auth_and_server_errors_keep_subscriptions() {
	let env = create_env().await;
	set_firebase_config(&env.app, SERVICE_ACCOUNT).await;
	add_token(&env.app, 1, "auth-a").await;
	add_token(&env.app, 1, "down-b").await;
	add_token(&env.app, 1, "tok-c").await;

	let report = firebase_sender(&env.app)
		.notify(&env.app, &NotificationBlueprint::new("newPost"), &[UserId(1)])
		.await
		.unwrap();

	// The batch continues past both failures
	assert_eq!(report, SendReport { sent: 1, removed: 0, failed: 2 });
	let sent = env.provider.messaging.sent.lock();
	assert_eq!(sent.last().map(|m| m.token.as_str()), Some("tok-c"));
	drop(sent);
	assert_eq!(tokens_of(&env.app, &[UserId(1)]).await.len(), 3);
}

#[tokio::test]
async fn test_body_is_stripped_title_is_not() {
	let env = create_env().await;
	set_firebase_config(&env.app, SERVICE_ACCOUNT).await;
	add_token(&env.app, 1, "tok-a").await;

	firebase_sender(&env.app)
		.notify(&env.app, &NotificationBlueprint::new("newPost"), &[UserId(1)])
		.await
		.unwrap();

	let sent = env.provider.messaging.sent.lock();
	assert_eq!(sent.len(), 1);
	assert_eq!(sent[0].title, "<i>Release</i> notes");
	assert_eq!(sent[0].body, "Hello world");
	assert_eq!(sent[0].link.as_deref(), Some("https://forum.example.com/d/1"));
}

#[tokio::test]
async fn test_only_target_users_and_firebase_kind() {
	let env = create_env_with(
		ScriptedProvider::default(),
		Arc::new(DefaultMessageBuilder::new().unwrap()),
	)
	.await;
	set_firebase_config(&env.app, SERVICE_ACCOUNT).await;
	add_token(&env.app, 1, "tok-a").await;
	add_token(&env.app, 2, "tok-b").await;
	env.app
		.store_adapter
		.create_push_subscription(UserId(1), &PushSubscriptionData::WebPush {
			endpoint: "https://push.example.com/x".into(),
			expiration_time: None,
			keys: PushSubscriptionKeys { p256dh: "k".into(), auth: "a".into() },
		})
		.await
		.unwrap();

	let blueprint = NotificationBlueprint {
		actor: Some("alice".into()),
		subject: Some("Welcome".into()),
		excerpt: Some("<p>Hi <em>there</em></p>".into()),
		..NotificationBlueprint::new("newPost")
	};
	let report = firebase_sender(&env.app).notify(&env.app, &blueprint, &[UserId(1)]).await.unwrap();

	assert_eq!(report.sent, 1);
	let sent = env.provider.messaging.sent.lock();
	assert_eq!(sent[0].token, "tok-a");
	assert_eq!(sent[0].title, "Welcome");
	assert_eq!(sent[0].body, "alice replied: Hi there");
}

#[tokio::test]
async fn test_web_push_without_keys_is_noop() {
	let env = create_env().await;
	env.app
		.store_adapter
		.create_push_subscription(UserId(1), &PushSubscriptionData::WebPush {
			endpoint: "https://push.example.com/x".into(),
			expiration_time: None,
			keys: PushSubscriptionKeys { p256dh: "k".into(), auth: "a".into() },
		})
		.await
		.unwrap();

	let notifier = env.app.ext::<PushNotifierExt>().unwrap().clone();
	let report = notifier.notify(&env.app, &NotificationBlueprint::new("newPost"), &[UserId(1)]).await;
	assert_eq!(report.web_push, SendReport::default());
	assert_eq!(report.firebase, SendReport::default());
}

#[tokio::test]
async fn test_vapid_key_is_generated_once() {
	let env = create_env().await;
	let notifier = env.app.ext::<PushNotifierExt>().unwrap().clone();

	let first = notifier.web_push.vapid_public_key(&env.app).await.unwrap();
	let second = notifier.web_push.vapid_public_key(&env.app).await.unwrap();
	assert_eq!(first, second);
	assert_eq!(first.len(), 87); // 65 bytes, base64url without padding

	let keys = pwa_push_sender::webpush::read_vapid_keys(&env.app).await.unwrap().unwrap();
	assert_eq!(keys.public_key, first);
}

type Hits = Arc<parking_lot::Mutex<Vec<String>>>;

async fn push_endpoint(State(hits): State<Hits>, Path(id): Path<String>) -> StatusCode {
	hits.lock().push(id.clone());
	if id.starts_with("gone-") {
		StatusCode::GONE
	} else if id.starts_with("missing-") {
		StatusCode::NOT_FOUND
	} else if id.starts_with("bad-") {
		StatusCode::BAD_REQUEST
	} else if id.starts_with("down-") {
		StatusCode::INTERNAL_SERVER_ERROR
	} else {
		StatusCode::CREATED
	}
}

/// Serve a push service on an ephemeral local port, returning its base URL
async fn start_push_service(hits: Hits) -> String {
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	let router = Router::new().route("/push/{id}", post(push_endpoint)).with_state(hits);
	tokio::spawn(async move {
		axum::serve(listener, router).await.unwrap();
	});
	format!("http://{}/push", addr)
}

async fn add_endpoint(app: &App, user_id: u64, endpoint: String) {
	let client_key = generate_vapid_keys().unwrap();
	app.store_adapter
		.create_push_subscription(UserId(user_id), &PushSubscriptionData::WebPush {
			endpoint,
			expiration_time: None,
			keys: PushSubscriptionKeys {
				p256dh: client_key.public_key,
				auth: "c2VjcmV0LWF1dGgtMTIzNA".into(), // 16 bytes
			},
		})
		.await
		.unwrap();
}

async fn endpoints_of(app: &App, user_ids: &[UserId]) -> Vec<String> {
	app.store_adapter
		.list_push_subscriptions(user_ids, Some(SubscriptionKind::WebPush))
		.await
		.unwrap()
		.into_iter()
		.map(|s| s.data.endpoint().to_string())
		.collect()
}

#[tokio::test]
async fn test_web_push_gone_deletes_only_that_subscription() {
	let env = create_env().await;
	let hits = Hits::default();
	let base = start_push_service(hits.clone()).await;
	let notifier = env.app.ext::<PushNotifierExt>().unwrap().clone();
	notifier.web_push.vapid_public_key(&env.app).await.unwrap();

	for id in ["ok-a", "gone-b", "bad-c", "down-d", "missing-e", "ok-f"] {
		add_endpoint(&env.app, 1, format!("{}/{}", base, id)).await;
	}
	add_endpoint(&env.app, 2, format!("{}/ok-other-user", base)).await;

	let report = notifier
		.web_push
		.notify(&env.app, &NotificationBlueprint::new("newPost"), &[UserId(1)])
		.await
		.unwrap();

	// Errors other than 404/410 keep the row and the batch continues
	assert_eq!(report, SendReport { sent: 2, removed: 2, failed: 2 });
	assert_eq!(*hits.lock(), vec!["ok-a", "gone-b", "bad-c", "down-d", "missing-e", "ok-f"]);
	assert_eq!(endpoints_of(&env.app, &[UserId(1), UserId(2)]).await, vec![
		format!("{}/ok-a", base),
		format!("{}/bad-c", base),
		format!("{}/down-d", base),
		format!("{}/ok-f", base),
		format!("{}/ok-other-user", base),
	]);
}

// vim: ts=4
