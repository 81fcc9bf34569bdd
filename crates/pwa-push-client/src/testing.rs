//! Scripted browser and forum fakes for the unit tests

use async_trait::async_trait;

use crate::api::ForumApi;
use crate::browser::{
	ClientEnv, Permission, PermissionPrompt, PushManager, PushSubscriptionJson,
	PushSubscriptionJsonKeys, SubscribeOptions,
};
use crate::prelude::*;
use pwa_push_types::preferences::{NotificationMethod, Preferences};

pub fn env(permission: Option<Permission>, push_enabled: bool) -> ClientEnv {
	ClientEnv {
		permission,
		preferences: Some(
			Preferences::new()
				.with("newPost", NotificationMethod::Alert, true)
				.with("newPost", NotificationMethod::Push, push_enabled),
		),
		vapid_public_key: Some("BPublicKey".into()),
		api_url: "https://forum.example.com/api".into(),
		apple_webview: false,
		firebase_push_state: None,
	}
}

#[derive(Default)]
struct PushState {
	calls: usize,
	current: Option<PushSubscriptionJson>,
	unsubscribed: Vec<String>,
	last_options: Option<SubscribeOptions>,
}

/// Push manager failing the first `fail_first` subscribe calls
#[derive(Default)]
pub struct FakePush {
	fail_first: usize,
	state: parking_lot::Mutex<PushState>,
}

fn subscription(endpoint: &str) -> PushSubscriptionJson {
	PushSubscriptionJson {
		endpoint: endpoint.to_string(),
		expiration_time: None,
		keys: PushSubscriptionJsonKeys { p256dh: "BClientKey".into(), auth: "c2VjcmV0".into() },
	}
}

impl FakePush {
	pub fn failing_first(fail_first: usize) -> Self {
		Self { fail_first, ..Default::default() }
	}

	pub fn with_current(self, endpoint: &str) -> Self {
		self.state.lock().current = Some(subscription(endpoint));
		self
	}

	pub fn subscribe_calls(&self) -> usize {
		self.state.lock().calls
	}

	pub fn current(&self) -> Option<PushSubscriptionJson> {
		self.state.lock().current.clone()
	}

	pub fn unsubscribed(&self) -> Vec<String> {
		self.state.lock().unsubscribed.clone()
	}

	pub fn last_options(&self) -> Option<SubscribeOptions> {
		self.state.lock().last_options.clone()
	}
}

#[async_trait]
impl PushManager for FakePush {
	async fn subscribe(&self, options: &SubscribeOptions) -> ClResult<PushSubscriptionJson> {
		let mut state = self.state.lock();
		state.calls += 1;
		state.last_options = Some(options.clone());
		if state.calls <= self.fail_first {
			return Err(Error::ServiceUnavailable("AbortError: registration failed".into()));
		}

		let sub = subscription(&format!("https://push.example.com/{}", state.calls));
		state.current = Some(sub.clone());
		Ok(sub)
	}

	async fn get_subscription(&self) -> ClResult<Option<PushSubscriptionJson>> {
		Ok(self.state.lock().current.clone())
	}

	async fn unsubscribe(&self, subscription: &PushSubscriptionJson) -> ClResult<bool> {
		let mut state = self.state.lock();
		state.unsubscribed.push(subscription.endpoint.clone());
		state.current = None;
		Ok(true)
	}
}

#[derive(Default)]
pub struct FakeApi {
	reject: bool,
	saved: parking_lot::Mutex<Vec<PushSubscriptionJson>>,
}

impl FakeApi {
	pub fn rejecting() -> Self {
		Self { reject: true, ..Default::default() }
	}

	pub fn saved(&self) -> Vec<PushSubscriptionJson> {
		self.saved.lock().clone()
	}
}

#[async_trait]
impl ForumApi for FakeApi {
	async fn save_subscription(&self, subscription: &PushSubscriptionJson) -> ClResult<()> {
		if self.reject {
			return Err(Error::Unauthorized);
		}
		self.saved.lock().push(subscription.clone());
		Ok(())
	}

	async fn save_firebase_token(&self, _token: &str) -> ClResult<()> {
		if self.reject {
			return Err(Error::Unauthorized);
		}
		Ok(())
	}
}

pub struct FakePrompt(pub Permission);

#[async_trait]
impl PermissionPrompt for FakePrompt {
	async fn request_permission(&self) -> ClResult<Permission> {
		Ok(self.0)
	}
}

// vim: ts=4
