//! Subscription lifecycle: subscribe, save and the once-per-session refresh

use crate::api::ForumApi;
use crate::browser::{ClientEnv, Permission, PermissionPrompt, PushManager, PushSubscriptionJson, SubscribeOptions};
use crate::prelude::*;

/// Per page session state
#[derive(Debug, Default)]
pub struct ClientSession {
	refreshed: bool,
}

impl ClientSession {
	pub fn new() -> Self {
		Self::default()
	}

	/// Whether `refresh_subscription` already ran in this session
	pub fn is_refreshed(&self) -> bool {
		self.refreshed
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
	/// Already refreshed, or the user does not want push
	Skipped,
	Subscribed,
	/// The first subscribe failed, the old subscription was replaced
	Resubscribed,
	Failed,
}

/// Subscribe with the site's VAPID key and optionally save the subscription.
///
/// Saving is fire and forget: a rejected save is logged, the subscription
/// is still returned.
pub async fn subscribe_user(
	push: &dyn PushManager,
	api: &dyn ForumApi,
	vapid_key: &str,
	save: bool,
) -> ClResult<PushSubscriptionJson> {
	let options =
		SubscribeOptions { user_visible_only: true, application_server_key: vapid_key.to_string() };
	let subscription = push.subscribe(&options).await?;

	if save {
		if let Err(err) = api.save_subscription(&subscription).await {
			warn!(endpoint = %subscription.endpoint, error = %err, "Failed to save push subscription");
		}
	}
	Ok(subscription)
}

/// Drop the current subscription (if any) and subscribe again
async fn resubscribe(
	push: &dyn PushManager,
	api: &dyn ForumApi,
	vapid_key: &str,
) -> ClResult<PushSubscriptionJson> {
	if let Some(current) = push.get_subscription().await? {
		push.unsubscribe(&current).await?;
	}
	subscribe_user(push, api, vapid_key, true).await
}

/// Re-validate the push subscription, once per session.
///
/// Runs only when permission is granted and the user enabled push for at
/// least one notification type. A failed subscribe is retried once after
/// unsubscribing the current subscription. `push` is `None` when the
/// browser has no push manager; nothing happens then.
pub async fn refresh_subscription(
	session: &mut ClientSession,
	env: &ClientEnv,
	push: Option<&dyn PushManager>,
	api: &dyn ForumApi,
) -> RefreshOutcome {
	let wanted = !session.refreshed
		&& env.permission == Some(Permission::Granted)
		&& env.push_enabled();

	let outcome = if wanted {
		refresh(env, push, api).await
	} else {
		RefreshOutcome::Skipped
	};

	session.refreshed = true;
	outcome
}

async fn refresh(env: &ClientEnv, push: Option<&dyn PushManager>, api: &dyn ForumApi) -> RefreshOutcome {
	let Some(push) = push else {
		return RefreshOutcome::Failed;
	};
	let vapid_key = match env.vapid_key() {
		Ok(key) => key,
		Err(err) => {
			debug!(error = %err, "Not refreshing push subscription");
			return RefreshOutcome::Failed;
		}
	};

	match subscribe_user(push, api, vapid_key, true).await {
		Ok(_) => RefreshOutcome::Subscribed,
		Err(err) => {
			debug!(error = %err, "Subscribe failed, replacing the current subscription");
			match resubscribe(push, api, vapid_key).await {
				Ok(_) => RefreshOutcome::Resubscribed,
				Err(err) => {
					warn!(error = %err, "Failed to refresh push subscription");
					RefreshOutcome::Failed
				}
			}
		}
	}
}

/// Ask for notification permission; subscribe and save when it is granted
pub async fn request_permission(
	env: &ClientEnv,
	prompt: &dyn PermissionPrompt,
	push: &dyn PushManager,
	api: &dyn ForumApi,
) -> ClResult<Permission> {
	let permission = prompt.request_permission().await?;
	if permission == Permission::Granted {
		subscribe_user(push, api, env.vapid_key()?, true).await?;
	}
	Ok(permission)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{env, FakeApi, FakePrompt, FakePush};

	#[tokio::test]
	async fn test_refresh_subscribes_once_per_session() {
		let env = env(Some(Permission::Granted), true);
		let push = FakePush::default();
		let api = FakeApi::default();
		let mut session = ClientSession::new();

		let first = refresh_subscription(&mut session, &env, Some(&push), &api).await;
		let second = refresh_subscription(&mut session, &env, Some(&push), &api).await;

		assert_eq!(first, RefreshOutcome::Subscribed);
		assert_eq!(second, RefreshOutcome::Skipped);
		assert_eq!(push.subscribe_calls(), 1);
		assert_eq!(api.saved().len(), 1);
		assert!(session.is_refreshed());

		let options = push.last_options().unwrap();
		assert!(options.user_visible_only);
		assert_eq!(options.application_server_key, "BPublicKey");
	}

	#[tokio::test]
	async fn test_refresh_skipped_marks_session() {
		let push = FakePush::default();
		let api = FakeApi::default();

		for env in [
			env(Some(Permission::Default), true),
			env(Some(Permission::Denied), true),
			env(None, true),
			env(Some(Permission::Granted), false),
		] {
			let mut session = ClientSession::new();
			let outcome = refresh_subscription(&mut session, &env, Some(&push), &api).await;
			assert_eq!(outcome, RefreshOutcome::Skipped);
			assert!(session.is_refreshed());
		}
		assert_eq!(push.subscribe_calls(), 0);
	}

	#[tokio::test]
	async fn test_refresh_retries_after_unsubscribe() {
		let env = env(Some(Permission::Granted), true);
		let push = FakePush::failing_first(1).with_current("https://push.example.com/old");
		let api = FakeApi::default();
		let mut session = ClientSession::new();

		let outcome = refresh_subscription(&mut session, &env, Some(&push), &api).await;

		assert_eq!(outcome, RefreshOutcome::Resubscribed);
		assert_eq!(push.subscribe_calls(), 2);
		assert_eq!(push.unsubscribed(), vec!["https://push.example.com/old".to_string()]);
		assert_eq!(push.current().map(|s| s.endpoint), Some("https://push.example.com/2".into()));
		assert_eq!(api.saved().len(), 1);
	}

	#[tokio::test]
	async fn test_refresh_retry_without_current_subscription() {
		let env = env(Some(Permission::Granted), true);
		let push = FakePush::failing_first(1);
		let api = FakeApi::default();
		let mut session = ClientSession::new();

		let outcome = refresh_subscription(&mut session, &env, Some(&push), &api).await;

		assert_eq!(outcome, RefreshOutcome::Resubscribed);
		assert!(push.unsubscribed().is_empty());
		assert!(push.current().is_some());
	}

	#[tokio::test]
	async fn test_refresh_retries_only_once() {
		let env = env(Some(Permission::Granted), true);
		let push = FakePush::failing_first(5);
		let api = FakeApi::default();
		let mut session = ClientSession::new();

		let outcome = refresh_subscription(&mut session, &env, Some(&push), &api).await;

		assert_eq!(outcome, RefreshOutcome::Failed);
		assert_eq!(push.subscribe_calls(), 2);
		assert!(api.saved().is_empty());
	}

	#[tokio::test]
	async fn test_refresh_without_push_manager() {
		let env = env(Some(Permission::Granted), true);
		let api = FakeApi::default();
		let mut session = ClientSession::new();

		let outcome = refresh_subscription(&mut session, &env, None, &api).await;
		assert_eq!(outcome, RefreshOutcome::Failed);
		assert!(session.is_refreshed());
	}

	#[tokio::test]
	async fn test_save_failure_keeps_subscription() {
		let env = env(Some(Permission::Granted), true);
		let push = FakePush::default();
		let api = FakeApi::rejecting();

		let subscription = subscribe_user(&push, &api, env.vapid_key().unwrap(), true).await;
		assert!(subscription.is_ok());
		assert_eq!(push.subscribe_calls(), 1);
	}

	#[tokio::test]
	async fn test_subscribe_without_save() {
		let push = FakePush::default();
		let api = FakeApi::default();

		subscribe_user(&push, &api, "BPublicKey", false).await.unwrap();
		assert!(api.saved().is_empty());
	}

	#[tokio::test]
	async fn test_request_permission() {
		let env = env(Some(Permission::Default), true);
		let push = FakePush::default();
		let api = FakeApi::default();

		let res = request_permission(&env, &FakePrompt(Permission::Granted), &push, &api).await;
		assert_eq!(res.unwrap(), Permission::Granted);
		assert_eq!(api.saved().len(), 1);

		let res = request_permission(&env, &FakePrompt(Permission::Denied), &push, &api).await;
		assert_eq!(res.unwrap(), Permission::Denied);
		assert_eq!(push.subscribe_calls(), 1);
	}
}

// vim: ts=4
