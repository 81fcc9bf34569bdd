//! Firebase Cloud Messaging fan-out

use std::sync::Arc;

use crate::message::strip_tags;
use crate::messaging::{CloudMessage, MessagingError, MessagingProvider};
use crate::notifier::SendReport;
use crate::prelude::*;
use crate::settings::FIREBASE_CONFIG;
use pwa_push_types::message::{MessageBuilder, NotificationBlueprint};
use pwa_push_types::store_adapter::{PushSubscriptionData, SubscriptionKind};

/// Read the stored Firebase configuration if it is present and valid JSON
pub async fn firebase_config(app: &App) -> ClResult<Option<String>> {
	let Some(config) = app.settings.get_string(FIREBASE_CONFIG).await? else {
		return Ok(None);
	};

	if serde_json::from_str::<serde_json::Value>(&config).is_err() {
		return Ok(None);
	}
	Ok(Some(config))
}

pub async fn has_valid_firebase_settings(app: &App) -> ClResult<bool> {
	Ok(firebase_config(app).await?.is_some())
}

pub struct FirebasePushSender {
	builder: Arc<dyn MessageBuilder>,
	provider: Arc<dyn MessagingProvider>,
}

impl FirebasePushSender {
	pub fn new(builder: Arc<dyn MessageBuilder>, provider: Arc<dyn MessagingProvider>) -> Self {
		Self { builder, provider }
	}

	/// Send `blueprint` to the Firebase subscriptions of `user_ids`.
	///
	/// Without a usable configuration nothing is sent. Each subscription gets
	/// one attempt; unregistered tokens are deleted, other failures are logged
	/// and the batch continues.
	pub async fn notify(
		&self,
		app: &App,
		blueprint: &NotificationBlueprint,
		user_ids: &[UserId],
	) -> ClResult<SendReport> {
		let mut report = SendReport::default();

		let Some(config) = firebase_config(app).await? else {
			return Ok(report);
		};

		let messaging = match self.provider.resolve(&config) {
			Ok(messaging) => messaging,
			Err(e) => {
				error!(error = %e, "Firebase config invalid");
				return Ok(report);
			}
		};

		let subscriptions = app
			.store_adapter
			.list_push_subscriptions(user_ids, Some(SubscriptionKind::Firebase))
			.await?;
		if subscriptions.is_empty() {
			return Ok(report);
		}

		let rendered = self.builder.build(blueprint)?;
		let body = strip_tags(&rendered.body)?;

		for subscription in subscriptions {
			let PushSubscriptionData::Firebase { token } = &subscription.data else {
				continue;
			};
			let message = CloudMessage {
				token: token.clone(),
				title: rendered.title.clone(),
				body: body.clone(),
				link: rendered.url.clone(),
			};

			match messaging.send(&message).await {
				Ok(()) => {
					report.sent += 1;
					debug!(subs_id = %subscription.subs_id, "Firebase message sent");
				}
				Err(MessagingError::Authentication(msg)) => {
					report.failed += 1;
					error!(subs_id = %subscription.subs_id, error = %msg, "Firebase authentication error");
				}
				Err(MessagingError::NotFound(_)) => {
					info!(
						subs_id = %subscription.subs_id,
						user_id = %subscription.user_id,
						"Deleting unregistered Firebase subscription"
					);
					match app.store_adapter.delete_push_subscription(None, subscription.subs_id).await
					{
						Ok(()) => report.removed += 1,
						Err(e) => {
							report.failed += 1;
							warn!(subs_id = %subscription.subs_id, error = %e, "Failed to delete subscription");
						}
					}
				}
				Err(err) => {
					report.failed += 1;
					warn!(subs_id = %subscription.subs_id, error = %err, "Firebase message failed");
				}
			}
		}

		Ok(report)
	}
}

// vim: ts=4
