//! Runs every push provider for one notification

use serde::Serialize;
use std::sync::Arc;

use crate::firebase::FirebasePushSender;
use crate::prelude::*;
use crate::webpush::WebPushSender;
use pwa_push_types::message::NotificationBlueprint;

/// Outcome of one fan-out
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SendReport {
	/// Messages accepted by the provider
	pub sent: usize,
	/// Subscriptions deleted because the provider no longer knows them
	pub removed: usize,
	/// Failed sends, subscription kept
	pub failed: usize,
}

impl SendReport {
	pub fn total(&self) -> usize {
		self.sent + self.removed + self.failed
	}
}

impl std::ops::AddAssign for SendReport {
	fn add_assign(&mut self, other: Self) {
		self.sent += other.sent;
		self.removed += other.removed;
		self.failed += other.failed;
	}
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyReport {
	pub firebase: SendReport,
	pub web_push: SendReport,
}

pub struct PushNotifier {
	pub firebase: FirebasePushSender,
	pub web_push: WebPushSender,
}

impl PushNotifier {
	pub fn new(firebase: FirebasePushSender, web_push: WebPushSender) -> Self {
		Self { firebase, web_push }
	}

	/// Deliver `blueprint` to every subscription of `user_ids`.
	///
	/// A failing provider does not keep the other one from running.
	pub async fn notify(
		&self,
		app: &App,
		blueprint: &NotificationBlueprint,
		user_ids: &[UserId],
	) -> NotifyReport {
		let firebase = self.firebase.notify(app, blueprint, user_ids).await.unwrap_or_else(|e| {
			error!(error = %e, typ = %blueprint.typ, "Firebase fan-out failed");
			SendReport::default()
		});
		let web_push = self.web_push.notify(app, blueprint, user_ids).await.unwrap_or_else(|e| {
			error!(error = %e, typ = %blueprint.typ, "Web Push fan-out failed");
			SendReport::default()
		});

		info!(
			typ = %blueprint.typ,
			users = user_ids.len(),
			firebase_sent = firebase.sent,
			web_push_sent = web_push.sent,
			"Push notification fan-out finished"
		);
		NotifyReport { firebase, web_push }
	}
}

/// Extension type under which the notifier is stored in the app
pub type PushNotifierExt = Arc<PushNotifier>;

// vim: ts=4
