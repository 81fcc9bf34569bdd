//! Which push related alerts and settings the forum UI shows

use serde::{Deserialize, Serialize};

use crate::browser::{ClientEnv, FirebasePushState, Permission};
use crate::prelude::*;
use crate::store::LocalStore;
use pwa_push_types::preferences::NotificationMethod;

/// `localStorage` key of the opt-in alert dismissal record
pub const OPTIN_DISMISSED_KEY: &str = "askvortov-pwa.notif-alert.dismissed";

const PUSH_API_DOCS_URL: &str = "https://developer.mozilla.org/en-US/docs/Web/API/Push_API";
const ENABLE_NOTIFICATIONS_HELP_URL: &str = "https://support.humblebundle.com/hc/en-us/articles/360008513933-Enabling-and-Disabling-Browser-Notifications-in-Various-Browsers";

/// Persisted when the user dismisses the opt-in alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DismissalRecord {
	/// Milliseconds since the epoch
	pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertType {
	Info,
	Error,
}

/// The control rendered in an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertAction {
	/// Link to the settings page; following it dismisses the opt-in alert
	OpenSettings,
	/// Ask for browser notification permission, subscribe on `granted`
	RequestPermission,
	/// Ask the native wrapper for push permission
	RequestFirebasePermission,
	/// External help page
	Link(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
	pub key: &'static str,
	pub typ: AlertType,
	pub icon: Option<&'static str>,
	/// Translation key of the message
	pub message: &'static str,
	/// Translation key of the action button
	pub button: &'static str,
	pub action: AlertAction,
	pub dismissible: bool,
}

/// An entry of the forum's notification method grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMethodItem {
	pub name: &'static str,
	pub icon: &'static str,
	pub label: &'static str,
}

/// The opt-in alert shown on page load, if any.
///
/// Shown when push is configured, permission is undecided, the user has a
/// push preference enabled and never dismissed the alert.
pub fn optin_alert(env: &ClientEnv, store: &dyn LocalStore) -> Option<Alert> {
	if !env.push_configured()
		|| store.get_item(OPTIN_DISMISSED_KEY).is_some()
		|| env.permission != Some(Permission::Default)
		|| !env.push_enabled()
	{
		return None;
	}

	Some(Alert {
		key: "push-optin",
		typ: AlertType::Info,
		icon: None,
		message: "askvortsov-pwa.forum.alerts.optin",
		button: "askvortsov-pwa.forum.alerts.optin_button",
		action: AlertAction::OpenSettings,
		dismissible: true,
	})
}

/// Remember that the opt-in alert was dismissed (`now` in ms)
pub fn dismiss_optin_alert(store: &dyn LocalStore, now: i64) -> ClResult<()> {
	let record = serde_json::to_string(&DismissalRecord { timestamp: now })?;
	store.set_item(OPTIN_DISMISSED_KEY, &record);
	debug!("Push opt-in alert dismissed");
	Ok(())
}

/// Read the dismissal record, if a valid one exists
pub fn optin_dismissal(store: &dyn LocalStore) -> Option<DismissalRecord> {
	serde_json::from_str(&store.get_item(OPTIN_DISMISSED_KEY)?).ok()
}

/// Notification methods to add to the forum's notification grid
pub fn notification_methods(env: &ClientEnv) -> Vec<NotificationMethodItem> {
	if !env.push_configured() {
		return Vec::new();
	}

	vec![NotificationMethodItem {
		name: NotificationMethod::Push.as_str(),
		icon: "fas fa-mobile",
		label: "askvortsov-pwa.forum.settings.push_header",
	}]
}

/// Alerts shown above the notification settings
pub fn settings_alerts(env: &ClientEnv) -> Vec<Alert> {
	if env.apple_webview {
		if env.firebase_push_state == Some(FirebasePushState::Authorized) {
			return Vec::new();
		}
		return vec![Alert {
			key: "firebase-push-optin-default",
			typ: AlertType::Info,
			icon: Some("fas fa-exclamation-circle"),
			message: "askvortsov-pwa.forum.settings.pwa_notifications.access_default",
			button: "askvortsov-pwa.forum.settings.pwa_notifications.access_default_button",
			action: AlertAction::RequestFirebasePermission,
			dismissible: false,
		}];
	}

	if !env.push_configured() {
		return Vec::new();
	}

	let alert = match env.permission {
		None => Alert {
			key: "push-no-browser-support",
			typ: AlertType::Info,
			icon: Some("fas fa-exclamation-triangle"),
			message: "askvortsov-pwa.forum.settings.pwa_notifications.no_browser_support",
			button: "askvortsov-pwa.forum.settings.pwa_notifications.no_browser_support_button",
			action: AlertAction::Link(PUSH_API_DOCS_URL),
			dismissible: false,
		},
		Some(Permission::Default) => Alert {
			key: "push-optin-default",
			typ: AlertType::Info,
			icon: Some("fas fa-exclamation-circle"),
			message: "askvortsov-pwa.forum.settings.pwa_notifications.access_default",
			button: "askvortsov-pwa.forum.settings.pwa_notifications.access_default_button",
			action: AlertAction::RequestPermission,
			dismissible: false,
		},
		Some(Permission::Denied) => Alert {
			key: "push-optin-denied",
			typ: AlertType::Error,
			icon: Some("fas fa-exclamation-triangle"),
			message: "askvortsov-pwa.forum.settings.pwa_notifications.access_denied",
			button: "askvortsov-pwa.forum.settings.pwa_notifications.access_denied_button",
			action: AlertAction::Link(ENABLE_NOTIFICATIONS_HELP_URL),
			dismissible: false,
		},
		Some(Permission::Granted) => return Vec::new(),
	};
	vec![alert]
}


// vim: ts=4
