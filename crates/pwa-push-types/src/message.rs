//! Notification blueprints and their rendered form

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::prelude::*;

/// Internal description of a notification-worthy event, not yet rendered to text.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationBlueprint {
	/// Notification type (e.g. "newPost", "postMentioned")
	#[serde(rename = "type")]
	pub typ: Box<str>,
	/// Display name of the user who caused the event
	pub actor: Option<Box<str>>,
	/// Title of the related entity (discussion title, etc.)
	pub subject: Option<Box<str>>,
	/// Excerpt of the related content, may contain HTML
	pub excerpt: Option<Box<str>>,
	/// Link to open when the notification is clicked
	pub url: Option<Box<str>>,
	/// Any additional type specific data
	pub data: Option<serde_json::Value>,
}

impl NotificationBlueprint {
	pub fn new(typ: impl Into<Box<str>>) -> Self {
		Self { typ: typ.into(), ..Default::default() }
	}
}

/// Human readable form of a blueprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
	pub title: String,
	/// Body text, may contain HTML
	pub body: String,
	pub url: Option<String>,
}

/// Translates blueprints into human readable messages
pub trait MessageBuilder: Send + Sync {
	fn build(&self, blueprint: &NotificationBlueprint) -> ClResult<RenderedMessage>;
}

// vim: ts=4
