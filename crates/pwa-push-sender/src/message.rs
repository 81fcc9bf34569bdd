//! Notification message rendering with Handlebars
//!
//! Turns a `NotificationBlueprint` into a title and body. Templates are keyed
//! by notification type; types without their own template use the default
//! pair. Blueprint fields (`actor`, `subject`, `excerpt`, `url`, `data`) are
//! available as template variables.

use handlebars::Handlebars;
use regex::Regex;
use std::sync::LazyLock;

use crate::prelude::*;
use pwa_push_types::message::{MessageBuilder, NotificationBlueprint, RenderedMessage};

const DEFAULT_TEMPLATE: &str = "default";

/// (type, title template, body template)
const BUILTIN_TEMPLATES: &[(&str, &str, &str)] = &[
	(
		DEFAULT_TEMPLATE,
		"{{#if subject}}{{subject}}{{else}}New notification{{/if}}",
		"{{#if actor}}{{actor}}: {{/if}}{{excerpt}}",
	),
	("newPost", "{{subject}}", "{{actor}} replied: {{excerpt}}"),
	("postMentioned", "{{actor}} replied to your post in {{subject}}", "{{excerpt}}"),
	("userMentioned", "{{actor}} mentioned you in {{subject}}", "{{excerpt}}"),
	("postLiked", "{{actor}} liked your post in {{subject}}", "{{excerpt}}"),
	("discussionRenamed", "{{actor}} renamed a discussion", "{{subject}}"),
	("newDiscussionInTag", "New discussion: {{subject}}", "{{actor}}: {{excerpt}}"),
];

/// Handlebars based message builder
pub struct DefaultMessageBuilder {
	handlebars: Handlebars<'static>,
}

impl DefaultMessageBuilder {
	pub fn new() -> ClResult<Self> {
		let mut handlebars = Handlebars::new();
		// Bodies carry HTML excerpts, they are stripped per provider
		handlebars.register_escape_fn(handlebars::no_escape);

		let mut builder = Self { handlebars };
		for (typ, title, body) in BUILTIN_TEMPLATES {
			builder.register(typ, title, body)?;
		}
		Ok(builder)
	}

	/// Register (or replace) the templates of a notification type
	pub fn register(&mut self, typ: &str, title: &str, body: &str) -> ClResult<()> {
		self.handlebars
			.register_template_string(&format!("{}.title", typ), title)
			.map_err(|e| Error::ConfigError(format!("Invalid title template '{}': {}", typ, e)))?;
		self.handlebars
			.register_template_string(&format!("{}.body", typ), body)
			.map_err(|e| Error::ConfigError(format!("Invalid body template '{}': {}", typ, e)))?;
		Ok(())
	}

	fn render(&self, typ: &str, part: &str, blueprint: &NotificationBlueprint) -> ClResult<String> {
		let name = format!("{}.{}", typ, part);
		let name = if self.handlebars.has_template(&name) {
			name
		} else {
			format!("{}.{}", DEFAULT_TEMPLATE, part)
		};

		self.handlebars.render(&name, blueprint).map_err(|e| {
			Error::Internal(format!("Failed to render '{}' for {}: {}", name, blueprint.typ, e))
		})
	}
}

impl MessageBuilder for DefaultMessageBuilder {
	fn build(&self, blueprint: &NotificationBlueprint) -> ClResult<RenderedMessage> {
		let title = self.render(&blueprint.typ, "title", blueprint)?;
		let body = self.render(&blueprint.typ, "body", blueprint)?;

		Ok(RenderedMessage {
			title: title.trim().to_string(),
			body: body.trim().to_string(),
			url: blueprint.url.as_deref().map(str::to_string),
		})
	}
}

/// Comments, and tags opened by `<` directly followed by a name, `/`, `!` or `?`
static TAG_PATTERN: LazyLock<Result<Regex, regex::Error>> =
	LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->|<[/!?]?[A-Za-z!?][^>]*>"));

/// Remove HTML tags, keeping the text between them.
///
/// A `<` followed by whitespace or a digit is text, not a tag.
pub fn strip_tags(html: &str) -> ClResult<String> {
	let tags = TAG_PATTERN
		.as_ref()
		.map_err(|e| Error::Internal(format!("regex error: {}", e)))?;
	Ok(tags.replace_all(html, "").into_owned())
}


// vim: ts=4
