//! Cloud messaging client abstraction

use async_trait::async_trait;
use std::sync::Arc;

use crate::prelude::*;

/// A message addressed to one registration token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudMessage {
	pub token: String,
	pub title: String,
	/// Plain text body
	pub body: String,
	pub link: Option<String>,
}

#[derive(Debug)]
pub enum MessagingError {
	/// The provider rejected our credentials
	Authentication(String),
	/// The registration token is unknown or unregistered
	NotFound(String),
	/// The message itself was rejected
	InvalidMessage(String),
	/// Provider side failure
	Server(String),
	/// The provider could not be reached
	Network(String),
}

impl std::fmt::Display for MessagingError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			MessagingError::Authentication(msg) => write!(f, "authentication error: {}", msg),
			MessagingError::NotFound(msg) => write!(f, "not found: {}", msg),
			MessagingError::InvalidMessage(msg) => write!(f, "invalid message: {}", msg),
			MessagingError::Server(msg) => write!(f, "server error: {}", msg),
			MessagingError::Network(msg) => write!(f, "network error: {}", msg),
		}
	}
}

impl std::error::Error for MessagingError {}

/// Sends cloud messages
#[async_trait]
pub trait Messaging: Send + Sync {
	async fn send(&self, message: &CloudMessage) -> Result<(), MessagingError>;
}

/// Resolves a messaging client from the stored provider configuration
pub trait MessagingProvider: Send + Sync {
	/// Fails with `Error::ConfigError` if the configuration cannot be used
	fn resolve(&self, config: &str) -> ClResult<Arc<dyn Messaging>>;
}

// vim: ts=4
