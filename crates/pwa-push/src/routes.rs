use axum::{
	middleware,
	routing::{delete, get, post},
	Router,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::prelude::*;
use pwa_push_core::middleware::{require_admin, require_auth};
use pwa_push_sender::handler;

pub fn init(app: App) -> Router {
	let admin_router = Router::new()
		.route("/api/pwa/firebase-config", post(handler::post_firebase_config))
		.route("/api/pwa/notify", post(handler::post_notify))
		.route_layer(middleware::from_fn(require_admin))
		.route_layer(middleware::from_fn_with_state(app.clone(), require_auth));

	let user_router = Router::new()
		.route("/api/pwa/push", post(handler::post_subscription))
		.route("/api/pwa/push/{id}", delete(handler::delete_subscription))
		.route("/api/pwa/firebase-push-subscriptions", post(handler::post_firebase_subscription))
		.route_layer(middleware::from_fn_with_state(app.clone(), require_auth));

	let public_router = Router::new()
		.route("/api/pwa/vapid-public-key", get(handler::get_vapid_public_key))
		.route("/api/pwa/forum-attributes", get(handler::get_forum_attributes));

	Router::new()
		.merge(public_router)
		.merge(user_router)
		.merge(admin_router)
		.layer(
			TraceLayer::new_for_http()
				.make_span_with(DefaultMakeSpan::new().level(Level::INFO))
				.on_response(DefaultOnResponse::new().level(Level::INFO)),
		)
		.with_state(app)
}

// vim: ts=4
