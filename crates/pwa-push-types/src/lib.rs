//! Shared types, adapter traits, and core utilities for pwa-push.
//!
//! This crate contains the foundational types that are shared between the
//! server crates, the client subscription manager and the storage adapters.

pub mod auth;
pub mod error;
pub mod message;
pub mod preferences;
pub mod prelude;
pub mod store_adapter;
pub mod types;

// vim: ts=4
