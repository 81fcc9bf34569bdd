pub use pwa_push_core::prelude::*;

// vim: ts=4
